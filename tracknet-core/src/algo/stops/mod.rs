//! Stop detection: finding places where a track stays still
//!
//! Two strategies are available. The global one partitions the whole track
//! optimally into compact intervals (see [`find_stops_global`]), the local
//! one thresholds the instantaneous speed (see [`find_stops_local`]).

mod partition;

use std::ops::Index;

use chrono::{DateTime, Utc};
use log::{debug, info};

use super::segmentation::{ComparisonMode, segment};
use crate::{
    Error,
    track::{Observation, Operator, Position, SPEED, Track},
};

const MOVING_MARK: &str = "#moving";

/// Stop detection strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopMode {
    /// Speed threshold on consecutive points
    Local,
    /// Optimal partition of the whole track
    Global,
}

/// A detected stop and the statistics of the points it gathers
#[derive(Debug, Clone, PartialEq)]
pub struct Stop {
    /// Representative location (enclosing circle center or centroid)
    pub position: Position,
    /// Time of the first point of the stop
    pub timestamp: DateTime<Utc>,
    /// Radius of the circle enclosing the stop points
    pub radius: f64,
    pub mean_x: f64,
    pub mean_y: f64,
    pub mean_z: f64,
    pub sigma_x: f64,
    pub sigma_y: f64,
    pub sigma_z: f64,
    /// Index of the first point in the analysed track
    pub id_ini: usize,
    /// Index of the last point in the analysed track
    pub id_end: usize,
    pub nb_points: usize,
    /// Seconds between first and last points
    pub duration: f64,
    /// Planar dispersion, `sqrt(sigma_x² + sigma_y²)`
    pub rmse: f64,
}

impl Stop {
    fn from_portion(
        portion: &Track,
        position: Position,
        radius: f64,
        id_ini: usize,
        id_end: usize,
    ) -> Result<Self, Error> {
        let timestamp = portion
            .first()
            .map(|o| o.timestamp)
            .ok_or_else(|| Error::InvalidData("empty stop portion".to_string()))?;
        let sigma_x = portion.operate(Operator::StdDev, "x")?;
        let sigma_y = portion.operate(Operator::StdDev, "y")?;

        Ok(Self {
            position,
            timestamp,
            radius,
            mean_x: portion.operate(Operator::Averager, "x")?,
            mean_y: portion.operate(Operator::Averager, "y")?,
            mean_z: portion.operate(Operator::Averager, "z")?,
            sigma_x,
            sigma_y,
            sigma_z: portion.operate(Operator::StdDev, "z")?,
            id_ini,
            id_end,
            nb_points: portion.size(),
            duration: portion.duration(),
            rmse: sigma_x.hypot(sigma_y),
        })
    }
}

/// Stops in track order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StopCollection {
    stops: Vec<Stop>,
}

impl StopCollection {
    pub fn len(&self) -> usize {
        self.stops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Stop> {
        self.stops.iter()
    }

    pub fn first(&self) -> Option<&Stop> {
        self.stops.first()
    }

    pub fn last(&self) -> Option<&Stop> {
        self.stops.last()
    }

    /// One observation per stop, statistics attached as features
    /// (`radius`, `mean_x`, ..., `nb_points`, `rmse`)
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidData`] if a feature column cannot be attached
    #[allow(clippy::cast_precision_loss)]
    pub fn to_track(&self, id: impl Into<String>) -> Result<Track, Error> {
        let observations = self
            .stops
            .iter()
            .map(|s| Observation::new(s.position, s.timestamp))
            .collect();
        let mut track = Track::with_observations(id, observations);

        let columns: [(&str, fn(&Stop) -> f64); 13] = [
            ("radius", |s| s.radius),
            ("mean_x", |s| s.mean_x),
            ("mean_y", |s| s.mean_y),
            ("mean_z", |s| s.mean_z),
            ("id_ini", |s| s.id_ini as f64),
            ("id_end", |s| s.id_end as f64),
            ("sigma_x", |s| s.sigma_x),
            ("sigma_y", |s| s.sigma_y),
            ("sigma_z", |s| s.sigma_z),
            ("duration", |s| s.duration),
            ("nb_points", |s| s.nb_points as f64),
            ("rmse", |s| s.rmse),
            ("timestamp", |s| s.timestamp.timestamp_millis() as f64 / 1000.0),
        ];
        for (name, column) in columns {
            track.create_feature(name, self.stops.iter().map(column).collect())?;
        }
        Ok(track)
    }
}

impl Index<usize> for StopCollection {
    type Output = Stop;

    fn index(&self, index: usize) -> &Self::Output {
        &self.stops[index]
    }
}

impl<'a> IntoIterator for &'a StopCollection {
    type Item = &'a Stop;
    type IntoIter = std::slice::Iter<'a, Stop>;

    fn into_iter(self) -> Self::IntoIter {
        self.stops.iter()
    }
}

fn validate_parameters(spatial: f64, duration: f64) -> Result<(), Error> {
    if !spatial.is_finite() || spatial < 0.0 {
        return Err(Error::InvalidData(format!(
            "spatial threshold must be non-negative, got {spatial}"
        )));
    }
    if duration.is_nan() || duration < 0.0 {
        return Err(Error::InvalidData(format!(
            "minimal duration must be non-negative, got {duration}"
        )));
    }
    Ok(())
}

/// Finds stops with the strategy selected by `mode`.
///
/// `spatial` is the maximal stop diameter for [`StopMode::Global`] and the
/// maximal speed for [`StopMode::Local`]; `duration` is the minimal stop
/// duration in seconds.
///
/// # Errors
///
/// Returns [`Error::InvalidData`] for negative thresholds
pub fn find_stops(
    track: &Track,
    spatial: f64,
    duration: f64,
    mode: StopMode,
) -> Result<StopCollection, Error> {
    match mode {
        StopMode::Local => find_stops_local(track, spatial, duration),
        StopMode::Global => find_stops_global(track, spatial, duration, 1),
    }
}

/// Finds stops as the optimal partition of the track into compact intervals.
///
/// An interval is a stop when the circle enclosing its points is at most
/// `diameter` wide and it lasts at least `duration` seconds. Intervals are
/// rewarded by the square of their point count, so one long stop beats
/// several short ones. The track is first reduced to every
/// `downsampling`-th point; reported indices refer to the original track.
/// Finding nothing is not an error.
///
/// # Errors
///
/// Returns [`Error::InvalidData`] for negative thresholds or a zero
/// down-sampling factor
pub fn find_stops_global(
    track: &Track,
    diameter: f64,
    duration: f64,
    downsampling: usize,
) -> Result<StopCollection, Error> {
    validate_parameters(diameter, duration)?;
    if downsampling == 0 {
        return Err(Error::InvalidData(
            "down-sampling factor must be at least 1".to_string(),
        ));
    }

    let track = track.downsample(downsampling);
    info!(
        "Searching stops over {} points (diameter {diameter}, duration {duration}s)",
        track.size()
    );

    let rewards = partition::reward_matrix(&track, diameter, duration);
    let boundaries = partition::optimal_partition(&rewards);
    debug!("Optimal partition has {} intervals", boundaries.len().saturating_sub(1));

    let mut stops = Vec::new();
    for pair in boundaries.windows(2) {
        let (begin, end) = (pair[0], pair[1] - 1);
        let portion = track.extract(begin, end);
        let Some(circle) = portion.enclosing_circle() else {
            continue;
        };
        if circle.radius > diameter / 2.0 || portion.duration() < duration {
            continue;
        }
        stops.push(Stop::from_portion(
            &portion,
            circle.center,
            circle.radius,
            begin * downsampling,
            end * downsampling,
        )?);
    }

    info!("Found {} stops", stops.len());
    Ok(StopCollection { stops })
}

/// Finds stops as runs of consecutive points moving slower than `speed`
/// (ground units per second) for at least `duration` seconds.
///
/// Stops are located at the centroid of their points.
///
/// # Errors
///
/// Returns [`Error::InvalidData`] for negative thresholds
pub fn find_stops_local(track: &Track, speed: f64, duration: f64) -> Result<StopCollection, Error> {
    validate_parameters(speed, duration)?;

    let mut work = track.clone();
    work.compute_speed();
    segment(&mut work, &[SPEED], &[speed], ComparisonMode::And, MOVING_MARK)?;
    let moving = work
        .feature(MOVING_MARK)
        .ok_or_else(|| Error::UnknownFeature(MOVING_MARK.to_string()))?
        .to_vec();

    let mut runs = Vec::new();
    let mut run_start: Option<usize> = None;
    for (i, &mark) in moving.iter().enumerate() {
        match (mark == 1.0, run_start) {
            (false, None) => run_start = Some(i),
            (true, Some(start)) => {
                runs.push((start, i - 1));
                run_start = None;
            }
            _ => {}
        }
    }
    if let Some(start) = run_start {
        runs.push((start, moving.len() - 1));
    }

    let mut stops = Vec::new();
    for (begin, end) in runs {
        let portion = track.extract(begin, end);
        if portion.duration() < duration {
            continue;
        }
        let (Some(centroid), Some(circle)) = (portion.centroid(), portion.enclosing_circle()) else {
            continue;
        };
        stops.push(Stop::from_portion(&portion, centroid, circle.radius, begin, end)?);
    }

    debug!("Found {} stops from speed threshold {speed}", stops.len());
    Ok(StopCollection { stops })
}

/// Copy of `track` without the points strictly inside detected stops.
///
/// The first and last point of each stop are kept so the remaining parts
/// still join up.
pub fn remove_stops(track: &Track, stops: &StopCollection) -> Track {
    let (Some(first), Some(last)) = (stops.first(), stops.last()) else {
        return track.clone();
    };

    let mut output = track.extract(0, first.id_ini);
    for pair in stops.stops.windows(2) {
        output.append(&track.extract(pair[0].id_end, pair[1].id_ini));
    }
    if let Some(end) = track.size().checked_sub(1) {
        output.append(&track.extract(last.id_end, end));
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::track::timestamp_from_secs;

    /// Moving at 10 units/s, with two 20 s stops at x = 100 and x = 200
    fn two_stops_track() -> Track {
        let mut xs = Vec::new();
        xs.extend((0..10).map(|i| f64::from(i) * 10.0));
        xs.extend((0..20).map(|i| 100.0 + 0.05 * (f64::from(i % 3) - 1.0)));
        xs.extend((1..10).map(|i| 100.0 + f64::from(i) * 10.0));
        xs.extend((0..20).map(|i| 200.0 + 0.05 * (f64::from(i % 3) - 1.0)));
        xs.extend((1..11).map(|i| 200.0 + f64::from(i) * 10.0));

        let observations = xs
            .iter()
            .enumerate()
            .map(|(t, &x)| {
                #[allow(clippy::cast_precision_loss)]
                let t = t as f64;
                Observation::new(Position::planar(x, 0.0), timestamp_from_secs(t))
            })
            .collect();
        Track::with_observations("walk", observations)
    }

    #[test]
    fn test_global_stops() {
        let track = two_stops_track();
        let stops = find_stops_global(&track, 5.0, 10.0, 1).unwrap();
        assert_eq!(stops.len(), 2);

        let first = &stops[0];
        assert_eq!((first.id_ini, first.id_end), (10, 29));
        assert_eq!(first.nb_points, 20);
        assert!((first.position.x - 100.0).abs() < 0.1);
        assert!((first.duration - 19.0).abs() < 1e-9);
        assert!(first.radius <= 2.5);
        assert!((first.rmse - first.sigma_x.hypot(first.sigma_y)).abs() < 1e-12);

        let second = &stops[1];
        assert_eq!((second.id_ini, second.id_end), (39, 58));
        assert!((second.mean_x - 200.0).abs() < 0.1);
    }

    #[test]
    fn test_global_stops_downsampled_indices() {
        let track = two_stops_track();
        let stops = find_stops_global(&track, 5.0, 8.0, 2).unwrap();
        assert_eq!(stops.len(), 2);
        for stop in &stops {
            assert_eq!(stop.id_ini % 2, 0);
            assert_eq!(stop.id_end % 2, 0);
        }
        assert!(stops[0].id_ini >= 10 && stops[0].id_end <= 29);
    }

    /// Every stop of `strict` lies inside some stop of `loose`
    fn covered_by(strict: &StopCollection, loose: &StopCollection) -> bool {
        strict.iter().all(|inner| {
            loose
                .iter()
                .any(|outer| outer.id_ini <= inner.id_ini && inner.id_end <= outer.id_end)
        })
    }

    #[test]
    fn test_looser_parameters_keep_stops() {
        let track = two_stops_track();

        let by_diameter: Vec<_> = [0.01, 2.0, 5.0, 8.0, 12.0]
            .iter()
            .map(|&diameter| find_stops_global(&track, diameter, 10.0, 1).unwrap())
            .collect();
        let by_duration: Vec<_> = [25.0, 15.0, 10.0, 5.0, 0.0]
            .iter()
            .map(|&duration| find_stops_global(&track, 5.0, duration, 1).unwrap())
            .collect();

        for sweep in [&by_diameter, &by_duration] {
            for pair in sweep.windows(2) {
                assert!(pair[0].len() <= pair[1].len());
                assert!(covered_by(&pair[0], &pair[1]));
            }
        }
        assert!(by_diameter[0].is_empty());
        assert_eq!(by_diameter[4].len(), 2);
        assert_eq!(by_diameter[4][0].nb_points, 21);
        assert!(by_duration[0].is_empty());
    }

    #[test]
    fn test_no_stops_is_empty() {
        let track = two_stops_track();
        assert!(find_stops_global(&track, 0.01, 10.0, 1).unwrap().is_empty());
        assert!(find_stops_global(&track, 5.0, 100.0, 1).unwrap().is_empty());
        assert!(find_stops_global(&Track::new("empty"), 5.0, 1.0, 1).unwrap().is_empty());
    }

    #[test]
    fn test_invalid_parameters() {
        let track = two_stops_track();
        assert!(find_stops_global(&track, -1.0, 10.0, 1).is_err());
        assert!(find_stops_global(&track, 1.0, 10.0, 0).is_err());
        assert!(find_stops_local(&track, 1.0, f64::NAN).is_err());
    }

    #[test]
    fn test_local_stops() {
        let track = two_stops_track();
        let stops = find_stops(&track, 1.0, 10.0, StopMode::Local).unwrap();
        assert_eq!(stops.len(), 2);
        assert_eq!((stops[0].id_ini, stops[0].id_end), (11, 29));
        assert!((stops[0].position.x - 100.0).abs() < 0.1);
        assert_eq!((stops[1].id_ini, stops[1].id_end), (40, 58));
    }

    #[test]
    fn test_remove_stops() {
        let track = two_stops_track();
        let stops = find_stops_global(&track, 5.0, 10.0, 1).unwrap();
        let moving = remove_stops(&track, &stops);
        assert_eq!(moving.size(), 11 + 11 + 11);
        assert_eq!(remove_stops(&track, &StopCollection::default()), track);
    }

    #[test]
    fn test_stops_as_track() {
        let track = two_stops_track();
        let stops = find_stops_global(&track, 5.0, 10.0, 1).unwrap();
        let summary = stops.to_track("stops").unwrap();
        assert_eq!(summary.size(), 2);
        assert_eq!(summary.feature("nb_points").unwrap(), &[20.0, 20.0]);
        assert_eq!(summary.feature("id_ini").unwrap(), &[10.0, 39.0]);
        assert_eq!(StopCollection::default().to_track("none").unwrap().size(), 0);
    }
}
