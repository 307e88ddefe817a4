//! Timestamped trajectories with named per-point analytical features
//!
//! A [`Track`] is the geometry primitive shared by the whole crate: network
//! edges carry one as their polyline, shortest paths are returned as one and
//! the segmentation engines partition them.

mod collection;
mod geometry;
mod operator;

use chrono::{DateTime, Utc};
use geo::{Coord, LineString};
use hashbrown::HashMap;
use itertools::Itertools;

use crate::Error;

pub use collection::TrackCollection;
pub use geometry::{Circle, min_enclosing_circle};
pub use operator::Operator;

/// Cumulative curvilinear abscissa feature
pub const ABS_CURV: &str = "abs_curv";
/// Instantaneous speed feature (ground units per second)
pub const SPEED: &str = "speed";

/// 3D position in a planar (projected) coordinate system
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Position {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub const fn planar(x: f64, y: f64) -> Self {
        Self { x, y, z: 0.0 }
    }

    /// Euclidean distance ignoring elevation
    pub fn distance_2d(&self, other: &Position) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    pub fn to_coord(self) -> Coord<f64> {
        Coord {
            x: self.x,
            y: self.y,
        }
    }
}

impl From<Coord<f64>> for Position {
    fn from(coord: Coord<f64>) -> Self {
        Self::planar(coord.x, coord.y)
    }
}

/// Single timestamped position of a track
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    pub position: Position,
    pub timestamp: DateTime<Utc>,
}

impl Observation {
    pub fn new(position: Position, timestamp: DateTime<Utc>) -> Self {
        Self {
            position,
            timestamp,
        }
    }

    /// Observation without a meaningful time (Unix epoch)
    pub fn untimed(position: Position) -> Self {
        Self::new(position, DateTime::<Utc>::default())
    }
}

/// Builds a UTC timestamp from fractional seconds since the Unix epoch
pub fn timestamp_from_secs(secs: f64) -> DateTime<Utc> {
    #[allow(clippy::cast_possible_truncation)]
    let millis = (secs * 1000.0).round() as i64;
    DateTime::from_timestamp_millis(millis).unwrap_or_default()
}

/// Elapsed time in seconds from `from` to `to`
#[allow(clippy::cast_precision_loss)]
pub fn seconds_between(from: &DateTime<Utc>, to: &DateTime<Utc>) -> f64 {
    (*to - *from).num_milliseconds() as f64 / 1000.0
}

/// Ordered sequence of observations with named feature series.
///
/// Every feature series holds exactly one value per observation; `NaN`
/// marks a missing value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Track {
    id: String,
    observations: Vec<Observation>,
    features: HashMap<String, Vec<f64>>,
}

impl Track {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            observations: Vec::new(),
            features: HashMap::new(),
        }
    }

    pub fn with_observations(id: impl Into<String>, observations: Vec<Observation>) -> Self {
        Self {
            id: id.into(),
            observations,
            features: HashMap::new(),
        }
    }

    /// Untimed track following the vertices of a line string
    pub fn from_line_string(id: impl Into<String>, line: &LineString<f64>) -> Self {
        let observations = line
            .coords()
            .map(|c| Observation::untimed(Position::from(*c)))
            .collect();
        Self::with_observations(id, observations)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = id.into();
    }

    pub fn size(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn get(&self, index: usize) -> Option<&Observation> {
        self.observations.get(index)
    }

    pub fn first(&self) -> Option<&Observation> {
        self.observations.first()
    }

    pub fn last(&self) -> Option<&Observation> {
        self.observations.last()
    }

    /// Appends an observation, padding every feature with `NaN`
    pub fn push(&mut self, observation: Observation) {
        self.observations.push(observation);
        for values in self.features.values_mut() {
            values.push(f64::NAN);
        }
    }

    pub fn positions(&self) -> impl Iterator<Item = &Position> {
        self.observations.iter().map(|o| &o.position)
    }

    pub fn xs(&self) -> Vec<f64> {
        self.positions().map(|p| p.x).collect()
    }

    pub fn ys(&self) -> Vec<f64> {
        self.positions().map(|p| p.y).collect()
    }

    pub fn zs(&self) -> Vec<f64> {
        self.positions().map(|p| p.z).collect()
    }

    /// Copy of the observations `begin..=end`, features included.
    ///
    /// An inverted or out of range interval yields an empty track.
    pub fn extract(&self, begin: usize, end: usize) -> Track {
        if begin > end || end >= self.size() {
            let mut empty = Track::new(self.id.clone());
            for name in self.features.keys() {
                empty.features.insert(name.clone(), Vec::new());
            }
            return empty;
        }

        Track {
            id: self.id.clone(),
            observations: self.observations[begin..=end].to_vec(),
            features: self
                .features
                .iter()
                .map(|(name, values)| (name.clone(), values[begin..=end].to_vec()))
                .collect(),
        }
    }

    /// Copy keeping every `step`-th observation (the first one included)
    pub fn downsample(&self, step: usize) -> Track {
        if step <= 1 {
            return self.clone();
        }
        Track {
            id: self.id.clone(),
            observations: self.observations.iter().step_by(step).copied().collect(),
            features: self
                .features
                .iter()
                .map(|(name, values)| (name.clone(), values.iter().step_by(step).copied().collect()))
                .collect(),
        }
    }

    /// Appends all observations of `other`.
    ///
    /// Features missing on either side are padded with `NaN`.
    pub fn append(&mut self, other: &Track) {
        let own_len = self.size();
        for name in other.features.keys() {
            self.features
                .entry(name.clone())
                .or_insert_with(|| vec![f64::NAN; own_len]);
        }
        for (name, values) in &mut self.features {
            match other.features.get(name) {
                Some(other_values) => values.extend_from_slice(other_values),
                None => values.extend(std::iter::repeat_n(f64::NAN, other.size())),
            }
        }
        self.observations.extend_from_slice(&other.observations);
    }

    /// Planar polyline length
    pub fn length(&self) -> f64 {
        self.positions()
            .tuple_windows()
            .map(|(a, b)| a.distance_2d(b))
            .sum()
    }

    /// Mean position of all observations
    #[allow(clippy::cast_precision_loss)]
    pub fn centroid(&self) -> Option<Position> {
        if self.is_empty() {
            return None;
        }
        let n = self.size() as f64;
        let (sx, sy, sz) = self
            .positions()
            .fold((0.0, 0.0, 0.0), |(x, y, z), p| (x + p.x, y + p.y, z + p.z));
        Some(Position::new(sx / n, sy / n, sz / n))
    }

    /// Seconds elapsed between first and last observations
    pub fn duration(&self) -> f64 {
        match (self.first(), self.last()) {
            (Some(first), Some(last)) => seconds_between(&first.timestamp, &last.timestamp),
            _ => 0.0,
        }
    }

    pub fn enclosing_circle(&self) -> Option<Circle> {
        let positions: Vec<Position> = self.positions().copied().collect();
        min_enclosing_circle(&positions)
    }

    pub fn to_line_string(&self) -> LineString<f64> {
        LineString::new(self.positions().map(|p| p.to_coord()).collect())
    }

    pub fn has_feature(&self, name: &str) -> bool {
        self.features.contains_key(name)
    }

    pub fn feature_names(&self) -> impl Iterator<Item = &str> {
        self.features.keys().map(String::as_str)
    }

    /// Attaches (or replaces) a feature series
    pub fn create_feature(&mut self, name: impl Into<String>, values: Vec<f64>) -> Result<(), Error> {
        let name = name.into();
        if values.len() != self.size() {
            return Err(Error::InvalidData(format!(
                "feature '{name}' has {} values for {} observations",
                values.len(),
                self.size()
            )));
        }
        self.features.insert(name, values);
        Ok(())
    }

    /// Attaches (or replaces) a feature series with a constant value
    pub fn create_feature_filled(&mut self, name: impl Into<String>, value: f64) {
        self.features.insert(name.into(), vec![value; self.size()]);
    }

    pub fn feature(&self, name: &str) -> Option<&[f64]> {
        self.features.get(name).map(Vec::as_slice)
    }

    pub fn feature_value(&self, name: &str, index: usize) -> Result<f64, Error> {
        let values = self
            .features
            .get(name)
            .ok_or_else(|| Error::UnknownFeature(name.to_string()))?;
        values.get(index).copied().ok_or_else(|| {
            Error::InvalidData(format!("index {index} out of range for feature '{name}'"))
        })
    }

    pub fn set_feature_value(&mut self, name: &str, index: usize, value: f64) -> Result<(), Error> {
        let values = self
            .features
            .get_mut(name)
            .ok_or_else(|| Error::UnknownFeature(name.to_string()))?;
        let slot = values.get_mut(index).ok_or_else(|| {
            Error::InvalidData(format!("index {index} out of range for feature '{name}'"))
        })?;
        *slot = value;
        Ok(())
    }

    /// Values of a feature, with `x`, `y` and `z` resolving to coordinates
    /// when no feature of that name exists
    pub fn values(&self, name: &str) -> Result<Vec<f64>, Error> {
        if let Some(values) = self.features.get(name) {
            return Ok(values.clone());
        }
        match name {
            "x" => Ok(self.xs()),
            "y" => Ok(self.ys()),
            "z" => Ok(self.zs()),
            _ => Err(Error::UnknownFeature(name.to_string())),
        }
    }

    /// Reduces a feature (or coordinate) series with the given operator
    pub fn operate(&self, operator: Operator, name: &str) -> Result<f64, Error> {
        Ok(operator.apply(&self.values(name)?))
    }

    /// Computes the cumulative planar distance from the first observation
    pub fn compute_abs_curv(&mut self) {
        let mut total = 0.0;
        let mut values = Vec::with_capacity(self.size());
        let mut previous: Option<&Position> = None;
        for position in self.observations.iter().map(|o| &o.position) {
            if let Some(prev) = previous {
                total += prev.distance_2d(position);
            }
            values.push(total);
            previous = Some(position);
        }
        self.features.insert(ABS_CURV.to_string(), values);
    }

    /// Computes per-point speed as distance over elapsed time from the
    /// previous observation; the first point copies the second one.
    ///
    /// Points sharing a timestamp with their predecessor get `NaN`.
    pub fn compute_speed(&mut self) {
        let mut values = vec![f64::NAN; self.size()];
        for (i, (a, b)) in self.observations.iter().tuple_windows().enumerate() {
            let dt = seconds_between(&a.timestamp, &b.timestamp);
            if dt > 0.0 {
                values[i + 1] = a.position.distance_2d(&b.position) / dt;
            }
        }
        if values.len() > 1 {
            values[0] = values[1];
        }
        self.features.insert(SPEED.to_string(), values);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Track {
        let observations = (0..5)
            .map(|i| {
                let t = f64::from(i);
                Observation::new(Position::planar(t * 3.0, t * 4.0), timestamp_from_secs(t * 10.0))
            })
            .collect();
        Track::with_observations("t", observations)
    }

    #[test]
    fn test_length_and_duration() {
        let track = sample();
        assert!((track.length() - 20.0).abs() < 1e-12);
        assert!((track.duration() - 40.0).abs() < 1e-12);
    }

    #[test]
    fn test_extract_carries_features() {
        let mut track = sample();
        track
            .create_feature("v", vec![0.0, 1.0, 2.0, 3.0, 4.0])
            .unwrap();
        let part = track.extract(1, 3);
        assert_eq!(part.size(), 3);
        assert_eq!(part.feature("v").unwrap(), &[1.0, 2.0, 3.0]);
        assert!(track.extract(3, 1).is_empty());
        assert!(track.extract(4, 5).is_empty());
    }

    #[test]
    fn test_feature_length_mismatch() {
        let mut track = sample();
        assert!(track.create_feature("v", vec![1.0]).is_err());
    }

    #[test]
    fn test_append_pads_features() {
        let mut a = sample();
        a.create_feature_filled("a", 1.0);
        let mut b = sample();
        b.create_feature_filled("b", 2.0);
        a.append(&b);
        assert_eq!(a.size(), 10);
        assert!(a.feature_value("a", 7).unwrap().is_nan());
        assert!(a.feature_value("b", 2).unwrap().is_nan());
        assert_eq!(a.feature_value("b", 7).unwrap(), 2.0);

        a.set_feature_value("b", 2, 3.0).unwrap();
        assert_eq!(a.feature_value("b", 2).unwrap(), 3.0);
        assert!(matches!(
            a.set_feature_value("b", 10, 0.0),
            Err(Error::InvalidData(_))
        ));
        assert!(matches!(
            a.set_feature_value("c", 0, 0.0),
            Err(Error::UnknownFeature(_))
        ));
    }

    #[test]
    fn test_speed_and_abs_curv() {
        let mut track = sample();
        track.compute_speed();
        track.compute_abs_curv();
        assert!(track
            .feature(SPEED)
            .unwrap()
            .iter()
            .all(|v| (v - 0.5).abs() < 1e-12));
        assert_eq!(track.feature(ABS_CURV).unwrap()[4], 20.0);
    }

    #[test]
    fn test_pseudo_coordinate_features() {
        let track = sample();
        assert_eq!(track.operate(Operator::Max, "x").unwrap(), 12.0);
        assert!(matches!(
            track.operate(Operator::Max, "missing"),
            Err(Error::UnknownFeature(_))
        ));
    }

    #[test]
    fn test_downsample_keeps_first() {
        let track = sample();
        let down = track.downsample(2);
        assert_eq!(down.xs(), vec![0.0, 6.0, 12.0]);
    }
}
