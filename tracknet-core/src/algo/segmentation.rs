//! Threshold based segmentation and splitting of tracks

use log::debug;

use crate::{
    Error,
    track::{Track, TrackCollection},
};

/// How per-feature threshold tests are combined at each point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ComparisonMode {
    /// Every comparable feature must be under its threshold
    #[default]
    And,
    /// At least one comparable feature must be under its threshold
    Or,
}

/// Marks segment boundaries on `track` in a new 0/1 feature named `output`.
///
/// At each point every listed feature whose value is not `NaN` is compared
/// with its maximum threshold (a missing threshold always passes). The
/// comparisons are combined according to `mode`; a point where no feature is
/// comparable passes. A point failing the combined test closes the current
/// interval and is marked `1`, every other point `0`.
///
/// # Errors
///
/// Returns [`Error::UnknownFeature`] if an input feature does not exist
pub fn segment(
    track: &mut Track,
    input_features: &[&str],
    thresholds_max: &[f64],
    mode: ComparisonMode,
    output: &str,
) -> Result<(), Error> {
    let inputs = input_features
        .iter()
        .map(|&name| track.values(name))
        .collect::<Result<Vec<_>, _>>()?;

    let marks: Vec<f64> = (0..track.size())
        .map(|i| {
            let mut comparisons = inputs.iter().enumerate().filter_map(|(k, values)| {
                let value = values[i];
                if value.is_nan() {
                    return None;
                }
                let threshold = thresholds_max.get(k).copied().unwrap_or(f64::INFINITY);
                Some(value <= threshold)
            });

            let first = comparisons.next();
            let passes = match (mode, first) {
                (_, None) => true,
                (ComparisonMode::And, Some(c)) => c && comparisons.all(|c| c),
                (ComparisonMode::Or, Some(c)) => c || comparisons.any(|c| c),
            };
            if passes { 0.0 } else { 1.0 }
        })
        .collect();

    track.create_feature(output, marks)
}

/// Cuts `track` after every point marked `1` in the `boundary` feature.
///
/// Pieces are named `"{track id}.{counter}"`. A boundary point ends its
/// piece, the next piece starts right after it. When no point is marked the
/// collection is empty rather than holding a copy of the whole track.
///
/// # Errors
///
/// Returns [`Error::UnknownFeature`] if `boundary` does not exist
pub fn split(track: &Track, boundary: &str) -> Result<TrackCollection, Error> {
    let marks = track
        .feature(boundary)
        .ok_or_else(|| Error::UnknownFeature(boundary.to_string()))?;

    let mut pieces = TrackCollection::new();
    let mut begin = 0;

    for (i, &mark) in marks.iter().enumerate() {
        if mark == 1.0 {
            let mut piece = track.extract(begin, i);
            piece.set_id(format!("{}.{}", track.id(), pieces.len()));
            pieces.push(piece);
            begin = i + 1;
        }
    }

    // All points in the same class: no segmentation at all
    if begin != 0 && begin < track.size() {
        let mut piece = track.extract(begin, track.size() - 1);
        piece.set_id(format!("{}.{}", track.id(), pieces.len()));
        pieces.push(piece);
    }

    debug!("Split track {} into {} pieces", track.id(), pieces.len());
    Ok(pieces)
}
