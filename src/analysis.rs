use pyo3::prelude::*;
use pyo3::types::PyDict;
#[cfg(feature = "stubgen")]
use pyo3_stub_gen::derive::{gen_stub_pyclass, gen_stub_pyfunction, gen_stub_pymethods};
use tracknet_core::prelude::*;

use crate::map_core_error;
use crate::track::PyTrack;

/// Mark segment boundaries of a track
///
/// Every point where the listed features are not under their maximum
/// thresholds is marked `1` in a new feature named `output`, the others `0`.
///
/// Parameters
/// ----------
/// track : Track
///     Track to annotate, modified in place
/// features : list[str]
///     Names of the features to compare
/// thresholds : list[float]
///     Maximum value per feature, missing ones never fail
/// mode : str, default="and"
///     "and" requires every feature to pass, "or" at least one
/// output : str, default="segment"
///     Name of the created feature
#[cfg_attr(feature = "stubgen", gen_stub_pyfunction)]
#[pyfunction]
#[pyo3(signature = (track, features, thresholds, mode="and", output="segment"))]
pub fn segment(
    mut track: PyRefMut<'_, PyTrack>,
    features: Vec<String>,
    thresholds: Vec<f64>,
    mode: &str,
    output: &str,
) -> PyResult<()> {
    let mode = match mode.to_ascii_lowercase().as_str() {
        "and" => ComparisonMode::And,
        "or" => ComparisonMode::Or,
        other => {
            return Err(PyErr::new::<pyo3::exceptions::PyValueError, _>(format!(
                "Unknown comparison mode: {other}"
            )));
        }
    };
    let features: Vec<&str> = features.iter().map(String::as_str).collect();

    tracknet_core::algo::segment(&mut track.inner, &features, &thresholds, mode, output)
        .map_err(|e| map_core_error("Segmentation failed", e))
}

/// Cut a track after every point marked `1` in the `boundary` feature
///
/// Returns an empty list when no point is marked.
#[cfg_attr(feature = "stubgen", gen_stub_pyfunction)]
#[pyfunction]
#[pyo3(signature = (track, boundary="segment"))]
pub fn split(track: &PyTrack, boundary: &str) -> PyResult<Vec<PyTrack>> {
    let pieces = tracknet_core::algo::split(&track.inner, boundary)
        .map_err(|e| map_core_error("Split failed", e))?;
    Ok(pieces.into_iter().map(PyTrack::from).collect())
}

/// StopCollection
///
/// Stops detected along a track, in track order.
#[cfg_attr(feature = "stubgen", gen_stub_pyclass)]
#[pyclass(name = "StopCollection")]
pub struct PyStopCollection {
    inner: StopCollection,
}

#[cfg_attr(feature = "stubgen", gen_stub_pymethods)]
#[pymethods]
impl PyStopCollection {
    /// One dictionary of statistics per stop
    pub fn records<'py>(&self, py: Python<'py>) -> PyResult<Vec<Bound<'py, PyDict>>> {
        self.inner
            .iter()
            .map(|stop| {
                let dict = PyDict::new(py);
                dict.set_item("x", stop.position.x)?;
                dict.set_item("y", stop.position.y)?;
                dict.set_item("timestamp", stop.timestamp)?;
                dict.set_item("duration", stop.duration)?;
                dict.set_item("radius", stop.radius)?;
                dict.set_item("nb_points", stop.nb_points)?;
                dict.set_item("id_ini", stop.id_ini)?;
                dict.set_item("id_end", stop.id_end)?;
                dict.set_item("rmse", stop.rmse)?;
                Ok(dict)
            })
            .collect()
    }

    /// Stops as a track, statistics attached as features
    pub fn to_track(&self) -> PyResult<PyTrack> {
        self.inner
            .to_track("stops")
            .map(PyTrack::from)
            .map_err(|e| map_core_error("Cannot build stop track", e))
    }

    pub fn to_geojson(&self) -> PyResult<String> {
        self.inner
            .to_geojson_string()
            .map_err(|e| map_core_error("GeoJSON export failed", e))
    }

    fn __len__(&self) -> usize {
        self.inner.len()
    }

    fn __repr__(&self) -> String {
        format!("StopCollection with {} stops", self.inner.len())
    }
}

/// Detect stops along a track
///
/// Parameters
/// ----------
/// track : Track
///     Timestamped track
/// spatial : float
///     Maximal stop diameter ("global") or maximal speed ("local")
/// duration : float
///     Minimal stop duration in seconds
/// mode : str, default="global"
///     "global" for the optimal partition of the whole track, "local" for a
///     speed threshold
/// downsampling : int, default=1
///     Keep one point out of `downsampling` before a global search
///
/// Notes
/// -----
/// The global search is quadratic in the number of points; the function
/// releases the GIL while it runs.
#[cfg_attr(feature = "stubgen", gen_stub_pyfunction)]
#[pyfunction]
#[pyo3(signature = (track, spatial, duration, mode="global", downsampling=1))]
pub fn find_stops(
    py: Python<'_>,
    track: &PyTrack,
    spatial: f64,
    duration: f64,
    mode: &str,
    downsampling: usize,
) -> PyResult<PyStopCollection> {
    let mode = match mode.to_ascii_lowercase().as_str() {
        "global" => StopMode::Global,
        "local" => StopMode::Local,
        other => {
            return Err(PyErr::new::<pyo3::exceptions::PyValueError, _>(format!(
                "Unknown stop detection mode: {other}"
            )));
        }
    };

    let stops = py
        .detach(|| match mode {
            StopMode::Global => find_stops_global(&track.inner, spatial, duration, downsampling),
            StopMode::Local => find_stops_local(&track.inner, spatial, duration),
        })
        .map_err(|e| map_core_error("Stop detection failed", e))?;

    Ok(PyStopCollection { inner: stops })
}

/// Copy of a track without the points inside the given stops
#[cfg_attr(feature = "stubgen", gen_stub_pyfunction)]
#[pyfunction]
pub fn remove_stops(track: &PyTrack, stops: &PyStopCollection) -> PyTrack {
    tracknet_core::algo::remove_stops(&track.inner, &stops.inner).into()
}
