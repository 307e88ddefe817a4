use chrono::{DateTime, Utc};
use geo::LineString;
use pyo3::prelude::*;
#[cfg(feature = "stubgen")]
use pyo3_stub_gen::derive::{gen_stub_pyclass, gen_stub_pymethods};
use tracknet_core::prelude::*;
use wkt::{ToWkt, TryFromWkt};

use crate::map_core_error;

/// Track
///
/// An ordered sequence of timestamped positions carrying named per-point
/// analytical features (speed, curvilinear abscissa, segmentation marks).
///
/// Example:
///
/// .. code-block:: python
///
///     track = Track([0.0, 1.0, 2.0], [0.0, 0.0, 0.0], timestamps=[0.0, 1.0, 2.0])
///     track.compute_speed()
///     print(track.feature("speed"))
#[cfg_attr(feature = "stubgen", gen_stub_pyclass)]
#[pyclass(name = "Track")]
#[derive(Clone)]
pub struct PyTrack {
    pub(crate) inner: Track,
}

impl From<Track> for PyTrack {
    fn from(inner: Track) -> Self {
        Self { inner }
    }
}

#[cfg_attr(feature = "stubgen", gen_stub_pymethods)]
#[pymethods]
impl PyTrack {
    /// Build a track from coordinate lists; timestamps are seconds since the
    /// Unix epoch
    #[new]
    #[pyo3(signature = (xs, ys, zs=None, timestamps=None, id="track"))]
    pub fn new(
        xs: Vec<f64>,
        ys: Vec<f64>,
        zs: Option<Vec<f64>>,
        timestamps: Option<Vec<f64>>,
        id: &str,
    ) -> PyResult<Self> {
        let size = xs.len();
        let lengths_match = ys.len() == size
            && zs.as_ref().is_none_or(|z| z.len() == size)
            && timestamps.as_ref().is_none_or(|t| t.len() == size);
        if !lengths_match {
            return Err(PyErr::new::<pyo3::exceptions::PyValueError, _>(
                "Coordinate and timestamp lists must have the same length",
            ));
        }

        let observations = (0..size)
            .map(|i| {
                let z = zs.as_ref().map_or(0.0, |z| z[i]);
                let position = Position::new(xs[i], ys[i], z);
                match &timestamps {
                    Some(t) => Observation::new(position, timestamp_from_secs(t[i])),
                    None => Observation::untimed(position),
                }
            })
            .collect();
        Ok(Track::with_observations(id, observations).into())
    }

    /// Untimed track from a WKT `LINESTRING`
    #[staticmethod]
    #[pyo3(signature = (wkt, id="track"))]
    pub fn from_wkt(wkt: &str, id: &str) -> PyResult<Self> {
        let line = LineString::<f64>::try_from_wkt_str(wkt).map_err(|e| {
            PyErr::new::<pyo3::exceptions::PyValueError, _>(format!(
                "Failed to parse track WKT: {e}"
            ))
        })?;
        Ok(Track::from_line_string(id, &line).into())
    }

    #[getter]
    fn id(&self) -> String {
        self.inner.id().to_string()
    }

    #[getter]
    fn xs(&self) -> Vec<f64> {
        self.inner.xs()
    }

    #[getter]
    fn ys(&self) -> Vec<f64> {
        self.inner.ys()
    }

    #[getter]
    fn zs(&self) -> Vec<f64> {
        self.inner.zs()
    }

    #[getter]
    fn timestamps(&self) -> Vec<DateTime<Utc>> {
        self.inner.observations().iter().map(|o| o.timestamp).collect()
    }

    pub fn length(&self) -> f64 {
        self.inner.length()
    }

    /// Seconds between the first and last points
    pub fn duration(&self) -> f64 {
        self.inner.duration()
    }

    pub fn feature_names(&self) -> Vec<String> {
        self.inner.feature_names().map(str::to_string).collect()
    }

    /// Values of a feature, or of the `x`, `y` and `z` coordinates
    pub fn feature(&self, name: &str) -> PyResult<Vec<f64>> {
        self.inner
            .values(name)
            .map_err(|e| map_core_error("Cannot read feature", e))
    }

    pub fn create_feature(&mut self, name: &str, values: Vec<f64>) -> PyResult<()> {
        self.inner
            .create_feature(name, values)
            .map_err(|e| map_core_error("Cannot create feature", e))
    }

    pub fn set_feature_value(&mut self, name: &str, index: usize, value: f64) -> PyResult<()> {
        self.inner
            .set_feature_value(name, index, value)
            .map_err(|e| map_core_error("Cannot set feature value", e))
    }

    pub fn compute_speed(&mut self) {
        self.inner.compute_speed();
    }

    pub fn compute_abs_curv(&mut self) {
        self.inner.compute_abs_curv();
    }

    /// Copy of the points `begin` to `end`, both included
    pub fn extract(&self, begin: usize, end: usize) -> Self {
        self.inner.extract(begin, end).into()
    }

    pub fn to_wkt(&self) -> String {
        self.inner.to_line_string().to_wkt().to_string()
    }

    fn __len__(&self) -> usize {
        self.inner.size()
    }

    fn __repr__(&self) -> String {
        format!(
            "Track(id={}, points={}, features={:?})",
            self.inner.id(),
            self.inner.size(),
            self.feature_names()
        )
    }
}
