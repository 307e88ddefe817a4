use pyo3::prelude::*;
#[cfg(feature = "stubgen")]
use pyo3_stub_gen::define_stub_info_gatherer;

use analysis::{PyStopCollection, find_stops, remove_stops, segment, split};
use matrix::distance_matrix;
use network::{PyNetwork, py_read_network};
use track::PyTrack;

pub mod analysis;
pub mod matrix;
pub mod network;
pub mod track;

/// Maps core errors on Python exceptions: lookups and bad input raise
/// `ValueError`, I/O and parsing failures `RuntimeError`
pub(crate) fn map_core_error(context: &str, error: tracknet_core::Error) -> PyErr {
    use tracknet_core::Error;

    let message = format!("{context}: {error}");
    match error {
        Error::UnknownNode(_)
        | Error::DuplicateNode(_)
        | Error::UnknownEdge(_)
        | Error::DuplicateEdge(_)
        | Error::UnknownFeature(_)
        | Error::InvalidData(_) => PyErr::new::<pyo3::exceptions::PyValueError, _>(message),
        Error::IoError(_) | Error::CsvError(_) | Error::GeoJsonError(_) => {
            PyErr::new::<pyo3::exceptions::PyRuntimeError, _>(message)
        }
    }
}

/// A Python module implemented in Rust.
#[pymodule]
fn tracknet(m: &Bound<'_, PyModule>) -> PyResult<()> {
    pyo3_log::init();

    m.add_class::<PyNetwork>()?;
    m.add_function(wrap_pyfunction!(py_read_network, m)?)?;
    m.add_function(wrap_pyfunction!(distance_matrix, m)?)?;

    m.add_class::<PyTrack>()?;
    m.add_function(wrap_pyfunction!(segment, m)?)?;
    m.add_function(wrap_pyfunction!(split, m)?)?;

    m.add_class::<PyStopCollection>()?;
    m.add_function(wrap_pyfunction!(find_stops, m)?)?;
    m.add_function(wrap_pyfunction!(remove_stops, m)?)?;
    Ok(())
}

#[cfg(feature = "stubgen")]
define_stub_info_gatherer!(stub_info);
