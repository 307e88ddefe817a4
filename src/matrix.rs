#[cfg(feature = "stubgen")]
use pyo3_stub_gen::derive::gen_stub_pyfunction;
use pyo3::prelude::*;
use rayon::prelude::*;

use crate::map_core_error;
use crate::network::PyNetwork;

/// Network distances between every pair of the given nodes
///
/// Row `i` holds the distances from `node_ids[i]`; unreachable pairs (or
/// pairs beyond `cutoff`) are None. One search runs per source, in parallel.
#[cfg_attr(feature = "stubgen", gen_stub_pyfunction)]
#[pyfunction]
#[pyo3(signature = (network, node_ids, cutoff=0.0))]
pub fn distance_matrix(
    py: Python<'_>,
    network: &PyNetwork,
    node_ids: Vec<String>,
    cutoff: f64,
) -> PyResult<Vec<Vec<Option<f64>>>> {
    let matrix = py.detach(|| {
        node_ids
            .par_iter()
            .map(|source| {
                let distances = network
                    .network
                    .shortest_path_all_distances(source, cutoff)?;
                Ok(node_ids
                    .iter()
                    .map(|target| distances.get(target).copied())
                    .collect::<Vec<_>>())
            })
            .collect::<Result<Vec<_>, tracknet_core::Error>>()
    });

    matrix.map_err(|e| map_core_error("Distance matrix failed", e))
}
