use std::collections::HashMap;

use pyo3::prelude::*;
use pyo3::types::PyDict;
#[cfg(feature = "stubgen")]
use pyo3_stub_gen::derive::{gen_stub_pyclass, gen_stub_pyfunction, gen_stub_pymethods};
use tracknet_core::prelude::*;
use wkt::ToWkt;

use crate::map_core_error;
use crate::track::PyTrack;

/// Network
///
/// A road or path network whose edges are polylines, each with a
/// circulation orientation relative to its source and target nodes.
///
/// Example:
///
/// .. code-block:: python
///
///     network = read_network("edges.csv")
///     path = network.shortest_path("n1", "n42")
///     print(path["distance"], path["nodes"])
#[cfg_attr(feature = "stubgen", gen_stub_pyclass)]
#[pyclass(name = "Network")]
pub struct PyNetwork {
    pub(crate) network: Network,
}

#[cfg_attr(feature = "stubgen", gen_stub_pymethods)]
#[pymethods]
impl PyNetwork {
    pub fn node_count(&self) -> usize {
        self.network.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.network.edge_count()
    }

    pub fn node_ids(&self) -> Vec<String> {
        self.network.nodes().map(|n| n.id.clone()).collect()
    }

    /// Node coordinates as `(x, y, z)`
    pub fn node_position(&self, node_id: &str) -> PyResult<(f64, f64, f64)> {
        let node = self.network.node(node_id).ok_or_else(|| {
            PyErr::new::<pyo3::exceptions::PyValueError, _>(format!("Unknown node: {node_id}"))
        })?;
        Ok((node.coord.x, node.coord.y, node.coord.z))
    }

    /// Edge geometry as WKT `LINESTRING`
    pub fn edge_wkt(&self, edge_id: &str) -> PyResult<String> {
        let edge = self
            .network
            .require_edge(edge_id)
            .map_err(|e| map_core_error("Cannot export edge", e))?;
        Ok(edge.geometry.to_line_string().to_wkt().to_string())
    }

    /// Extent as `(xmin, xmax, ymin, ymax)`, `None` for an empty network
    pub fn bbox(&self) -> Option<(f64, f64, f64, f64)> {
        self.network.bbox().map(BoundingBox::as_tuple)
    }

    /// Ids of the nodes within `radius` of `node_id`, itself included
    pub fn select(&self, node_id: &str, radius: f64) -> PyResult<Vec<String>> {
        let node = self.network.node(node_id).ok_or_else(|| {
            PyErr::new::<pyo3::exceptions::PyValueError, _>(format!("Unknown node: {node_id}"))
        })?;
        Ok(self
            .network
            .select(node, radius)
            .into_iter()
            .map(|n| n.id.clone())
            .collect())
    }

    pub fn nearest_node(&self, x: f64, y: f64) -> Option<String> {
        self.network.nearest_node(x, y).map(|n| n.id.clone())
    }

    /// Shortest path between two nodes
    ///
    /// Parameters
    /// ----------
    /// source : str
    ///     Id of the start node
    /// target : str
    ///     Id of the end node
    /// cutoff : float, default=0.0
    ///     Maximal path length, 0 for no limit
    ///
    /// Returns
    /// -------
    /// dict or None
    ///     `distance`, `nodes`, `edge_ids`, per-point `distances` and the
    ///     path geometry as `wkt`, or None when the target is unreachable
    ///     within the cutoff
    #[pyo3(signature = (source, target, cutoff=0.0))]
    pub fn shortest_path<'py>(
        &self,
        py: Python<'py>,
        source: &str,
        target: &str,
        cutoff: f64,
    ) -> PyResult<Option<Bound<'py, PyDict>>> {
        let path = py
            .detach(|| self.network.shortest_path(source, target, cutoff))
            .map_err(|e| map_core_error("Shortest path failed", e))?;

        let Some(path) = path else {
            return Ok(None);
        };

        let dict = PyDict::new(py);
        dict.set_item("distance", path.total_distance())?;
        dict.set_item("nodes", path.nodes())?;
        dict.set_item("edge_ids", path.edge_ids())?;
        dict.set_item("distances", path.distances())?;
        dict.set_item("wkt", path.track().to_line_string().to_wkt().to_string())?;
        dict.set_item("track", PyTrack::from(path.into_track()))?;
        Ok(Some(dict))
    }

    /// Length of the shortest path, None when unreachable within `cutoff`
    #[pyo3(signature = (source, target, cutoff=0.0))]
    pub fn shortest_path_distance(
        &self,
        py: Python<'_>,
        source: &str,
        target: &str,
        cutoff: f64,
    ) -> PyResult<Option<f64>> {
        py.detach(|| self.network.shortest_path_distance(source, target, cutoff))
            .map_err(|e| map_core_error("Shortest path failed", e))
    }

    /// Distances from `source` to every node reachable within `cutoff`
    #[pyo3(signature = (source, cutoff=0.0))]
    pub fn shortest_path_distances(
        &self,
        py: Python<'_>,
        source: &str,
        cutoff: f64,
    ) -> PyResult<HashMap<String, f64>> {
        let distances = py
            .detach(|| self.network.shortest_path_distances(source, cutoff))
            .map_err(|e| map_core_error("Distance computation failed", e))?;
        Ok(distances.into_iter().collect())
    }

    /// Edges as a `GeoJSON` FeatureCollection string
    pub fn to_geojson(&self) -> PyResult<String> {
        self.network
            .to_geojson_string()
            .map_err(|e| map_core_error("GeoJSON export failed", e))
    }

    fn __repr__(&self) -> String {
        format!(
            "Network with {} nodes and {} edges",
            self.network.node_count(),
            self.network.edge_count()
        )
    }

    fn __str__(&self) -> String {
        self.__repr__()
    }
}

/// Load a network from a CSV file of WKT edges
///
/// Parameters
/// ----------
/// path : str
///     Path to the delimited text file, one edge per row
/// format : str, optional
///     JSON object overriding the column layout (`separator`,
///     `header_lines`, `pos_edge_id`, `pos_wkt`, `pos_orientation`,
///     `pos_weight`, `pos_source`, `pos_target`)
///
/// Returns
/// -------
/// Network
///
/// Raises
/// ------
/// ValueError
///     If the format description is invalid
/// RuntimeError
///     If the file cannot be read
///
/// Notes
/// -----
/// The function releases the GIL while reading.
#[cfg_attr(feature = "stubgen", gen_stub_pyfunction)]
#[pyfunction(name = "read_network")]
#[pyo3(signature = (path, format=None))]
pub fn py_read_network(py: Python<'_>, path: &str, format: Option<&str>) -> PyResult<PyNetwork> {
    let format = format
        .map(NetworkFormat::from_json_str)
        .transpose()
        .map_err(|e| map_core_error("Invalid network format", e))?
        .unwrap_or_default();

    py.detach(|| {
        let network = tracknet_core::read_network(path, &format)
            .map_err(|e| map_core_error("Failed to load network", e))?;
        Ok(PyNetwork { network })
    })
}
