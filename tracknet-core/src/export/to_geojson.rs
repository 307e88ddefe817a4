use geo::Point;
use geojson::{Feature, FeatureCollection, Geometry, Value as GeoJsonValue};
use serde_json::json;

use crate::{
    Error,
    algo::stops::{Stop, StopCollection},
    model::{Edge, Network, Node},
    routing::Path,
};

fn collection(features: Vec<Feature>) -> FeatureCollection {
    FeatureCollection {
        features,
        bbox: None,
        foreign_members: None,
    }
}

fn to_string(collection: &FeatureCollection) -> Result<String, Error> {
    serde_json::to_string(collection).map_err(|e| Error::GeoJsonError(e.to_string()))
}

impl Network {
    /// One `LineString` feature per edge, in insertion order.
    pub fn to_geojson(&self) -> Result<FeatureCollection, Error> {
        let features = self
            .edges_with_endpoints()
            .map(|(edge, source, target)| edge_feature(edge, source, target))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(collection(features))
    }

    pub fn to_geojson_string(&self) -> Result<String, Error> {
        to_string(&self.to_geojson()?)
    }
}

fn edge_feature(edge: &Edge, source: &Node, target: &Node) -> Result<Feature, Error> {
    let geometry = Geometry::new(GeoJsonValue::from(&edge.geometry.to_line_string()));

    let value = json!({
        "type": "Feature",
        "id": edge.id,
        "geometry": geometry,
        "properties": {
            "orientation": edge.orientation.code(),
            "weight": edge.weight,
            "source": source.id,
            "target": target.id,
        }
    });

    Feature::from_json_value(value).map_err(|e| Error::GeoJsonError(e.to_string()))
}

impl Path {
    /// Single `LineString` feature, per-point annotations stored as arrays
    pub fn to_geojson(&self) -> Result<FeatureCollection, Error> {
        let geometry = Geometry::new(GeoJsonValue::from(&self.track().to_line_string()));

        let value = json!({
            "type": "Feature",
            "geometry": geometry,
            "properties": {
                "total_distance": self.total_distance(),
                "nodes": self.nodes(),
                "edge_ids": self.edge_ids(),
                "distances": self.distances(),
            }
        });

        let feature =
            Feature::from_json_value(value).map_err(|e| Error::GeoJsonError(e.to_string()))?;
        Ok(collection(vec![feature]))
    }

    pub fn to_geojson_string(&self) -> Result<String, Error> {
        to_string(&self.to_geojson()?)
    }
}

impl StopCollection {
    /// One `Point` feature per stop, located at the stop position
    pub fn to_geojson(&self) -> Result<FeatureCollection, Error> {
        let features = self
            .iter()
            .enumerate()
            .map(|(idx, stop)| stop_feature(idx, stop))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(collection(features))
    }

    pub fn to_geojson_string(&self) -> Result<String, Error> {
        to_string(&self.to_geojson()?)
    }
}

fn stop_feature(idx: usize, stop: &Stop) -> Result<Feature, Error> {
    let point = Point::new(stop.position.x, stop.position.y);
    let geometry = Geometry::new(GeoJsonValue::from(&point));

    let value = json!({
        "type": "Feature",
        "geometry": geometry,
        "properties": {
            "stop_index": idx,
            "timestamp": stop.timestamp.to_rfc3339(),
            "duration": stop.duration,
            "radius": stop.radius,
            "nb_points": stop.nb_points,
            "id_ini": stop.id_ini,
            "id_end": stop.id_end,
            "rmse": stop.rmse,
        }
    });

    Feature::from_json_value(value).map_err(|e| Error::GeoJsonError(e.to_string()))
}
