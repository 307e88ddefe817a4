//! Conversion of networks, paths and stops to `GeoJSON`

mod to_geojson;
