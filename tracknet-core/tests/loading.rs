use std::io::Write;

use tracknet_core::prelude::*;

const NETWORK: &str = "\
edge;geometry;sens;from;to
1;LINESTRING (0 0, 5 0);1;n1;n2
2;LINESTRING (5 0, 5 5, 10 5);0;n2;n3
3;LINESTRING (10 5, 0 0);-1;n1;n3
";

fn format() -> NetworkFormat {
    NetworkFormat::from_json_str(r#"{"separator": ";"}"#).unwrap()
}

#[test]
fn loaded_network_is_routable() {
    let network = read_network_from_reader(NETWORK.as_bytes(), &format()).unwrap();
    assert_eq!(network.node_count(), 3);
    assert_eq!(network.edge_count(), 3);

    let path = network.shortest_path("n1", "n3", 0.0).unwrap().unwrap();
    assert_eq!(path.nodes(), &["n1", "n2", "n3"]);
    assert!((path.total_distance() - 15.0).abs() < 1e-9);

    // Edge 3 only runs from n3 to n1 and its geometry is stored that way
    let back = network.shortest_path("n3", "n1", 0.0).unwrap().unwrap();
    assert_eq!(back.edge_ids()[0], "3");
    assert_eq!(back.track().first().unwrap().position, Position::planar(10.0, 5.0));
}

#[test]
fn network_round_trips_through_a_file() {
    let path = std::env::temp_dir().join(format!("tracknet-loading-{}.csv", std::process::id()));
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(NETWORK.as_bytes()).unwrap();
    drop(file);

    let network = read_network(&path, &format()).unwrap();
    std::fs::remove_file(&path).unwrap();

    let geojson = network.to_geojson().unwrap();
    assert_eq!(geojson.features.len(), 3);
    assert_eq!(
        geojson.features[2].property("orientation"),
        Some(&serde_json::json!(-1))
    );
}
