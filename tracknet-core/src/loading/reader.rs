use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;
use geo::LineString;
use log::{debug, info, warn};
use wkt::TryFromWkt;

use super::config::NetworkFormat;
use crate::{
    Error,
    model::{Edge, Network, Node, Orientation},
    track::{Position, Track},
};

/// Loads a network from a CSV file of WKT edges
///
/// # Errors
///
/// Returns an error if the file cannot be opened or is not valid CSV
pub fn read_network(path: impl AsRef<Path>, format: &NetworkFormat) -> Result<Network, Error> {
    let path = path.as_ref();
    info!("Loading network from {}", path.display());
    let file = File::open(path)?;
    read_network_from_reader(file, format)
}

/// Loads a network from any CSV source.
///
/// Endpoints shared by several edges become a single node: the first row
/// mentioning a node id places it, later rows reuse it. Malformed rows are
/// skipped.
///
/// # Errors
///
/// Returns [`Error::InvalidData`] for an invalid format and
/// [`Error::CsvError`] if the input is not valid CSV
pub fn read_network_from_reader<R: Read>(
    reader: R,
    format: &NetworkFormat,
) -> Result<Network, Error> {
    format.validate()?;

    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(format.delimiter())
        .from_reader(reader);

    let mut network = Network::new();
    let mut skipped = 0usize;

    for (row, record) in csv_reader
        .records()
        .skip(format.header_lines)
        .enumerate()
    {
        let record = record?;
        match parse_row(&record, row, format) {
            Some(parsed) => {
                if !insert_row(&mut network, parsed) {
                    skipped += 1;
                }
            }
            None => skipped += 1,
        }
    }

    info!(
        "Loaded network with {} nodes and {} edges ({skipped} rows skipped)",
        network.node_count(),
        network.edge_count()
    );
    Ok(network)
}

struct Row {
    edge_id: String,
    geometry: LineString<f64>,
    orientation: Orientation,
    weight: Option<f64>,
    source: String,
    target: String,
}

fn parse_row(record: &StringRecord, row: usize, format: &NetworkFormat) -> Option<Row> {
    if record.len() < format.min_columns() {
        debug!("Row {row}: expected {} columns, got {}", format.min_columns(), record.len());
        return None;
    }
    let field = |pos: usize| record.get(pos).map(str::trim).unwrap_or_default();

    let edge_id = format
        .pos_edge_id
        .map_or_else(|| row.to_string(), |pos| field(pos).to_string());

    let geometry = match LineString::<f64>::try_from_wkt_str(field(format.pos_wkt)) {
        Ok(line) if line.0.len() >= 2 => line,
        Ok(_) => {
            debug!("Row {row}: edge {edge_id} has fewer than 2 points");
            return None;
        }
        Err(e) => {
            debug!("Row {row}: unreadable geometry for edge {edge_id}: {e}");
            return None;
        }
    };

    let orientation = format
        .pos_orientation
        .and_then(|pos| field(pos).parse::<i64>().ok())
        .map_or(Orientation::Double, Orientation::from_code);

    let weight = format.pos_weight.and_then(|pos| {
        let parsed = field(pos).parse::<f64>().ok();
        if parsed.is_none() {
            debug!("Row {row}: unreadable weight for edge {edge_id}, using length");
        }
        parsed
    });

    Some(Row {
        edge_id,
        geometry,
        orientation,
        weight,
        source: field(format.pos_source).to_string(),
        target: field(format.pos_target).to_string(),
    })
}

/// Adds the row's edge and its endpoints (when new), `false` if the row was
/// rejected. Nothing is inserted for a rejected row.
fn insert_row(network: &mut Network, row: Row) -> bool {
    if network.has_edge(&row.edge_id) {
        warn!("Skipping edge: {}", Error::DuplicateEdge(row.edge_id));
        return false;
    }

    let mut geometry = Track::from_line_string(row.edge_id.clone(), &row.geometry);
    geometry.compute_abs_curv();
    let mut edge = Edge::new(row.edge_id, geometry).with_orientation(row.orientation);
    if let Some(weight) = row.weight {
        edge = edge.with_weight(weight);
    }
    if !edge.weight.is_finite() || edge.weight < 0.0 {
        warn!("Skipping edge {}: invalid weight {}", edge.id, edge.weight);
        return false;
    }

    let endpoints = [
        (&row.source, edge.geometry.first()),
        (&row.target, edge.geometry.last()),
    ];
    let mut new_nodes = Vec::new();
    for (id, observation) in endpoints {
        if network.has_node(id) || new_nodes.iter().any(|n: &Node| &n.id == id) {
            continue;
        }
        let coord = observation.map_or_else(Position::default, |o| o.position);
        new_nodes.push(Node::new(id.clone(), coord));
    }
    for node in new_nodes {
        if let Err(e) = network.add_node(node) {
            warn!("Cannot add node: {e}");
            return false;
        }
    }

    match network.add_edge(edge, &row.source, &row.target) {
        Ok(_) => true,
        Err(e) => {
            warn!("Skipping edge: {e}");
            false
        }
    }
}
