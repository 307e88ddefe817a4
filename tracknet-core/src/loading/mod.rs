//! This module is responsible for loading networks from delimited text
//! files whose rows are WKT edge geometries.

mod config;
mod reader;

pub use config::NetworkFormat;
pub use reader::{read_network, read_network_from_reader};
