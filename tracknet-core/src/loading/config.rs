use serde::Deserialize;

use crate::Error;

/// Column layout of a network CSV file.
///
/// Every row describes one edge. Positions are zero based column indices;
/// optional columns set to `None` fall back to a row counter (edge id),
/// [`crate::model::Orientation::Double`] (orientation) or the geometry
/// length (weight).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct NetworkFormat {
    /// Field separator
    pub separator: char,
    /// Number of leading lines to ignore
    pub header_lines: usize,
    pub pos_edge_id: Option<usize>,
    /// Column holding the `LINESTRING` WKT geometry
    pub pos_wkt: usize,
    pub pos_orientation: Option<usize>,
    pub pos_weight: Option<usize>,
    pub pos_source: usize,
    pub pos_target: usize,
}

impl Default for NetworkFormat {
    fn default() -> Self {
        Self {
            separator: ',',
            header_lines: 1,
            pos_edge_id: Some(0),
            pos_wkt: 1,
            pos_orientation: Some(2),
            pos_weight: None,
            pos_source: 3,
            pos_target: 4,
        }
    }
}

impl NetworkFormat {
    /// Reads a format from JSON, omitted fields keep their default value
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidData`] if the JSON does not describe a format
    pub fn from_json_str(json: &str) -> Result<Self, Error> {
        let format: NetworkFormat = serde_json::from_str(json)
            .map_err(|e| Error::InvalidData(format!("Invalid network format: {e}")))?;
        format.validate()?;
        Ok(format)
    }

    pub(crate) fn validate(&self) -> Result<(), Error> {
        if !self.separator.is_ascii() {
            return Err(Error::InvalidData(format!(
                "separator must be a single ASCII character, got {:?}",
                self.separator
            )));
        }
        if self.pos_source == self.pos_target {
            return Err(Error::InvalidData(
                "source and target columns must differ".to_string(),
            ));
        }
        Ok(())
    }

    /// Separator as the byte expected by the CSV reader
    pub(crate) fn delimiter(&self) -> u8 {
        u8::try_from(self.separator).unwrap_or(b',')
    }

    /// Number of columns a row must at least have
    pub(crate) fn min_columns(&self) -> usize {
        [
            self.pos_edge_id,
            Some(self.pos_wkt),
            self.pos_orientation,
            self.pos_weight,
            Some(self.pos_source),
            Some(self.pos_target),
        ]
        .into_iter()
        .flatten()
        .max()
        .map_or(0, |pos| pos + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let format =
            NetworkFormat::from_json_str(r#"{"separator": ";", "pos_weight": 5}"#).unwrap();
        assert_eq!(format.separator, ';');
        assert_eq!(format.delimiter(), b';');
        assert_eq!(format.pos_weight, Some(5));
        assert_eq!(format.pos_wkt, 1);
        assert_eq!(format.min_columns(), 6);
    }

    #[test]
    fn test_invalid_json() {
        assert!(NetworkFormat::from_json_str("{\"separator\": 3}").is_err());
        assert!(NetworkFormat::from_json_str("{\"separator\": \"é\"}").is_err());
        assert!(NetworkFormat::from_json_str("{\"pos_source\": 4}").is_err());
    }
}
