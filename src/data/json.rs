// JSON data source and sink implementation
// Author: Gabriel Demetrios Lafis

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde_json::Value as JsonValue;

use super::{DataError, DataSet, DataSink, DataSource};

/// JSON data source reading an array of row objects
pub struct JsonSource {
    path: String,
    array_path: Option<String>,
}

impl JsonSource {
    /// Create a new JSON data source
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        JsonSource {
            path: path.as_ref().to_string_lossy().to_string(),
            array_path: None,
        }
    }

    /// Create a new JSON data source with a dotted path to the array
    pub fn with_array_path<P: AsRef<Path>, S: Into<String>>(path: P, array_path: S) -> Self {
        JsonSource {
            path: path.as_ref().to_string_lossy().to_string(),
            array_path: Some(array_path.into()),
        }
    }

    /// Locate the row array inside a parsed document
    pub fn select_rows<'a>(&self, json: &'a JsonValue) -> Result<&'a JsonValue, DataError> {
        let Some(array_path) = &self.array_path else {
            return Ok(json);
        };

        let mut current = json;
        for part in array_path.split('.') {
            current = current.get(part).ok_or_else(|| {
                DataError::ParseError(format!("Path '{}' not found in JSON", array_path))
            })?;
        }

        Ok(current)
    }
}

impl DataSource for JsonSource {
    fn read(&self) -> Result<DataSet, DataError> {
        let file = File::open(&self.path)?;
        let reader = BufReader::new(file);

        let json: JsonValue =
            serde_json::from_reader(reader).map_err(|e| DataError::ParseError(e.to_string()))?;

        let mut dataset = DataSet::from_json(self.select_rows(&json)?)?;

        // Add metadata
        dataset.metadata.add("source".to_string(), "json".to_string());
        dataset.metadata.add("path".to_string(), self.path.clone());

        Ok(dataset)
    }

    fn name(&self) -> &str {
        &self.path
    }
}

/// JSON data sink
pub struct JsonSink {
    path: String,
    pretty: bool,
}

impl JsonSink {
    /// Create a new JSON data sink
    pub fn new<P: AsRef<Path>>(path: P, pretty: bool) -> Self {
        JsonSink {
            path: path.as_ref().to_string_lossy().to_string(),
            pretty,
        }
    }
}

impl DataSink for JsonSink {
    fn write(&self, data: &DataSet) -> Result<(), DataError> {
        let file = File::create(&self.path)?;
        let writer = BufWriter::new(file);
        let json = data.to_json();

        let written = if self.pretty {
            serde_json::to_writer_pretty(writer, &json)
        } else {
            serde_json::to_writer(writer, &json)
        };
        written.map_err(|e| DataError::IoError(e.into()))
    }

    fn name(&self) -> &str {
        &self.path
    }
}
