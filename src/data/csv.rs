// CSV data source and sink implementation
// Author: Gabriel Demetrios Lafis

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use super::{DataError, DataSet, DataSink, DataSource, Row, Value};

/// CSV data source
pub struct CsvSource {
    path: String,
    has_header: bool,
    delimiter: char,
}

impl CsvSource {
    /// Create a new CSV data source
    pub fn new<P: AsRef<Path>>(path: P, has_header: bool, delimiter: char) -> Self {
        CsvSource {
            path: path.as_ref().to_string_lossy().to_string(),
            has_header,
            delimiter,
        }
    }

    /// Read a dataset from any reader.
    ///
    /// Empty cells become `Value::Null`; every other cell is kept as raw text.
    /// Records shorter than the header simply lack the trailing columns.
    pub fn read_from<R: Read>(&self, reader: R) -> Result<DataSet, DataError> {
        let mut csv_reader = ::csv::ReaderBuilder::new()
            .delimiter(self.delimiter as u8)
            .has_headers(self.has_header)
            .flexible(true)
            .from_reader(reader);

        let mut headers: Vec<String> = if self.has_header {
            csv_reader
                .headers()
                .map_err(|e| DataError::ParseError(e.to_string()))?
                .iter()
                .map(|s| s.to_string())
                .collect()
        } else {
            Vec::new()
        };

        let mut dataset = DataSet::new();

        for result in csv_reader.records() {
            let record = result.map_err(|e| DataError::ParseError(e.to_string()))?;

            // Generate column names if no header
            while headers.len() < record.len() {
                headers.push(format!("column_{}", headers.len()));
            }

            let row: Row = headers
                .iter()
                .zip(record.iter())
                .map(|(name, field)| {
                    let value = if field.is_empty() {
                        Value::Null
                    } else {
                        Value::String(field.to_string())
                    };
                    (name.clone(), value)
                })
                .collect();

            dataset.add_row(row);
        }

        Ok(dataset)
    }
}

impl DataSource for CsvSource {
    fn read(&self) -> Result<DataSet, DataError> {
        let file = File::open(&self.path)?;
        let mut dataset = self.read_from(BufReader::new(file))?;

        // Add metadata
        dataset.metadata.add("source".to_string(), "csv".to_string());
        dataset.metadata.add("path".to_string(), self.path.clone());

        Ok(dataset)
    }

    fn name(&self) -> &str {
        &self.path
    }
}

/// CSV data sink
pub struct CsvSink {
    path: String,
    delimiter: char,
}

impl CsvSink {
    /// Create a new CSV data sink
    pub fn new<P: AsRef<Path>>(path: P, delimiter: char) -> Self {
        CsvSink {
            path: path.as_ref().to_string_lossy().to_string(),
            delimiter,
        }
    }

    /// Write a dataset to any writer.
    ///
    /// The header is the union of columns in first-seen order; absent and
    /// null cells are written empty.
    pub fn write_to<W: Write>(&self, data: &DataSet, writer: W) -> Result<(), DataError> {
        let mut csv_writer = ::csv::WriterBuilder::new()
            .delimiter(self.delimiter as u8)
            .from_writer(writer);

        let headers = data.columns_in_order();

        csv_writer
            .write_record(&headers)
            .map_err(|e| DataError::IoError(std::io::Error::new(std::io::ErrorKind::Other, e)))?;

        for row in &data.rows {
            let record: Vec<String> = headers
                .iter()
                .map(|column| row.get(column).map_or_else(String::new, Value::to_csv_field))
                .collect();

            csv_writer
                .write_record(&record)
                .map_err(|e| DataError::IoError(std::io::Error::new(std::io::ErrorKind::Other, e)))?;
        }

        csv_writer.flush()?;

        Ok(())
    }
}

impl DataSink for CsvSink {
    fn write(&self, data: &DataSet) -> Result<(), DataError> {
        let file = File::create(&self.path)?;
        self.write_to(data, BufWriter::new(file))
    }

    fn name(&self) -> &str {
        &self.path
    }
}
