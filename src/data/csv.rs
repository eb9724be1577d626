//! CSV format dataset implementation
//!
//! Supports loading datasets from CSV files where:
//! - The last column is the integer class label
//! - All other columns are dense features
//! - First row can be headers (automatically detected)
//! - Blank lines and lines starting with `#` are skipped

use crate::core::{Dataset, Result, SVMError, Sample};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Dense dataset loaded from CSV
#[derive(Debug, Clone)]
pub struct CSVDataset {
    samples: Vec<Sample>,
    dimensions: usize,
}

impl CSVDataset {
    /// Load a dataset from a CSV file
    ///
    /// The last column is assumed to be the label.
    /// Headers are automatically detected if present.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    /// Load a dataset from a reader, detecting a header row
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        Self::from_reader_with_options(reader, true)
    }

    /// Load a dataset from a reader with explicit header option
    pub fn from_reader_with_options<R: BufRead>(
        reader: R,
        auto_detect_header: bool,
    ) -> Result<Self> {
        let mut samples: Vec<Sample> = Vec::new();
        let mut dimensions = None;
        let mut first_data_line = true;

        for (line_no, line) in reader.lines().enumerate() {
            let line = line?;
            let line = line.trim();

            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if first_data_line {
                first_data_line = false;
                if auto_detect_header && Self::is_header_line(line) {
                    continue;
                }
            }

            let sample = Self::parse_data_line(line).map_err(|e| match e {
                SVMError::ParseError(msg) => {
                    SVMError::ParseError(format!("line {}: {msg}", line_no + 1))
                }
                other => other,
            })?;

            match dimensions {
                None => dimensions = Some(sample.dim()),
                Some(dim) if dim != sample.dim() => {
                    return Err(SVMError::DimensionMismatch {
                        expected: dim,
                        actual: sample.dim(),
                    });
                }
                Some(_) => {}
            }
            samples.push(sample);
        }

        let dimensions = match dimensions {
            Some(dim) if !samples.is_empty() => dim,
            _ => {
                return Err(SVMError::InvalidInput(
                    "CSV input contains no samples".to_string(),
                ))
            }
        };

        Ok(CSVDataset {
            samples,
            dimensions,
        })
    }

    /// Build a dataset from in-memory rows and labels
    pub fn from_parts(features: Vec<Vec<f64>>, labels: Vec<usize>) -> Result<Self> {
        let dimensions = crate::utils::validation::check_training_set(&features, &labels)?;
        let samples = features
            .into_iter()
            .zip(labels)
            .map(|(features, label)| Sample::new(features, label))
            .collect();
        Ok(CSVDataset {
            samples,
            dimensions,
        })
    }

    /// Check if a line appears to be a header
    fn is_header_line(line: &str) -> bool {
        let fields: Vec<&str> = line.split(',').collect();

        if fields.len() < 2 {
            return false;
        }

        // Most feature columns failing to parse as numbers means a header
        let feature_count = fields.len() - 1;
        let non_numeric_count = fields
            .iter()
            .take(feature_count)
            .filter(|field| field.trim().parse::<f64>().is_err())
            .count();

        non_numeric_count * 2 > feature_count
    }

    /// Parse a CSV data line into a Sample
    fn parse_data_line(line: &str) -> Result<Sample> {
        let fields: Vec<&str> = line.split(',').map(|f| f.trim()).collect();

        if fields.len() < 2 {
            return Err(SVMError::ParseError(format!(
                "Line has too few fields: {line}"
            )));
        }

        let label_str = fields[fields.len() - 1];
        let label = label_str
            .parse::<usize>()
            .map_err(|_| SVMError::ParseError(format!("Invalid class label: {label_str}")))?;

        let features = fields[..fields.len() - 1]
            .iter()
            .enumerate()
            .map(|(idx, field)| {
                field.parse::<f64>().map_err(|_| {
                    SVMError::ParseError(format!(
                        "Invalid feature value at column {}: {field}",
                        idx + 1
                    ))
                })
            })
            .collect::<Result<Vec<f64>>>()?;

        Ok(Sample::new(features, label))
    }

    /// Number of classes implied by the labels (largest label + 1)
    pub fn num_classes(&self) -> usize {
        self.samples
            .iter()
            .map(|s| s.label + 1)
            .max()
            .unwrap_or(0)
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }
}

impl Dataset for CSVDataset {
    fn len(&self) -> usize {
        self.samples.len()
    }

    fn dim(&self) -> usize {
        self.dimensions
    }

    fn get_sample(&self, i: usize) -> Sample {
        self.samples[i].clone()
    }

    fn get_labels(&self) -> Vec<usize> {
        self.samples.iter().map(|s| s.label).collect()
    }
}
