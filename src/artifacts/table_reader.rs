use csv;
use failure::Fail;
use indicatif::ProgressBar;
use log::{debug, info};

use std::io;

use crate::store::{CoreError, LabeledTable, Matrix};

#[derive(Debug, Fail)]
pub enum ArtifactLoadError {
    #[fail(display = "I/O error: {}", _0)]
    Io(io::Error),
    #[fail(display = "Csv error: {}", _0)]
    Csv(csv::Error),
    #[fail(display = "Bundle error: {}", _0)]
    Bundle(bincode::Error),
    #[fail(display = "Missing header in '{}'", _0)]
    MissingHeader(String),
    #[fail(display = "Malformed '{}' at line {}: {}", name, line, reason)]
    Malformed {
        name: String,
        line: u64,
        reason: String,
    },
    #[fail(display = "Artifact violates an invariant: {}", _0)]
    Invariant(CoreError),
}

impl From<io::Error> for ArtifactLoadError {
    fn from(err: io::Error) -> ArtifactLoadError {
        ArtifactLoadError::Io(err)
    }
}

impl From<csv::Error> for ArtifactLoadError {
    fn from(err: csv::Error) -> ArtifactLoadError {
        ArtifactLoadError::Csv(err)
    }
}

impl From<bincode::Error> for ArtifactLoadError {
    fn from(err: bincode::Error) -> ArtifactLoadError {
        ArtifactLoadError::Bundle(err)
    }
}

impl From<CoreError> for ArtifactLoadError {
    fn from(err: CoreError) -> ArtifactLoadError {
        ArtifactLoadError::Invariant(err)
    }
}

#[inline]
fn record_size(record: &csv::StringRecord) -> u64 {
    record.iter().map(|e| e.len() as u64).sum()
}

/**
 * Reads a labeled numeric table. The first row holds the column labels (its first cell is
 * ignored), every other row starts with its row label.
 */
pub fn read_labeled_table<R: io::Read>(
    name: &str,
    input: R,
    progress_bar: &ProgressBar,
) -> Result<LabeledTable, ArtifactLoadError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(input);

    let mut records = csv_reader.records();

    let header = match records.next() {
        Some(header) => header?,
        None => return Err(ArtifactLoadError::MissingHeader(name.to_owned())),
    };
    progress_bar.inc(record_size(&header));

    let col_labels: Vec<String> = header.iter().skip(1).map(String::from).collect();
    debug!("'{}' has {} columns", name, col_labels.len());

    let mut row_labels = Vec::new();
    let mut rows = Vec::new();

    for record_result in records {
        let record = record_result?;
        let line = record.position().map(|p| p.line()).unwrap_or_default();

        if record.len() != header.len() {
            return Err(ArtifactLoadError::Malformed {
                name: name.to_owned(),
                line,
                reason: format!("expected {} fields, found {}", header.len(), record.len()),
            });
        }

        let mut row = Vec::with_capacity(col_labels.len());
        for (field, label) in record.iter().skip(1).zip(col_labels.iter()) {
            let value = field.parse::<f64>().map_err(|_| ArtifactLoadError::Malformed {
                name: name.to_owned(),
                line,
                reason: format!("value '{}' for column '{}' is not a number", field, label),
            })?;
            row.push(value);
        }

        row_labels.push(record.get(0).unwrap_or_default().to_owned());
        rows.push(row);
        progress_bar.inc(record_size(&record));
    }

    info!(
        "Read '{}': {} rows x {} columns",
        name,
        row_labels.len(),
        col_labels.len()
    );

    let values = Matrix::from_rows(name, col_labels.len(), rows)?;

    Ok(LabeledTable {
        row_labels,
        col_labels,
        values,
    })
}
