use csv;
use failure::Fail;
use log::info;
use serde;

use std::io;
use std::str::FromStr;

use super::engine::{Nearby, PriceRange, Recommendation};

#[derive(Debug, Fail)]
pub enum ReportError {
    #[fail(display = "Unknown output format: {}", _0)]
    UnknownFormat(String),
    #[fail(display = "I/O error: {}", _0)]
    Io(io::Error),
    #[fail(display = "Csv error: {}", _0)]
    Csv(csv::Error),
    #[fail(display = "Json error: {}", _0)]
    Json(serde_json::Error),
}

impl From<io::Error> for ReportError {
    fn from(err: io::Error) -> ReportError {
        ReportError::Io(err)
    }
}

impl From<csv::Error> for ReportError {
    fn from(err: csv::Error) -> ReportError {
        ReportError::Csv(err)
    }
}

impl From<serde_json::Error> for ReportError {
    fn from(err: serde_json::Error) -> ReportError {
        ReportError::Json(err)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputFormat {
    Csv,
    Json,
}

impl FromStr for OutputFormat {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<OutputFormat, ReportError> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(OutputFormat::Csv),
            "json" => Ok(OutputFormat::Json),
            other => Err(ReportError::UnknownFormat(other.to_owned())),
        }
    }
}

#[derive(Debug, PartialEq, serde::Serialize)]
pub struct RecommendationRow<'a> {
    #[serde(rename = "PropertyName")]
    pub property_name: &'a str,
    #[serde(rename = "SimilarityScore")]
    pub similarity_score: f64,
}

impl<'a> From<&'a Recommendation> for RecommendationRow<'a> {
    fn from(r: &'a Recommendation) -> RecommendationRow<'a> {
        RecommendationRow {
            property_name: &r.property,
            similarity_score: r.score,
        }
    }
}

/// Distances are shown in kilometers.
#[derive(Debug, PartialEq, serde::Serialize)]
pub struct NearbyRow<'a> {
    #[serde(rename = "Property Name")]
    pub property_name: &'a str,
    #[serde(rename = "Distance (km)")]
    pub distance_km: f64,
}

impl<'a> From<&'a Nearby> for NearbyRow<'a> {
    fn from(n: &'a Nearby) -> NearbyRow<'a> {
        NearbyRow {
            property_name: &n.property,
            distance_km: n.distance / 1000.0,
        }
    }
}

#[derive(Debug, PartialEq, serde::Serialize)]
pub struct NameRow<'a> {
    pub name: &'a str,
}

/// Rounded to two decimals (crores).
#[derive(Debug, PartialEq, serde::Serialize)]
pub struct PriceRow {
    pub low: f64,
    pub high: f64,
}

impl From<&PriceRange> for PriceRow {
    fn from(range: &PriceRange) -> PriceRow {
        PriceRow {
            low: (range.low * 100.0).round() / 100.0,
            high: (range.high * 100.0).round() / 100.0,
        }
    }
}

pub fn write_rows<W: io::Write, T: serde::Serialize>(
    output: W,
    rows: &[T],
    format: OutputFormat,
) -> Result<(), ReportError> {
    match format {
        OutputFormat::Csv => {
            let mut csv_writer = csv::WriterBuilder::new().from_writer(output);
            for row in rows {
                csv_writer.serialize(row)?;
            }
            csv_writer.flush()?;
        }
        OutputFormat::Json => {
            let mut output = output;
            serde_json::to_writer_pretty(&mut output, rows)?;
            writeln!(output)?;
            output.flush()?;
        }
    }

    info!("Wrote {} rows", rows.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recommendations() -> Vec<Recommendation> {
        vec![
            Recommendation { property: "M3M Golf Estate".to_owned(), score: 1.05 },
            Recommendation { property: "Central Park, Flower Valley".to_owned(), score: 0.45 },
        ]
    }

    #[test]
    fn it_should_write_csv_with_headers() {
        let recs = recommendations();
        let rows: Vec<RecommendationRow> = recs.iter().map(RecommendationRow::from).collect();

        let mut output = Vec::new();
        write_rows(&mut output, &rows, OutputFormat::Csv).unwrap();

        assert_eq!(
            String::from_utf8(output).unwrap(),
            "PropertyName,SimilarityScore\nM3M Golf Estate,1.05\n\"Central Park, Flower Valley\",0.45\n"
        );
    }

    #[test]
    fn it_should_write_json() {
        let nearby = vec![Nearby { property: "DLF The Crest".to_owned(), distance: 3200.0 }];
        let rows: Vec<NearbyRow> = nearby.iter().map(NearbyRow::from).collect();

        let mut output = Vec::new();
        write_rows(&mut output, &rows, OutputFormat::Json).unwrap();

        let parsed: serde_json::Value = serde_json::from_slice(&output).unwrap();
        assert_eq!(parsed[0]["Property Name"], "DLF The Crest");
        assert_eq!(parsed[0]["Distance (km)"], 3.2);
    }

    #[test]
    fn it_should_write_an_empty_json_array() {
        let rows: Vec<NearbyRow> = vec![];

        let mut output = Vec::new();
        write_rows(&mut output, &rows, OutputFormat::Json).unwrap();

        assert_eq!(String::from_utf8(output).unwrap(), "[]\n");
    }

    #[test]
    fn it_should_round_price_rows() {
        let range = PriceRange { low: 1.23456, base: 1.3717, high: 1.50887 };

        assert_eq!(PriceRow::from(&range), PriceRow { low: 1.23, high: 1.51 });
    }

    #[test]
    fn it_should_parse_output_formats() {
        assert_eq!("CSV".parse::<OutputFormat>().unwrap(), OutputFormat::Csv);
        assert_eq!("json".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_matches!("xml".parse::<OutputFormat>(), Err(ReportError::UnknownFormat(_)));
    }
}
