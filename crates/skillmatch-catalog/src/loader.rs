//! Loading the course dataset from CSV.
//!
//! The dataset is read with headers. `Title`, `Offered_by`, `Domain`,
//! `Duration` and `Price` are picked out by name; any other column is
//! ignored and a missing one defaults to empty. Prices go through
//! [`parse_price`], and the rows whose price could not be read are counted
//! in the [`LoadReport`].

use crate::record::{CatalogRecord, PriceStatus, parse_price};
use serde::Deserialize;
use skillmatch_core::{Error, Result};
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
struct RawRow {
    #[serde(rename = "Title", alias = "title", default)]
    title: Option<String>,
    #[serde(rename = "Offered_by", alias = "offered_by", default)]
    offered_by: Option<String>,
    #[serde(rename = "Domain", alias = "domain", default)]
    domain: Option<String>,
    #[serde(rename = "Duration", alias = "duration", default)]
    duration: Option<String>,
    #[serde(rename = "Price", alias = "price", default)]
    price: Option<String>,
}

/// Summary of one dataset load.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Rows read from the dataset.
    pub rows_read: usize,

    /// Rows with an absent or blank price.
    pub missing_prices: usize,

    /// Rows whose price text could not be read.
    pub unparseable_prices: usize,
}

/// Records read from a dataset, with the load summary.
#[derive(Debug, Clone, Default)]
pub struct LoadedCatalog {
    /// Records in dataset order.
    pub records: Vec<CatalogRecord>,

    /// Load summary.
    pub report: LoadReport,
}

/// A CSV course dataset on disk.
#[derive(Debug, Clone)]
pub struct CatalogSource {
    path: PathBuf,
}

impl CatalogSource {
    /// A dataset at `path`. Nothing is read until [`load`](Self::load).
    pub fn from_csv_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Dataset path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every record.
    pub fn load(&self) -> Result<LoadedCatalog> {
        let file = std::fs::File::open(&self.path).map_err(|e| Error::io_with_path(e, &self.path))?;
        let loaded = read_catalog(file, &self.path.display().to_string())?;
        log::info!(
            "Loaded {} courses from {}",
            loaded.report.rows_read,
            self.path.display()
        );
        Ok(loaded)
    }
}

/// Read records from any CSV reader; `origin` names it in messages.
pub fn read_catalog<R: std::io::Read>(reader: R, origin: &str) -> Result<LoadedCatalog> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut loaded = LoadedCatalog::default();
    for (row, result) in csv_reader.deserialize::<RawRow>().enumerate() {
        let raw = result.map_err(|e| Error::parse(format!("{origin}: row {}: {e}", row + 1)))?;

        let (price, status) = parse_price(raw.price.as_deref());
        match status {
            PriceStatus::Parsed => {}
            PriceStatus::Missing => loaded.report.missing_prices += 1,
            PriceStatus::Unparseable(text) => {
                log::warn!("{origin}: row {}: unreadable price {text:?}, using 0", row + 1);
                loaded.report.unparseable_prices += 1;
            }
        }

        loaded.records.push(CatalogRecord {
            title: raw.title.unwrap_or_default(),
            provider: raw.offered_by.unwrap_or_default(),
            domain: raw.domain.unwrap_or_default(),
            duration: raw.duration.unwrap_or_default(),
            price,
        });
    }

    loaded.report.rows_read = loaded.records.len();
    if loaded.report.missing_prices > 0 {
        log::debug!(
            "{origin}: {} rows have no price",
            loaded.report.missing_prices
        );
    }
    Ok(loaded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn read(csv: &str) -> LoadedCatalog {
        read_catalog(csv.as_bytes(), "test.csv").unwrap()
    }

    #[test]
    fn test_read_dataset_columns() {
        let loaded = read(
            "Title,Offered_by,Domain,Duration,Price,Description\n\
             Intro to Python,NASSCOM,IT,40 Hours,\"1,000/-\",Basics\n\
             Advanced Leadership,IIM,Management,3 Months,5000,Strategy\n",
        );

        assert_eq!(loaded.records.len(), 2);
        assert_eq!(
            loaded.records[0],
            CatalogRecord::new("Intro to Python", "NASSCOM", "IT", "40 Hours", 1000.0)
        );
        assert_eq!(loaded.records[1].price, 5000.0);
        assert_eq!(loaded.report.rows_read, 2);
        assert_eq!(loaded.report.unparseable_prices, 0);
    }

    #[test]
    fn test_missing_columns_default() {
        let loaded = read("Title,Price\nData Science 101,\n");
        let record = &loaded.records[0];
        assert_eq!(record.title, "Data Science 101");
        assert_eq!(record.provider, "");
        assert_eq!(record.duration, "");
        assert_eq!(record.price, 0.0);
        assert_eq!(loaded.report.missing_prices, 1);
    }

    #[test]
    fn test_unparseable_prices_counted() {
        let loaded = read("Title,Price\nA,Contact us\nB,1000-2000\nC,Free\n");
        assert_eq!(loaded.report.unparseable_prices, 2);
        assert_eq!(loaded.report.missing_prices, 0);
        assert!(loaded.records.iter().all(|r| r.price == 0.0));
    }

    #[test]
    fn test_short_rows_and_whitespace() {
        let loaded = read("Title,Offered_by,Domain\n  Cloud Basics  ,AWS\n");
        assert_eq!(loaded.records[0].title, "Cloud Basics");
        assert_eq!(loaded.records[0].provider, "AWS");
        assert_eq!(loaded.records[0].domain, "");
    }

    #[test]
    fn test_headers_only() {
        let loaded = read("Title,Offered_by,Domain,Duration,Price\n");
        assert!(loaded.records.is_empty());
        assert_eq!(loaded.report, LoadReport::default());
    }

    #[test]
    fn test_source_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "Title,Price").unwrap();
        writeln!(file, "Intro to Python,\"1,000/-\"").unwrap();

        let source = CatalogSource::from_csv_path(file.path());
        let loaded = source.load().unwrap();
        assert_eq!(loaded.records[0].price, 1000.0);
        assert_eq!(source.path(), file.path());
    }

    #[test]
    fn test_source_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let source = CatalogSource::from_csv_path(dir.path().join("absent.csv"));
        let err = source.load().unwrap_err();
        assert!(err.to_string().contains("absent.csv"));
    }
}
