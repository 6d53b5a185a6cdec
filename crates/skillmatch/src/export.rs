//! Rendering ranked results for download and display.

use crate::recommender::RecommendationResult;
use serde::Serialize;
use skillmatch_core::{Error, Result};

#[derive(Serialize)]
struct ExportRow<'a> {
    #[serde(rename = "Rank")]
    rank: usize,
    #[serde(rename = "Title")]
    title: &'a str,
    #[serde(rename = "Offered_by")]
    offered_by: &'a str,
    #[serde(rename = "Domain")]
    domain: &'a str,
    #[serde(rename = "Duration")]
    duration: &'a str,
    #[serde(rename = "Price")]
    price: f64,
    #[serde(rename = "Similarity_Score")]
    similarity_score: f32,
}

/// Write `results` as CSV with a header row. Ranks start at 1.
pub fn write_csv<W: std::io::Write>(results: &[RecommendationResult], writer: W) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    if results.is_empty() {
        csv_writer
            .write_record([
                "Rank",
                "Title",
                "Offered_by",
                "Domain",
                "Duration",
                "Price",
                "Similarity_Score",
            ])
            .map_err(|e| Error::Serialization(e.to_string()))?;
    }
    for (i, result) in results.iter().enumerate() {
        let record = &result.record;
        csv_writer
            .serialize(ExportRow {
                rank: i + 1,
                title: &record.title,
                offered_by: &record.provider,
                domain: &record.domain,
                duration: &record.duration,
                price: record.price,
                similarity_score: result.score,
            })
            .map_err(|e| Error::Serialization(e.to_string()))?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Render `results` as a CSV string.
pub fn to_csv_string(results: &[RecommendationResult]) -> Result<String> {
    let mut buf = Vec::new();
    write_csv(results, &mut buf)?;
    String::from_utf8(buf).map_err(|e| Error::Serialization(e.to_string()))
}

/// Headline figures for a result list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultSummary {
    /// Number of results.
    pub count: usize,

    /// Mean price of the recommended courses.
    pub average_price: f64,

    /// Highest similarity score.
    pub best_score: f32,
}

/// Summarize `results`, or `None` when there are none.
pub fn summarize(results: &[RecommendationResult]) -> Option<ResultSummary> {
    if results.is_empty() {
        return None;
    }
    let total: f64 = results.iter().map(|r| r.record.price).sum();
    let best_score = results
        .iter()
        .map(|r| r.score)
        .fold(f32::NEG_INFINITY, f32::max);
    Some(ResultSummary {
        count: results.len(),
        average_price: total / results.len() as f64,
        best_score,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use skillmatch_catalog::CatalogRecord;

    fn results() -> Vec<RecommendationResult> {
        vec![
            RecommendationResult {
                record: CatalogRecord::new("Intro to Python", "NASSCOM", "IT", "40 Hours", 1000.0),
                score: 0.75,
            },
            RecommendationResult {
                record: CatalogRecord::new("Data, Science", "IIT", "Analytics", "6 Weeks", 3000.0),
                score: 0.5,
            },
        ]
    }

    #[test]
    fn test_csv_columns_and_ranks() {
        let csv = to_csv_string(&results()).unwrap();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next(),
            Some("Rank,Title,Offered_by,Domain,Duration,Price,Similarity_Score")
        );
        let first = lines.next().unwrap();
        assert!(first.starts_with("1,Intro to Python,NASSCOM,IT,40 Hours,"));
        let second = lines.next().unwrap();
        assert!(second.starts_with("2,\"Data, Science\","));
        assert!(lines.next().is_none());
    }

    #[test]
    fn test_csv_empty_has_header() {
        let csv = to_csv_string(&[]).unwrap();
        assert_eq!(
            csv,
            "Rank,Title,Offered_by,Domain,Duration,Price,Similarity_Score\n"
        );
    }

    #[test]
    fn test_summarize() {
        let summary = summarize(&results()).unwrap();
        assert_eq!(summary.count, 2);
        assert_eq!(summary.average_price, 2000.0);
        assert_eq!(summary.best_score, 0.75);
        assert!(summarize(&[]).is_none());
    }
}
