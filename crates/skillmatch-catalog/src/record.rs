//! Catalog records and price parsing.

use serde::{Deserialize, Serialize};

/// One course in the catalog.
///
/// Serialized with the dataset's column names, which is also the layout of
/// the persisted metadata table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogRecord {
    /// Course title.
    #[serde(rename = "Title", default)]
    pub title: String,

    /// Organisation offering the course.
    #[serde(rename = "Offered_by", default)]
    pub provider: String,

    /// Subject domain.
    #[serde(rename = "Domain", default)]
    pub domain: String,

    /// Free-text duration, e.g. "40 Hours".
    #[serde(rename = "Duration", default)]
    pub duration: String,

    /// Price in rupees, never negative. `0` for free courses and for
    /// prices that were missing or could not be read.
    #[serde(rename = "Price", default)]
    pub price: f64,
}

impl CatalogRecord {
    /// Create a record.
    pub fn new(
        title: impl Into<String>,
        provider: impl Into<String>,
        domain: impl Into<String>,
        duration: impl Into<String>,
        price: f64,
    ) -> Self {
        Self {
            title: title.into(),
            provider: provider.into(),
            domain: domain.into(),
            duration: duration.into(),
            price,
        }
    }
}

/// How a record's price was derived from the raw dataset text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PriceStatus {
    /// The text held a price (or "free").
    Parsed,
    /// The column was absent or blank.
    Missing,
    /// The text could not be read as a single non-negative amount.
    Unparseable(String),
}

impl PriceStatus {
    /// Whether the price was read from the text.
    pub fn is_parsed(&self) -> bool {
        matches!(self, Self::Parsed)
    }
}

const CURRENCY_MARKERS: &[&str] = &["₹", "Rs.", "Rs", "INR"];

/// Parse a raw dataset price such as `"₹1,000/-"` or `"1499.50"`.
///
/// Returns `0` with a non-[`Parsed`](PriceStatus::Parsed) status when the
/// price is missing or unreadable, so free and unknown prices stay
/// distinguishable.
pub fn parse_price(raw: Option<&str>) -> (f64, PriceStatus) {
    let Some(raw) = raw else {
        return (0.0, PriceStatus::Missing);
    };

    let mut text = raw.trim();
    if text.is_empty() {
        return (0.0, PriceStatus::Missing);
    }

    if let Some(stripped) = text.strip_suffix("/-") {
        text = stripped.trim_end();
    }
    for marker in CURRENCY_MARKERS {
        if let Some(stripped) = strip_prefix_ignore_ascii_case(text, marker) {
            text = stripped.trim_start();
            break;
        }
    }

    let cleaned: String = text
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();

    if cleaned.eq_ignore_ascii_case("free") {
        return (0.0, PriceStatus::Parsed);
    }

    let well_formed = !cleaned.is_empty()
        && cleaned.chars().all(|c| c.is_ascii_digit() || c == '.')
        && cleaned.chars().filter(|&c| c == '.').count() <= 1
        && cleaned.chars().any(|c| c.is_ascii_digit());

    match cleaned.parse::<f64>() {
        Ok(value) if well_formed && value.is_finite() => (value, PriceStatus::Parsed),
        _ => (0.0, PriceStatus::Unparseable(raw.to_string())),
    }
}

fn strip_prefix_ignore_ascii_case<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let head = text.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) {
        text.get(prefix.len()..)
    } else {
        None
    }
}

/// Render a price the way it appears in feature text: `1000`, `1499.5`.
pub fn format_price(price: f64) -> String {
    // Display drops the fractional part of whole floats.
    format!("{price}")
}
