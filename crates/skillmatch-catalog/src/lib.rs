//! Course catalog domain for SkillMatch.
//!
//! - [`CatalogRecord`]: one course, with the dataset's column names
//! - [`parse_price`]: raw dataset prices (`"1,000/-"`, `"₹2,500"`) to numbers
//! - [`FeatureComposer`]: the text embedded for each record
//! - [`CatalogSource`]: reads the CSV dataset and reports price problems

pub mod composer;
pub mod loader;
pub mod record;

pub use composer::FeatureComposer;
pub use loader::{CatalogSource, LoadReport, LoadedCatalog, read_catalog};
pub use record::{CatalogRecord, PriceStatus, format_price, parse_price};
