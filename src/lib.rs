//! # enrollment-analytics
//!
//! Descriptive statistics over a single in-memory table of university
//! enrollment records (one row per enrolled student). It supports:
//!
//! - Memory-mapped CSV loading with missing-value-aware columns
//! - Text canonicalization (case folding, diacritic stripping) and
//!   keyword-based categorization of free-form fields
//! - Declarative, composable row filters (year ranges, value sets,
//!   non-null requirements, minimum group sizes, keyword membership)
//! - Group-by counts, percentages of a reference total, and means over
//!   one or more key columns
//! - Pairwise Pearson correlation and full correlation matrices that
//!   tolerate absent fields
//!
//! # Example
//!
//! ```rust,no_run
//! use enrollment_analytics::analysis::{dataset::Dataset, suite};
//!
//! fn main() -> enrollment_analytics::analysis::Result<()> {
//!     let mut ds = Dataset::new();
//!     ds.load_csv("enrollment.csv".as_ref())?;
//!     suite::prepare(&mut ds)?;
//!
//!     let by_year = suite::enrollment_by_year(&ds)?;
//!     for (year, count) in &by_year {
//!         println!("{year}: {count}");
//!     }
//!
//!     let (_matrix, strong) = suite::numeric_profile(&ds);
//!     for (a, b, r) in strong {
//!         println!("{a} vs {b}: {r:.2}");
//!     }
//!     Ok(())
//! }
//! ```

mod helpers;
pub mod analysis;

pub use analysis::{
    builder::Analysis, correlation::CorrelationMatrix, dataset::Dataset, engine::SummaryTable,
    filter::RowFilter, normalize::KeywordMatcher, AnalyticsError, GroupKey, Key, Result,
    StatValue,
};
pub use helpers::stat_helpers::pearson;
