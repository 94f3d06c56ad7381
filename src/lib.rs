//! # Spending Summary Builder
//!
//! A library for turning dated expense and income records into a normalized,
//! ranked, time-bucketed summary for personal finance review.
//!
//! ## Core Concepts
//!
//! - **Rows**: Loosely typed rows of string fields. Malformed rows are dropped silently.
//! - **Buckets**: Every expense is classified as current month, previous month, or
//!   history. The previous month also counts towards the historical average.
//! - **Day Series**: Cumulative spending over the days of a month, per bucket.
//! - **Month Series**: Spending, income and a running balance per calendar month.
//! - **Breakdowns**: Flag ratios, significant categories, and top products per bucket.
//!
//! ## Example
//!
//! ```rust,ignore
//! use spending_summary_builder::*;
//!
//! let rows = vec![
//!     vec!["1", "1", "2023", "10", "bread", "g", "o", "n", "food"],
//!     vec!["5", "2", "2023", "20", "train", "s", "o", "l", "transport"],
//!     vec!["1", "2", "2023", "-100"],
//! ];
//!
//! let summary = process_rows(&rows, &SummaryConfig::default()).unwrap();
//! assert_eq!(summary.cumulative_saldo, vec![-10.0, 70.0]);
//! ```

pub mod categories;
pub mod daily;
pub mod engine;
pub mod error;
pub mod ingestion;
pub mod metadata;
pub mod monthly;
pub mod products;
pub mod ratios;
pub mod recency;
pub mod schema;
pub mod summary;
pub mod utils;

pub use categories::{CategoryRanker, CategoryStack, StackSegment};
pub use daily::{DailyAccumulator, DailySpending, DaySeries};
pub use engine::{summarize, SummaryEngine};
pub use error::{Result, SpendingSummaryError};
pub use ingestion::*;
pub use metadata::{extract_metadata, DatasetMetadata, IdentifierSet};
pub use monthly::{MonthSeries, MonthSeriesBuilder, MonthlySpending};
pub use products::{ProductRanker, ProductRanking, RankedProduct, TopProducts};
pub use ratios::{build_flag_ratios, FlagRatios};
pub use recency::{Bucket, PerBucket, RecencyClassifier};
pub use schema::*;
pub use summary::{status_line, SpendingSummary};

use log::debug;
use std::io::Read;

pub struct SpendingSummaryProcessor;

impl SpendingSummaryProcessor {
    pub fn process(records: &RecordSet, config: &SummaryConfig) -> Result<SpendingSummary> {
        config.validate()?;
        summarize(records, config)
    }

    pub fn process_rows<S: AsRef<str>>(
        rows: &[Vec<S>],
        config: &SummaryConfig,
    ) -> Result<SpendingSummary> {
        let records = parse_rows(rows);
        debug!("{} of {} rows are valid records", records.len(), rows.len());
        Self::process(&records, config)
    }

    pub fn process_reader<R: Read>(reader: R, config: &SummaryConfig) -> Result<SpendingSummary> {
        let records = parse_reader(reader, config)?;
        Self::process(&records, config)
    }
}

pub fn process_rows<S: AsRef<str>>(
    rows: &[Vec<S>],
    config: &SummaryConfig,
) -> Result<SpendingSummary> {
    SpendingSummaryProcessor::process_rows(rows, config)
}

pub fn process_reader<R: Read>(reader: R, config: &SummaryConfig) -> Result<SpendingSummary> {
    SpendingSummaryProcessor::process_reader(reader, config)
}
