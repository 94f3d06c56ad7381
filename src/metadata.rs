use crate::error::{Result, SpendingSummaryError};
use crate::schema::{BoundaryRecord, Dated, RecordSet};
use log::warn;
use serde::Serialize;
use std::collections::HashMap;

/// Distinct identifiers in first-seen order, with a position lookup.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IdentifierSet {
    names: Vec<String>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl IdentifierSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `name` if unseen and returns its position either way.
    pub fn insert(&mut self, name: &str) -> usize {
        if let Some(&position) = self.index.get(name) {
            return position;
        }
        let position = self.names.len();
        self.names.push(name.to_string());
        self.index.insert(name.to_string(), position);
        position
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DatasetMetadata {
    pub first: BoundaryRecord,
    pub last: BoundaryRecord,
    pub categories: IdentifierSet,
    pub products: IdentifierSet,
    pub month_offset: i64,
    /// Number of months from the first record up to the current month.
    pub month_count: usize,
}

impl DatasetMetadata {
    /// Month ordinal of the first record; index 0 of every month series.
    pub fn first_month(&self) -> i64 {
        self.first.date().month_ordinal()
    }

    /// The month treated as current: the last recorded month shifted back by the offset.
    pub fn current_month(&self) -> i64 {
        self.last.date().month_ordinal() - self.month_offset
    }

    /// Position of `month_ordinal` within the month series, if it is in range.
    pub fn month_index(&self, month_ordinal: i64) -> Option<usize> {
        usize::try_from(month_ordinal - self.first_month())
            .ok()
            .filter(|&index| index < self.month_count)
    }

    pub fn recorded_range(&self) -> String {
        format!("Recorded from {} to {}", self.first.date(), self.last.date())
    }
}

/// Scans the records once for bounds and identifiers and checks the month span.
pub fn extract_metadata(records: &RecordSet, month_offset: i64) -> Result<DatasetMetadata> {
    let mut first: Option<BoundaryRecord> = None;
    let mut last: Option<BoundaryRecord> = None;
    let mut categories = IdentifierSet::new();
    let mut products = IdentifierSet::new();

    let mut consider = |candidate: BoundaryRecord| {
        let ordinal = candidate.date().date_ordinal();
        if first
            .as_ref()
            .map_or(true, |f| ordinal < f.date().date_ordinal())
        {
            first = Some(candidate.clone());
        }
        if last
            .as_ref()
            .map_or(true, |l| ordinal > l.date().date_ordinal())
        {
            last = Some(candidate);
        }
    };

    for transaction in &records.transactions {
        consider(BoundaryRecord::Expense(transaction.clone()));
        categories.insert(&transaction.category);
        products.insert(&transaction.product);
    }
    for entry in &records.income {
        consider(BoundaryRecord::Income(entry.clone()));
    }

    let (first, last) = match (first, last) {
        (Some(first), Some(last)) => (first, last),
        _ => return Err(SpendingSummaryError::NoRecords),
    };

    if month_offset < 0 {
        return Err(SpendingSummaryError::NegativeMonthOffset(month_offset));
    }

    let span = last.date().month_ordinal() - first.date().month_ordinal() + 1;
    let month_count = span - month_offset;
    if month_count <= 0 {
        warn!(
            "Month offset {} leaves no months out of {} recorded",
            month_offset, span
        );
        return Err(SpendingSummaryError::MonthOffsetTooLarge { month_offset, span });
    }

    Ok(DatasetMetadata {
        first,
        last,
        categories,
        products,
        month_offset,
        month_count: month_count as usize,
    })
}
