use crate::categories::CategoryStack;
use crate::daily::DaySeries;
use crate::error::Result;
use crate::monthly::MonthlySpending;
use crate::products::ProductRanking;
use crate::recency::PerBucket;
use crate::schema::RecordDate;
use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// The read-only result of one summary run, handed to the rendering layer.
///
/// Percentage triples and per-bucket values are ordered current month,
/// previous month, historical average.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SpendingSummary {
    pub first: RecordDate,
    pub last: RecordDate,
    pub month_count: usize,

    pub spending_per_month: MonthlySpending,
    pub income_per_month: Vec<f64>,
    pub cumulative_saldo: Vec<f64>,
    /// First day of each month covered by the month series.
    pub months: Vec<Option<NaiveDate>>,
    /// Last month's income minus the configured saving, or 0 without income.
    pub budget: f64,

    pub cumulative_spending: PerBucket<DaySeries>,
    pub cumulative_meal_spending: PerBucket<DaySeries>,
    pub cumulative_amenity_spending: PerBucket<DaySeries>,

    pub goods_v_services: [f64; 3],
    pub once_v_regular: [f64; 3],
    pub necessity_v_luxury: [f64; 3],

    pub spending_per_category: Vec<CategoryStack>,

    pub top_products_amount: ProductRanking,
    pub top_products_count: ProductRanking,
}

impl SpendingSummary {
    pub fn recorded_range(&self) -> String {
        format!("Recorded from {} to {}", self.first, self.last)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(SpendingSummary)
    }

    pub fn schema_as_json() -> Result<String> {
        let schema = Self::generate_json_schema();
        Ok(serde_json::to_string_pretty(&schema)?)
    }
}

/// One-line status for the presentation layer: the recorded range, or the
/// error that stopped the run.
pub fn status_line(result: &Result<SpendingSummary>) -> String {
    match result {
        Ok(summary) => summary.recorded_range(),
        Err(e) => format!("ERROR: {}", e),
    }
}
