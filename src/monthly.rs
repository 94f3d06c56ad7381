use crate::metadata::DatasetMetadata;
use crate::schema::{IncomeEntry, Transaction};
use crate::utils::month_start;
use chrono::NaiveDate;
use log::debug;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct MonthlySpending {
    pub total: Vec<f64>,
    pub meal: Vec<f64>,
}

/// Per-month series over the whole dataset span, indexed from the first record's month.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct MonthSeries {
    pub spending_per_month: MonthlySpending,
    pub income_per_month: Vec<f64>,
    pub cumulative_saldo: Vec<f64>,
    /// First calendar day of each month, for the time axis.
    pub months: Vec<Option<NaiveDate>>,
}

impl MonthSeries {
    pub fn len(&self) -> usize {
        self.cumulative_saldo.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cumulative_saldo.is_empty()
    }

    /// Income of the month before the current one, or 0 if there is none.
    pub fn last_month_income(&self) -> f64 {
        let n = self.income_per_month.len();
        if n > 1 {
            self.income_per_month[n - 2]
        } else {
            0.0
        }
    }

    /// Spending budget for the current month: last month's income minus the saving.
    pub fn budget(&self, saving: f64) -> f64 {
        let income = self.last_month_income();
        if income != 0.0 {
            income - saving
        } else {
            0.0
        }
    }
}

pub struct MonthSeriesBuilder<'a> {
    meta: &'a DatasetMetadata,
    meal_category: &'a str,
}

impl<'a> MonthSeriesBuilder<'a> {
    pub fn new(meta: &'a DatasetMetadata, meal_category: &'a str) -> Self {
        Self {
            meta,
            meal_category,
        }
    }

    pub fn build(&self, transactions: &[Transaction], income: &[IncomeEntry]) -> MonthSeries {
        let n = self.meta.month_count;
        let mut total = vec![0.0; n];
        let mut meal = vec![0.0; n];
        let mut income_per_month = vec![0.0; n];
        let mut skipped = 0usize;

        for t in transactions {
            let Some(i) = self.meta.month_index(t.date.month_ordinal()) else {
                skipped += 1;
                continue;
            };
            total[i] += t.amount;
            if t.flags.is_necessity && t.category == self.meal_category {
                meal[i] += t.amount;
            }
        }

        for entry in income {
            let Some(i) = self.meta.month_index(entry.date.month_ordinal()) else {
                skipped += 1;
                continue;
            };
            income_per_month[i] -= entry.amount;
        }

        if skipped > 0 {
            debug!(
                "{} records fall after the current month and are left out of the month series",
                skipped
            );
        }

        let mut cumulative_saldo = Vec::with_capacity(n);
        let mut running = 0.0;
        for i in 0..n {
            running += income_per_month[i] - total[i];
            cumulative_saldo.push(running);
        }

        let first_month = self.meta.first_month();
        let months = (0..n as i64).map(|i| month_start(first_month + i)).collect();

        MonthSeries {
            spending_per_month: MonthlySpending { total, meal },
            income_per_month,
            cumulative_saldo,
            months,
        }
    }
}
