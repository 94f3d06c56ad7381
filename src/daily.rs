use crate::recency::{Bucket, PerBucket, RecencyClassifier};
use crate::schema::Transaction;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Slot 0 is unused by calendar days; slots 1..=31 are days of the month.
pub const DAY_SLOTS: usize = 32;

/// A running total of spending over the days of a month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct DaySeries(pub Vec<f64>);

impl Default for DaySeries {
    fn default() -> Self {
        Self(vec![0.0; DAY_SLOTS])
    }
}

impl DaySeries {
    pub fn values(&self) -> &[f64] {
        &self.0
    }

    pub fn get(&self, day: usize) -> Option<f64> {
        self.0.get(day).copied()
    }

    /// Cumulative value at day 31, i.e. the whole month.
    pub fn month_total(&self) -> f64 {
        self.0.last().copied().unwrap_or(0.0)
    }

    fn add(&mut self, day: i32, amount: f64) {
        if let Some(slot) = usize::try_from(day).ok().and_then(|d| self.0.get_mut(d)) {
            *slot += amount;
        }
    }

    fn accumulate(&mut self) {
        for i in 1..self.0.len() {
            self.0[i] += self.0[i - 1];
        }
    }

    /// Divides each day by `divisor` before adding the previous running total.
    /// The order matters: per-day values are normalized first.
    fn accumulate_average(&mut self, divisor: Option<f64>) {
        let Some(divisor) = divisor else {
            self.0.iter_mut().for_each(|v| *v = 0.0);
            return;
        };

        for i in 0..self.0.len() {
            let previous = if i > 0 { self.0[i - 1] } else { 0.0 };
            self.0[i] = self.0[i] / divisor + previous;
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DailySpending {
    pub total: PerBucket<DaySeries>,
    pub meal: PerBucket<DaySeries>,
    pub amenity: PerBucket<DaySeries>,
}

pub struct DailyAccumulator<'a> {
    classifier: &'a RecencyClassifier,
    meal_category: &'a str,
}

impl<'a> DailyAccumulator<'a> {
    pub fn new(classifier: &'a RecencyClassifier, meal_category: &'a str) -> Self {
        Self {
            classifier,
            meal_category,
        }
    }

    pub fn build(&self, transactions: &[Transaction]) -> DailySpending {
        let mut spending = DailySpending::default();

        for t in transactions {
            let is_meal_category = t.category == self.meal_category;
            let day = t.date.day;

            for &bucket in self.classifier.contributions(t.date.month_ordinal()) {
                spending.total[bucket].add(day, t.amount);
                if t.flags.is_necessity && is_meal_category {
                    spending.meal[bucket].add(day, t.amount);
                }
                if !t.flags.is_necessity && !is_meal_category {
                    spending.amenity[bucket].add(day, t.amount);
                }
            }
        }

        let divisor = self.classifier.average_divisor();
        for series in [
            &mut spending.total,
            &mut spending.meal,
            &mut spending.amenity,
        ] {
            series[Bucket::Current].accumulate();
            series[Bucket::Previous].accumulate();
            series[Bucket::Average].accumulate_average(divisor);
        }

        spending
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::extract_metadata;
    use crate::schema::{PurchaseFlags, RecordDate, RecordSet};

    fn expense(day: i32, month: i32, amount: f64, category: &str, necessity: bool) -> Transaction {
        Transaction {
            date: RecordDate::new(day, month, 2023),
            amount,
            product: "item".to_string(),
            category: category.to_string(),
            flags: PurchaseFlags {
                is_goods: true,
                is_one_off: true,
                is_necessity: necessity,
            },
        }
    }

    fn build(transactions: Vec<Transaction>) -> DailySpending {
        let records = RecordSet {
            transactions,
            income: vec![],
        };
        let meta = extract_metadata(&records, 0).unwrap();
        let classifier = RecencyClassifier::new(&meta);
        DailyAccumulator::new(&classifier, "food").build(&records.transactions)
    }

    #[test]
    fn test_current_month_is_cumulative() {
        let spending = build(vec![
            expense(2, 3, 10.0, "food", true),
            expense(5, 3, 5.0, "fun", false),
            expense(5, 3, 1.0, "food", false),
        ]);

        let current = &spending.total[Bucket::Current];
        assert_eq!(current.get(1), Some(0.0));
        assert_eq!(current.get(2), Some(10.0));
        assert_eq!(current.get(4), Some(10.0));
        assert_eq!(current.get(5), Some(16.0));
        assert_eq!(current.month_total(), 16.0);

        assert_eq!(spending.meal[Bucket::Current].month_total(), 10.0);
        assert_eq!(spending.amenity[Bucket::Current].month_total(), 5.0);
    }

    #[test]
    fn test_previous_month_counts_towards_average() {
        // months 1..=3, current = 3, previous = 2, month_count = 3 => divisor 2
        let spending = build(vec![
            expense(1, 1, 4.0, "food", true),
            expense(1, 2, 6.0, "food", true),
            expense(1, 3, 100.0, "food", true),
        ]);

        assert_eq!(spending.total[Bucket::Previous].month_total(), 6.0);
        assert!((spending.total[Bucket::Average].get(1).unwrap() - 5.0).abs() < 1e-12);
        assert!((spending.total[Bucket::Average].month_total() - 5.0).abs() < 1e-12);
        assert_eq!(spending.total[Bucket::Current].month_total(), 100.0);
    }

    #[test]
    fn test_average_normalizes_before_accumulating() {
        // month_count = 4 => divisor 3
        let spending = build(vec![
            expense(1, 1, 3.0, "x", true),
            expense(10, 2, 6.0, "x", true),
            expense(10, 4, 1.0, "x", true),
        ]);

        let avg = &spending.total[Bucket::Average];
        assert!((avg.get(1).unwrap() - 1.0).abs() < 1e-12);
        assert!((avg.get(9).unwrap() - 1.0).abs() < 1e-12);
        assert!((avg.get(10).unwrap() - 3.0).abs() < 1e-12);
        assert!((avg.month_total() - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_single_month_average_is_zero() {
        let spending = build(vec![expense(3, 5, 12.0, "food", true)]);
        assert!(spending.total[Bucket::Average]
            .values()
            .iter()
            .all(|&v| v == 0.0));
    }

    #[test]
    fn test_series_are_monotonic() {
        let spending = build(vec![
            expense(31, 1, 2.5, "a", true),
            expense(7, 2, 1.0, "b", false),
            expense(15, 2, 8.0, "food", true),
            expense(1, 3, 3.0, "food", false),
            expense(30, 3, 4.0, "c", false),
        ]);

        for bucket in Bucket::ALL {
            for series in [&spending.total, &spending.meal, &spending.amenity] {
                let values = series[bucket].values();
                assert_eq!(values.len(), DAY_SLOTS);
                for i in 1..values.len() {
                    assert!(values[i] >= values[i - 1]);
                }
            }
        }
    }

    #[test]
    fn test_out_of_range_days_are_ignored() {
        let spending = build(vec![
            expense(32, 1, 50.0, "a", true),
            expense(-1, 1, 50.0, "a", true),
            expense(1, 1, 1.0, "a", true),
        ]);
        assert_eq!(spending.total[Bucket::Current].month_total(), 1.0);
    }
}
