use crate::metadata::IdentifierSet;
use crate::ratios::percentage_bases;
use crate::recency::{Bucket, PerBucket, RecencyClassifier};
use crate::schema::Transaction;
use crate::utils::{percentage, sort_descending};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Shares below this percentage end the list of significant categories.
pub const SIGNIFICANCE_THRESHOLD: f64 = 1.0;

/// One segment of a stacked bar: the category's own share and the running
/// total up to and including it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct StackSegment {
    pub own: f64,
    pub cumulative: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CategoryStack {
    pub category: String,
    pub segments: PerBucket<StackSegment>,
}

/// Sorts shares descending (stable) and keeps the leading run at or above the
/// threshold. The first share below it drops everything after it.
pub fn significant_shares<T>(mut shares: Vec<(f64, T)>) -> Vec<(f64, T)> {
    sort_descending(&mut shares);
    let keep = shares
        .iter()
        .take_while(|(share, _)| *share >= SIGNIFICANCE_THRESHOLD)
        .count();
    shares.truncate(keep);
    shares
}

pub struct CategoryRanker<'a> {
    categories: &'a IdentifierSet,
    classifier: &'a RecencyClassifier,
}

impl<'a> CategoryRanker<'a> {
    pub fn new(categories: &'a IdentifierSet, classifier: &'a RecencyClassifier) -> Self {
        Self {
            categories,
            classifier,
        }
    }

    /// Percentage share of every category per bucket, in discovery order.
    /// A bucket without a percentage basis reports raw amounts.
    pub fn shares(&self, transactions: &[Transaction]) -> PerBucket<Vec<f64>> {
        let n = self.categories.len();
        let mut amounts: PerBucket<Vec<f64>> = PerBucket::from_fn(|_| vec![0.0; n]);

        for t in transactions {
            let Some(position) = self.categories.position(&t.category) else {
                continue;
            };
            for &bucket in self.classifier.contributions(t.date.month_ordinal()) {
                amounts[bucket][position] += t.amount;
            }
        }

        let bases = percentage_bases(transactions, self.classifier);
        amounts.map(|bucket, values| {
            values
                .into_iter()
                .map(|amount| bases[bucket].map_or(amount, |total| percentage(amount, total)))
                .collect()
        })
    }

    pub fn build(&self, transactions: &[Transaction]) -> Vec<CategoryStack> {
        let shares = self.shares(transactions);

        let mut merged: Vec<(usize, PerBucket<f64>)> = Vec::new();
        let mut slots: HashMap<usize, usize> = HashMap::new();

        for bucket in Bucket::ALL {
            let ranked = significant_shares(
                shares[bucket]
                    .iter()
                    .copied()
                    .enumerate()
                    .map(|(position, share)| (share, position))
                    .collect(),
            );

            for (share, position) in ranked {
                let slot = *slots.entry(position).or_insert_with(|| {
                    merged.push((position, PerBucket::default()));
                    merged.len() - 1
                });
                merged[slot].1[bucket] = share;
            }
        }

        let mut running: PerBucket<f64> = PerBucket::default();
        merged
            .into_iter()
            .map(|(position, values)| {
                let segments = values.map(|bucket, own| {
                    running[bucket] += own;
                    StackSegment {
                        own,
                        cumulative: running[bucket],
                    }
                });
                CategoryStack {
                    category: self.categories.names()[position].clone(),
                    segments,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::extract_metadata;
    use crate::schema::{PurchaseFlags, RecordDate, RecordSet};

    fn expense(month: i32, amount: f64, category: &str) -> Transaction {
        Transaction {
            date: RecordDate::new(1, month, 2023),
            amount,
            product: "item".to_string(),
            category: category.to_string(),
            flags: PurchaseFlags {
                is_goods: true,
                is_one_off: true,
                is_necessity: true,
            },
        }
    }

    fn stacks(transactions: Vec<Transaction>) -> Vec<CategoryStack> {
        stacks_with_offset(transactions, 0)
    }

    fn stacks_with_offset(transactions: Vec<Transaction>, month_offset: i64) -> Vec<CategoryStack> {
        let records = RecordSet {
            transactions,
            income: vec![],
        };
        let meta = extract_metadata(&records, month_offset).unwrap();
        let classifier = RecencyClassifier::new(&meta);
        CategoryRanker::new(&meta.categories, &classifier).build(&records.transactions)
    }

    #[test]
    fn test_prefix_rule_on_sorted_shares() {
        let kept = significant_shares(vec![
            (45.0, "a"),
            (30.0, "b"),
            (15.0, "c"),
            (8.0, "d"),
            (2.0, "e"),
        ]);
        let values: Vec<f64> = kept.iter().map(|k| k.0).collect();
        assert_eq!(values, vec![45.0, 30.0, 15.0, 8.0, 2.0]);

        let kept = significant_shares(vec![(60.0, "a"), (39.5, "b"), (0.5, "c")]);
        assert_eq!(kept.len(), 2);
    }

    #[test]
    fn test_unsorted_input_is_sorted_before_truncating() {
        // a value above the threshold after a smaller one still survives,
        // because sorting happens first
        let kept = significant_shares(vec![(0.5, "tiny"), (70.0, "big"), (0.2, "dust"), (29.3, "mid")]);
        let names: Vec<&str> = kept.iter().map(|k| k.1).collect();
        assert_eq!(names, vec!["big", "mid"]);
    }

    #[test]
    fn test_ties_keep_discovery_order() {
        let kept = significant_shares(vec![(25.0, "x"), (50.0, "y"), (25.0, "z")]);
        let names: Vec<&str> = kept.iter().map(|k| k.1).collect();
        assert_eq!(names, vec!["y", "x", "z"]);
    }

    #[test]
    fn test_merge_order_and_stacking() {
        // month 1: average only, month 2: previous (+ average), month 3: current
        let result = stacks(vec![
            expense(1, 100.0, "rent"),
            expense(2, 50.0, "food"),
            expense(2, 50.0, "travel"),
            expense(3, 80.0, "food"),
            expense(3, 20.0, "fun"),
        ]);

        let names: Vec<&str> = result.iter().map(|s| s.category.as_str()).collect();
        // current list first, then unseen previous entries, then unseen average entries
        assert_eq!(names, vec!["food", "fun", "travel", "rent"]);

        let food = &result[0].segments;
        assert!((food.current.own - 80.0).abs() < 1e-9);
        assert!((food.last.own - 50.0).abs() < 1e-9);
        assert!((food.avg.own - 25.0).abs() < 1e-9);

        let fun = &result[1].segments;
        assert!((fun.current.own - 20.0).abs() < 1e-9);
        assert!((fun.current.cumulative - 100.0).abs() < 1e-9);
        assert_eq!(fun.last.own, 0.0);
        assert!((fun.last.cumulative - 50.0).abs() < 1e-9);

        let rent = &result[3].segments;
        assert_eq!(rent.current.own, 0.0);
        assert!((rent.avg.own - 50.0).abs() < 1e-9);
        assert!((rent.avg.cumulative - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_insignificant_categories_are_dropped() {
        let result = stacks(vec![
            expense(1, 995.0, "big"),
            expense(1, 5.0, "small"),
        ]);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].category, "big");
    }

    #[test]
    fn test_shares_stay_in_bounds() {
        let records = RecordSet {
            transactions: vec![
                expense(1, 3.0, "a"),
                expense(2, 7.5, "b"),
                expense(2, 0.0, "c"),
                expense(3, 12.0, "a"),
            ],
            income: vec![],
        };
        let meta = extract_metadata(&records, 0).unwrap();
        let classifier = RecencyClassifier::new(&meta);
        let shares = CategoryRanker::new(&meta.categories, &classifier).shares(&records.transactions);
        for (_, values) in shares.iter() {
            for &v in values {
                assert!((0.0..=100.0).contains(&v));
            }
        }
        // category c has no share anywhere
        assert_eq!(shares.current[2], 0.0);
    }

    #[test]
    fn test_average_without_history_uses_raw_amounts() {
        // offset 1 leaves January as the only month, February lands in the average bucket
        let result = stacks_with_offset(vec![expense(1, 10.0, "a"), expense(2, 50.0, "x")], 1);

        let names: Vec<&str> = result.iter().map(|s| s.category.as_str()).collect();
        assert_eq!(names, vec!["a", "x"]);

        let a = &result[0].segments;
        assert!((a.current.own - 100.0).abs() < 1e-9);
        assert_eq!(a.avg.own, 0.0);

        let x = &result[1].segments;
        assert_eq!(x.current.own, 0.0);
        assert_eq!(x.last.own, 0.0);
        assert_eq!(x.avg.own, 50.0);
        assert_eq!(x.avg.cumulative, 50.0);
    }
}
