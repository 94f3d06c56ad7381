use crate::metadata::IdentifierSet;
use crate::recency::{Bucket, PerBucket, RecencyClassifier};
use crate::schema::Transaction;
use crate::utils::sort_descending;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub const TOP_PRODUCTS: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RankedProduct {
    pub value: f64,
    pub product: String,
}

pub type ProductRanking = PerBucket<Vec<RankedProduct>>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TopProducts {
    pub by_amount: ProductRanking,
    pub by_count: ProductRanking,
}

pub struct ProductRanker<'a> {
    products: &'a IdentifierSet,
    classifier: &'a RecencyClassifier,
}

impl<'a> ProductRanker<'a> {
    pub fn new(products: &'a IdentifierSet, classifier: &'a RecencyClassifier) -> Self {
        Self {
            products,
            classifier,
        }
    }

    pub fn build(&self, transactions: &[Transaction]) -> TopProducts {
        let n = self.products.len();
        let mut amounts: PerBucket<Vec<f64>> = PerBucket::from_fn(|_| vec![0.0; n]);
        let mut counts: PerBucket<Vec<f64>> = PerBucket::from_fn(|_| vec![0.0; n]);

        for t in transactions {
            let Some(position) = self.products.position(&t.product) else {
                continue;
            };
            for &bucket in self.classifier.contributions(t.date.month_ordinal()) {
                amounts[bucket][position] += t.amount;
                counts[bucket][position] += 1.0;
            }
        }

        TopProducts {
            by_amount: amounts.map(|bucket, values| self.rank(bucket, values, |amount| amount)),
            by_count: counts.map(|bucket, values| self.rank(bucket, values, |_| 0.0)),
        }
    }

    /// Top entries by value, ties in discovery order. Historical values are
    /// per-month averages; without an earlier month `fallback` decides them.
    fn rank(
        &self,
        bucket: Bucket,
        values: Vec<f64>,
        fallback: impl Fn(f64) -> f64,
    ) -> Vec<RankedProduct> {
        let values = if bucket == Bucket::Average {
            let divisor = self.classifier.average_divisor();
            values
                .into_iter()
                .map(|v| divisor.map_or_else(|| fallback(v), |d| v / d))
                .collect()
        } else {
            values
        };

        let mut ranked: Vec<(f64, usize)> = values
            .into_iter()
            .enumerate()
            .map(|(position, value)| (value, position))
            .collect();
        sort_descending(&mut ranked);

        ranked
            .into_iter()
            .take(TOP_PRODUCTS)
            .map(|(value, position)| RankedProduct {
                value,
                product: self.products.names()[position].clone(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::extract_metadata;
    use crate::schema::{PurchaseFlags, RecordDate, RecordSet};

    fn expense(month: i32, amount: f64, product: &str) -> Transaction {
        Transaction {
            date: RecordDate::new(1, month, 2023),
            amount,
            product: product.to_string(),
            category: "misc".to_string(),
            flags: PurchaseFlags {
                is_goods: true,
                is_one_off: true,
                is_necessity: true,
            },
        }
    }

    fn top(transactions: Vec<Transaction>) -> TopProducts {
        top_with_offset(transactions, 0)
    }

    fn top_with_offset(transactions: Vec<Transaction>, month_offset: i64) -> TopProducts {
        let records = RecordSet {
            transactions,
            income: vec![],
        };
        let meta = extract_metadata(&records, month_offset).unwrap();
        let classifier = RecencyClassifier::new(&meta);
        ProductRanker::new(&meta.products, &classifier).build(&records.transactions)
    }

    fn names(ranking: &[RankedProduct]) -> Vec<&str> {
        ranking.iter().map(|r| r.product.as_str()).collect()
    }

    #[test]
    fn test_top_five_by_amount_and_count() {
        let top = top(vec![
            expense(1, 1.0, "a"),
            expense(1, 6.0, "b"),
            expense(1, 2.0, "c"),
            expense(1, 2.0, "c"),
            expense(1, 2.0, "c"),
            expense(1, 4.0, "d"),
            expense(1, 5.0, "e"),
            expense(1, 3.0, "f"),
        ]);

        let by_amount = &top.by_amount.current;
        assert_eq!(by_amount.len(), TOP_PRODUCTS);
        assert_eq!(names(by_amount), vec!["b", "c", "e", "d", "f"]);
        assert_eq!(by_amount[0].value, 6.0);

        let by_count = &top.by_count.current;
        assert_eq!(names(by_count), vec!["c", "a", "b", "d", "e"]);
        assert_eq!(by_count[0].value, 3.0);
        assert_eq!(by_count[1].value, 1.0);
    }

    #[test]
    fn test_ties_keep_discovery_order() {
        let top = top(vec![
            expense(1, 5.0, "first"),
            expense(1, 9.0, "big"),
            expense(1, 5.0, "second"),
        ]);
        assert_eq!(names(&top.by_amount.current), vec!["big", "first", "second"]);
    }

    #[test]
    fn test_average_is_per_month() {
        // month 1 avg, month 2 previous + avg, month 3 current => divisor 2
        let top = top(vec![
            expense(1, 10.0, "rent"),
            expense(2, 10.0, "rent"),
            expense(2, 4.0, "snack"),
            expense(2, 4.0, "snack"),
            expense(3, 1.0, "snack"),
        ]);

        let avg_amount = &top.by_amount.avg;
        assert_eq!(avg_amount[0].product, "rent");
        assert!((avg_amount[0].value - 10.0).abs() < 1e-12);
        assert!((avg_amount[1].value - 4.0).abs() < 1e-12);

        let avg_count = &top.by_count.avg;
        assert_eq!(avg_count[0].product, "rent");
        assert!((avg_count[0].value - 1.0).abs() < 1e-12);
        assert!((avg_count[1].value - 1.0).abs() < 1e-12);

        assert_eq!(names(&top.by_count.last), vec!["snack", "rent"]);
        assert_eq!(top.by_count.last[0].value, 2.0);
    }

    #[test]
    fn test_single_month_average_is_zero() {
        let top = top(vec![expense(4, 3.0, "a"), expense(4, 2.0, "b")]);
        assert!(top.by_amount.avg.iter().all(|r| r.value == 0.0));
        assert!(top.by_count.avg.iter().all(|r| r.value == 0.0 && r.value.is_finite()));
        assert_eq!(names(&top.by_count.avg), vec!["a", "b"]);
    }

    #[test]
    fn test_later_months_without_history_keep_raw_amounts() {
        // offset 1 leaves January as the only month, February lands in the average bucket
        let top = top_with_offset(vec![expense(1, 10.0, "bread"), expense(2, 50.0, "tv")], 1);

        assert_eq!(names(&top.by_amount.current), vec!["bread", "tv"]);
        assert_eq!(top.by_amount.avg[0].product, "tv");
        assert_eq!(top.by_amount.avg[0].value, 50.0);
        assert_eq!(top.by_amount.avg[1].value, 0.0);

        assert!(top.by_count.avg.iter().all(|r| r.value == 0.0));
    }
}
