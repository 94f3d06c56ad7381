use crate::recency::{Bucket, PerBucket, RecencyClassifier};
use crate::schema::Transaction;
use crate::utils::percentage;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Amounts on either side of one boolean flag.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct FlagSplit {
    primary: f64,
    secondary: f64,
}

impl FlagSplit {
    fn add(&mut self, is_primary: bool, amount: f64) {
        if is_primary {
            self.primary += amount;
        } else {
            self.secondary += amount;
        }
    }
}

/// Share of the secondary flag state (services, regular, luxury) in percent,
/// one slot per bucket in current/previous/average order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FlagRatios {
    pub goods_v_services: [f64; 3],
    pub once_v_regular: [f64; 3],
    pub necessity_v_luxury: [f64; 3],
}

/// Bucket totals that percentages are taken of. `None` marks a bucket
/// without a basis to divide by.
pub fn percentage_bases(
    transactions: &[Transaction],
    classifier: &RecencyClassifier,
) -> PerBucket<Option<f64>> {
    let mut totals: PerBucket<f64> = PerBucket::default();
    for t in transactions {
        for &bucket in classifier.contributions(t.date.month_ordinal()) {
            totals[bucket] += t.amount;
        }
    }
    to_bases(totals, classifier)
}

fn to_bases(totals: PerBucket<f64>, classifier: &RecencyClassifier) -> PerBucket<Option<f64>> {
    let has_history = classifier.average_divisor().is_some();
    totals.map(|bucket, total| {
        let usable = total != 0.0 && (bucket != Bucket::Average || has_history);
        usable.then_some(total)
    })
}

pub fn build_flag_ratios(transactions: &[Transaction], classifier: &RecencyClassifier) -> FlagRatios {
    let mut goods: PerBucket<FlagSplit> = PerBucket::default();
    let mut once: PerBucket<FlagSplit> = PerBucket::default();
    let mut necessity: PerBucket<FlagSplit> = PerBucket::default();

    for t in transactions {
        for &bucket in classifier.contributions(t.date.month_ordinal()) {
            goods[bucket].add(t.flags.is_goods, t.amount);
            once[bucket].add(t.flags.is_one_off, t.amount);
            necessity[bucket].add(t.flags.is_necessity, t.amount);
        }
    }

    // every split covers the same amounts, so any of them gives the bucket total
    let bases = to_bases(
        PerBucket::from_fn(|b| goods[b].primary + goods[b].secondary),
        classifier,
    );

    let secondary_share = |splits: &PerBucket<FlagSplit>| -> [f64; 3] {
        let mut shares = [0.0; 3];
        for bucket in Bucket::ALL {
            if let Some(total) = bases[bucket] {
                shares[bucket.index()] = percentage(splits[bucket].secondary, total);
            }
        }
        shares
    };

    FlagRatios {
        goods_v_services: secondary_share(&goods),
        once_v_regular: secondary_share(&once),
        necessity_v_luxury: secondary_share(&necessity),
    }
}
