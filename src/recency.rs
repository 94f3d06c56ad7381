use crate::metadata::DatasetMetadata;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

/// Recency classification of a record relative to the current month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Bucket {
    Current,
    Previous,
    Average,
}

impl Bucket {
    pub const ALL: [Bucket; 3] = [Bucket::Current, Bucket::Previous, Bucket::Average];

    pub fn index(self) -> usize {
        match self {
            Bucket::Current => 0,
            Bucket::Previous => 1,
            Bucket::Average => 2,
        }
    }

    /// Buckets a record of this class is accumulated into. The previous month
    /// also feeds the historical average.
    pub fn contributions(self) -> &'static [Bucket] {
        match self {
            Bucket::Current => &[Bucket::Current],
            Bucket::Previous => &[Bucket::Previous, Bucket::Average],
            Bucket::Average => &[Bucket::Average],
        }
    }
}

/// One value per bucket. Serialized with the keys the rendering layer uses.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PerBucket<T> {
    pub current: T,
    pub last: T,
    pub avg: T,
}

impl<T> PerBucket<T> {
    pub fn from_fn(mut f: impl FnMut(Bucket) -> T) -> Self {
        Self {
            current: f(Bucket::Current),
            last: f(Bucket::Previous),
            avg: f(Bucket::Average),
        }
    }

    pub fn map<U>(self, mut f: impl FnMut(Bucket, T) -> U) -> PerBucket<U> {
        PerBucket {
            current: f(Bucket::Current, self.current),
            last: f(Bucket::Previous, self.last),
            avg: f(Bucket::Average, self.avg),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Bucket, &T)> {
        [
            (Bucket::Current, &self.current),
            (Bucket::Previous, &self.last),
            (Bucket::Average, &self.avg),
        ]
        .into_iter()
    }
}

impl<T> Index<Bucket> for PerBucket<T> {
    type Output = T;

    fn index(&self, bucket: Bucket) -> &T {
        match bucket {
            Bucket::Current => &self.current,
            Bucket::Previous => &self.last,
            Bucket::Average => &self.avg,
        }
    }
}

impl<T> IndexMut<Bucket> for PerBucket<T> {
    fn index_mut(&mut self, bucket: Bucket) -> &mut T {
        match bucket {
            Bucket::Current => &mut self.current,
            Bucket::Previous => &mut self.last,
            Bucket::Average => &mut self.avg,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RecencyClassifier {
    current_month: i64,
    month_count: usize,
}

impl RecencyClassifier {
    pub fn new(meta: &DatasetMetadata) -> Self {
        Self {
            current_month: meta.current_month(),
            month_count: meta.month_count,
        }
    }

    pub fn classify(&self, month_ordinal: i64) -> Bucket {
        if month_ordinal == self.current_month {
            Bucket::Current
        } else if month_ordinal == self.current_month - 1 {
            Bucket::Previous
        } else {
            Bucket::Average
        }
    }

    pub fn contributions(&self, month_ordinal: i64) -> &'static [Bucket] {
        self.classify(month_ordinal).contributions()
    }

    /// Number of months the historical average is taken over, or `None`
    /// when there is no month before the current one.
    pub fn average_divisor(&self) -> Option<f64> {
        if self.month_count > 1 {
            Some((self.month_count - 1) as f64)
        } else {
            None
        }
    }
}
