use chrono::NaiveDate;
use std::cmp::Ordering;

/// First day of the month with the given `year * 12 + month` ordinal.
pub fn month_start(month_ordinal: i64) -> Option<NaiveDate> {
    let zero_based = month_ordinal - 1;
    let year = i32::try_from(zero_based.div_euclid(12)).ok()?;
    let month = zero_based.rem_euclid(12) as u32 + 1;
    NaiveDate::from_ymd_opt(year, month, 1)
}

/// `part * 100 / total`, or 0 when there is nothing to divide by.
pub fn percentage(part: f64, total: f64) -> f64 {
    if total != 0.0 {
        part * 100.0 / total
    } else {
        0.0
    }
}

/// Descending order on values. Incomparable values are treated as equal so that
/// a stable sort keeps their discovery order.
pub fn descending(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}

/// Stable descending sort of `(value, id)` pairs by value.
pub fn sort_descending<T>(entries: &mut [(f64, T)]) {
    entries.sort_by(|a, b| descending(a.0, b.0));
}
