use crate::categories::CategoryRanker;
use crate::daily::DailyAccumulator;
use crate::error::Result;
use crate::metadata::{extract_metadata, DatasetMetadata};
use crate::monthly::MonthSeriesBuilder;
use crate::products::ProductRanker;
use crate::ratios::build_flag_ratios;
use crate::recency::RecencyClassifier;
use crate::schema::{Dated, RecordSet, SummaryConfig};
use crate::summary::SpendingSummary;
use log::{debug, info};

/// Runs every aggregation pass over one validated record set.
pub struct SummaryEngine<'a> {
    config: &'a SummaryConfig,
}

impl<'a> SummaryEngine<'a> {
    pub fn new(config: &'a SummaryConfig) -> Self {
        Self { config }
    }

    pub fn build(&self, records: &RecordSet) -> Result<SpendingSummary> {
        let meta = extract_metadata(records, self.config.month_offset)?;

        info!(
            "Summarizing {} expenses and {} income entries over {} months",
            records.transactions.len(),
            records.income.len(),
            meta.month_count
        );
        debug!(
            "Found {} categories and {} products, current month ordinal {}",
            meta.categories.len(),
            meta.products.len(),
            meta.current_month()
        );

        Ok(self.aggregate(records, &meta))
    }

    fn aggregate(&self, records: &RecordSet, meta: &DatasetMetadata) -> SpendingSummary {
        let transactions = &records.transactions;
        let meal_category = self.config.meal_category.as_str();
        let classifier = RecencyClassifier::new(meta);

        let daily = DailyAccumulator::new(&classifier, meal_category).build(transactions);
        let monthly =
            MonthSeriesBuilder::new(meta, meal_category).build(transactions, &records.income);
        let ratios = build_flag_ratios(transactions, &classifier);
        let categories = CategoryRanker::new(&meta.categories, &classifier).build(transactions);
        let products = ProductRanker::new(&meta.products, &classifier).build(transactions);

        let budget = monthly.budget(self.config.saving);

        SpendingSummary {
            first: meta.first.date(),
            last: meta.last.date(),
            month_count: meta.month_count,
            spending_per_month: monthly.spending_per_month,
            income_per_month: monthly.income_per_month,
            cumulative_saldo: monthly.cumulative_saldo,
            months: monthly.months,
            budget,
            cumulative_spending: daily.total,
            cumulative_meal_spending: daily.meal,
            cumulative_amenity_spending: daily.amenity,
            goods_v_services: ratios.goods_v_services,
            once_v_regular: ratios.once_v_regular,
            necessity_v_luxury: ratios.necessity_v_luxury,
            spending_per_category: categories,
            top_products_amount: products.by_amount,
            top_products_count: products.by_count,
        }
    }
}

pub fn summarize(records: &RecordSet, config: &SummaryConfig) -> Result<SpendingSummary> {
    SummaryEngine::new(config).build(records)
}
