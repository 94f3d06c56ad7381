use crate::error::{Result, SpendingSummaryError};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Calendar position of a record. Plain integers, no calendar validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct RecordDate {
    pub day: i32,
    pub month: i32,
    pub year: i32,
}

impl RecordDate {
    pub fn new(day: i32, month: i32, year: i32) -> Self {
        Self { day, month, year }
    }

    /// `year * 12 + month`, the arithmetic key for calendar months.
    pub fn month_ordinal(&self) -> i64 {
        month_ordinal(self.year, self.month)
    }

    /// `month_ordinal * 31 + day`. Only meaningful for ordering.
    pub fn date_ordinal(&self) -> i64 {
        date_ordinal(self.year, self.month, self.day)
    }
}

impl std::fmt::Display for RecordDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.day, self.month, self.year)
    }
}

pub fn month_ordinal(year: i32, month: i32) -> i64 {
    year as i64 * 12 + month as i64
}

pub fn date_ordinal(year: i32, month: i32, day: i32) -> i64 {
    month_ordinal(year, month) * 31 + day as i64
}

/// The three independent classification flags of an expense.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct PurchaseFlags {
    #[schemars(description = "true for goods, false for services")]
    pub is_goods: bool,

    #[schemars(description = "true for a one-off purchase, false for a regular one")]
    pub is_one_off: bool,

    #[schemars(description = "true for a necessity, false for luxury")]
    pub is_necessity: bool,
}

impl PurchaseFlags {
    /// Decodes the `g`/`s`, `o`/`r` and `n`/`l` field codes. Codes must match exactly.
    pub fn from_codes(goods: &str, once: &str, necessity: &str) -> Option<Self> {
        let is_goods = match goods {
            "g" => true,
            "s" => false,
            _ => return None,
        };
        let is_one_off = match once {
            "o" => true,
            "r" => false,
            _ => return None,
        };
        let is_necessity = match necessity {
            "n" => true,
            "l" => false,
            _ => return None,
        };

        Some(Self {
            is_goods,
            is_one_off,
            is_necessity,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Transaction {
    pub date: RecordDate,
    /// Non-negative spent amount.
    pub amount: f64,
    pub product: String,
    pub category: String,
    pub flags: PurchaseFlags,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct IncomeEntry {
    pub date: RecordDate,
    /// Stored negative, as in the source rows. The income is `-amount`.
    pub amount: f64,
}

impl IncomeEntry {
    pub fn income(&self) -> f64 {
        -self.amount
    }
}

pub trait Dated {
    fn date(&self) -> RecordDate;
}

impl Dated for Transaction {
    fn date(&self) -> RecordDate {
        self.date
    }
}

impl Dated for IncomeEntry {
    fn date(&self) -> RecordDate {
        self.date
    }
}

/// Either kind of record, used where the dataset bounds may be of both kinds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BoundaryRecord {
    Expense(Transaction),
    Income(IncomeEntry),
}

impl Dated for BoundaryRecord {
    fn date(&self) -> RecordDate {
        match self {
            BoundaryRecord::Expense(t) => t.date,
            BoundaryRecord::Income(i) => i.date,
        }
    }
}

/// The validated input of one summary run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordSet {
    pub transactions: Vec<Transaction>,
    pub income: Vec<IncomeEntry>,
}

impl RecordSet {
    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty() && self.income.is_empty()
    }

    pub fn len(&self) -> usize {
        self.transactions.len() + self.income.len()
    }
}

fn default_separator() -> char {
    ' '
}

fn default_saving() -> f64 {
    100.0
}

fn default_meal_category() -> String {
    "food".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SummaryConfig {
    #[serde(default = "default_separator")]
    #[schemars(description = "Field delimiter of the input rows. Must be a single ASCII character.")]
    pub separator: char,

    #[serde(default)]
    #[schemars(
        description = "Number of months to step back from the last recorded month when choosing the current month."
    )]
    pub month_offset: i64,

    #[serde(default = "default_saving")]
    #[schemars(description = "Amount to set aside each month. The budget line is last month's income minus this.")]
    pub saving: f64,

    #[serde(default = "default_meal_category")]
    #[schemars(description = "Category whose necessity purchases count as meal spending.")]
    pub meal_category: String,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            separator: default_separator(),
            month_offset: 0,
            saving: default_saving(),
            meal_category: default_meal_category(),
        }
    }
}

impl SummaryConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: SummaryConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn validate(&self) -> Result<()> {
        if self.month_offset < 0 {
            return Err(SpendingSummaryError::NegativeMonthOffset(self.month_offset));
        }
        self.delimiter().map(|_| ())
    }

    /// The separator as the single byte the tokenizer expects.
    pub fn delimiter(&self) -> Result<u8> {
        if self.separator.is_ascii() {
            Ok(self.separator as u8)
        } else {
            Err(SpendingSummaryError::InvalidSeparator(
                self.separator.to_string(),
            ))
        }
    }

    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(SummaryConfig)
    }
}
