use std::{fmt, str::FromStr};

use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::{json, Map, Value};

use super::ClassifyError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Intent {
    SpendingQuery,
    BudgetAdvice,
    GoalTracking,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Food,
    Entertainment,
    Bills,
    Etc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Timeframe {
    Week,
    Month,
    Year,
}

/// A finance question reduced to the fields the transaction query needs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ClassifiedQuery {
    pub intent: Intent,
    pub category: Category,
    pub timeframe: Timeframe,
    pub amount: Option<f64>,
}

impl Intent {
    pub const ALL: [Intent; 3] = [Intent::SpendingQuery, Intent::BudgetAdvice, Intent::GoalTracking];

    pub fn as_str(self) -> &'static str {
        match self {
            Intent::SpendingQuery => "spendingQuery",
            Intent::BudgetAdvice => "budgetAdvice",
            Intent::GoalTracking => "goalTracking",
        }
    }
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Food,
        Category::Entertainment,
        Category::Bills,
        Category::Etc,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Food => "food",
            Category::Entertainment => "entertainment",
            Category::Bills => "bills",
            Category::Etc => "etc",
        }
    }

    /// Category labels stored on transactions that this category covers.
    pub fn stored_labels(self) -> &'static [&'static str] {
        match self {
            Category::Food => &["Food and Drink", "Groceries", "Restaurants"],
            Category::Entertainment => &["Entertainment", "Recreation"],
            Category::Bills => &["Bills", "Utilities", "Rent"],
            Category::Etc => &["Travel", "Shopping", "Miscellaneous"],
        }
    }
}

impl Timeframe {
    pub const ALL: [Timeframe; 3] = [Timeframe::Month, Timeframe::Week, Timeframe::Year];

    pub fn as_str(self) -> &'static str {
        match self {
            Timeframe::Week => "week",
            Timeframe::Month => "month",
            Timeframe::Year => "year",
        }
    }
}

macro_rules! wire_enum {
    ($ty:ty) => {
        impl FromStr for $ty {
            type Err = ();

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let s = s.trim();
                <$ty>::ALL
                    .into_iter()
                    .find(|v| v.as_str().eq_ignore_ascii_case(s))
                    .ok_or(())
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = String::deserialize(deserializer)?;
                raw.parse().map_err(|_| {
                    de::Error::custom(format!(
                        "unknown value `{}`, expected one of: {}",
                        raw.trim(),
                        names(&<$ty>::ALL, <$ty>::as_str).join(", ")
                    ))
                })
            }
        }
    };
}

wire_enum!(Intent);
wire_enum!(Category);
wire_enum!(Timeframe);

fn enum_field<T: FromStr>(obj: &Map<String, Value>, field: &'static str) -> Result<T, ClassifyError> {
    match obj.get(field) {
        Some(Value::String(s)) => s.parse::<T>().map_err(|_| ClassifyError::Validation {
            field,
            value: s.clone(),
        }),
        Some(other) => Err(ClassifyError::Validation {
            field,
            value: other.to_string(),
        }),
        None => Err(ClassifyError::Validation {
            field,
            value: "<missing>".into(),
        }),
    }
}

fn amount_field(obj: &Map<String, Value>) -> Result<Option<f64>, ClassifyError> {
    match obj.get("amount") {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => match n.as_f64() {
            Some(v) if v.is_finite() => Ok(Some(v)),
            _ => Err(ClassifyError::Validation {
                field: "amount",
                value: n.to_string(),
            }),
        },
        Some(other) => Err(ClassifyError::Validation {
            field: "amount",
            value: other.to_string(),
        }),
    }
}

impl ClassifiedQuery {
    pub fn from_value(value: &Value) -> Result<Self, ClassifyError> {
        let obj = value
            .as_object()
            .ok_or_else(|| ClassifyError::Validation {
                field: "query",
                value: value.to_string(),
            })?;

        Ok(Self {
            intent: enum_field(obj, "intent")?,
            category: enum_field(obj, "category")?,
            timeframe: enum_field(obj, "timeframe")?,
            amount: amount_field(obj)?,
        })
    }
}

pub(super) fn names<T: Copy>(all: &[T], as_str: fn(T) -> &'static str) -> Vec<&'static str> {
    all.iter().map(|v| as_str(*v)).collect()
}

/// Schema for providers that support constrained JSON output.
pub fn response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "intent": { "type": "STRING", "enum": names(&Intent::ALL, Intent::as_str) },
            "category": { "type": "STRING", "enum": names(&Category::ALL, Category::as_str) },
            "timeframe": { "type": "STRING", "enum": names(&Timeframe::ALL, Timeframe::as_str) },
            "amount": { "type": "NUMBER", "nullable": true }
        },
        "required": ["intent", "category", "timeframe", "amount"]
    })
}
