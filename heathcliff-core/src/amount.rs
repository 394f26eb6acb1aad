//! Currency-tagged amount normalization.

use crate::{ReportError, ReportResult, ReportRow};
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use std::collections::BTreeMap;

/// Column that carries the currency resolved for a row.
pub const ORIGINAL_CURRENCY_COLUMN: &str = "original_currency";

/// Money value as the API sends it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmountValue {
    pub currency: String,
    pub amount: Value,
}

impl AmountValue {
    /// Any JSON object with a `currency` key is an amount object.
    pub fn is_amount(value: &Value) -> bool {
        value
            .as_object()
            .is_some_and(|object| object.contains_key("currency"))
    }

    /// Decode an amount object. `None` unless the currency is a string.
    pub fn from_value(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        let currency = object.get("currency")?.as_str()?;
        Some(Self {
            currency: currency.to_string(),
            amount: object.get("amount").cloned().unwrap_or(Value::Null),
        })
    }

    /// Decimal amount as a float. Amounts arrive as strings (`"1.00"`) or numbers.
    pub fn as_f64(&self) -> Option<f64> {
        match &self.amount {
            Value::String(s) => s.trim().parse::<f64>().ok(),
            Value::Number(n) => n.as_f64(),
            _ => None,
        }
    }
}

/// Converts amount objects in a row to plain floats.
#[derive(Debug, Clone, Copy, Default)]
pub struct AmountNormalizer;

impl AmountNormalizer {
    /// Replace every amount field of `row` with its float value and record
    /// the row currency under [`ORIGINAL_CURRENCY_COLUMN`] (null when the row
    /// has no amount fields).
    ///
    /// Fails with [`ReportError::MixedCurrencyRow`] when amount fields carry
    /// more than one distinct currency, and with [`ReportError::InvalidAmount`]
    /// when an amount has a non-string currency or an unparsable value.
    pub fn normalize(&self, row: &mut ReportRow) -> ReportResult<Option<String>> {
        // field -> currency, first field seen per distinct currency
        let mut currencies: BTreeMap<String, String> = BTreeMap::new();

        for (field, value) in row.iter_mut() {
            if !AmountValue::is_amount(value) {
                continue;
            }
            let invalid = || ReportError::InvalidAmount {
                field: field.clone(),
                value: value.clone(),
            };
            let amount = AmountValue::from_value(value).ok_or_else(invalid)?;
            if !currencies.values().any(|c| c == &amount.currency) {
                currencies.insert(field.clone(), amount.currency.clone());
            }
            let number = amount
                .as_f64()
                .and_then(Number::from_f64)
                .ok_or_else(invalid)?;
            *value = Value::Number(number);
        }

        if currencies.len() > 1 {
            return Err(ReportError::MixedCurrencyRow { currencies });
        }

        let currency = currencies.into_values().next();
        row.insert(
            ORIGINAL_CURRENCY_COLUMN,
            currency.clone().map(Value::String).unwrap_or(Value::Null),
        );
        Ok(currency)
    }
}
