use serde::Serialize;
use std::fmt;

pub const CURRENCY_SYMBOL: &str = "₹";

/// Estimated monthly salary as returned by the model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Salary(f64);

impl Salary {
    pub fn new(amount: f64) -> Self {
        Self(amount)
    }

    pub fn amount(&self) -> f64 {
        self.0
    }
}

impl fmt::Display for Salary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{CURRENCY_SYMBOL} {}", group_thousands(self.0))
    }
}

/// Two decimals with comma grouping, e.g. `-1234567.891` -> `-1,234,567.89`.
pub fn group_thousands(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3 + 4);
    if value.is_sign_negative() {
        grouped.push('-');
    }
    for (i, digit) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    grouped.push('.');
    grouped.push_str(frac_part);
    grouped
}
