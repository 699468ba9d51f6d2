use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Update intent for a field of a partial update.
///
/// A missing JSON key deserializes (via `#[serde(default)]`) to `Unset`; a
/// present value, including an empty list, becomes `SetTo`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldUpdate<T> {
    Unset,
    SetTo(T),
}

impl<T> Default for FieldUpdate<T> {
    fn default() -> Self {
        FieldUpdate::Unset
    }
}

impl<T> FieldUpdate<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> FieldUpdate<U> {
        match self {
            FieldUpdate::Unset => FieldUpdate::Unset,
            FieldUpdate::SetTo(value) => FieldUpdate::SetTo(f(value)),
        }
    }

    pub fn is_set(&self) -> bool {
        matches!(self, FieldUpdate::SetTo(_))
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            FieldUpdate::Unset => None,
            FieldUpdate::SetTo(value) => Some(value),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for FieldUpdate<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        T::deserialize(deserializer).map(FieldUpdate::SetTo)
    }
}

/// Largest accepted price: five digits, two of them decimals.
const MAX_PRICE_CENTS: i32 = 99_999;

/// A non-negative amount with two decimal places, held as cents.
///
/// Accepts JSON numbers (`4.5`) and numeric strings (`"4.50"`), and always
/// serializes as a two-decimal string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Price(i32);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceError(String);

impl fmt::Display for PriceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for PriceError {}

impl Price {
    pub fn from_cents(cents: i32) -> Self {
        Price(cents)
    }

    pub fn cents(self) -> i32 {
        self.0
    }

    pub fn parse(input: &str) -> Result<Self, PriceError> {
        let s = input.trim();
        if s.starts_with('-') {
            return Err(PriceError("price must be zero or greater".to_string()));
        }

        let (whole, frac) = match s.split_once('.') {
            Some((whole, frac)) => (whole, frac),
            None => (s, ""),
        };

        let all_digits = |part: &str| part.chars().all(|c| c.is_ascii_digit());
        if (whole.is_empty() && frac.is_empty()) || !all_digits(whole) || !all_digits(frac) {
            return Err(PriceError(format!("'{}' is not a valid price", input)));
        }
        if frac.len() > 2 {
            return Err(PriceError(
                "price allows at most 2 decimal places".to_string(),
            ));
        }

        let whole = whole.trim_start_matches('0');
        if whole.len() > 3 {
            return Err(PriceError(
                "price allows at most 3 digits before the decimal point".to_string(),
            ));
        }

        let whole_value: i32 = if whole.is_empty() {
            0
        } else {
            whole
                .parse()
                .map_err(|_| PriceError(format!("'{}' is not a valid price", input)))?
        };
        let frac_value: i32 = match frac.len() {
            0 => 0,
            1 => frac.parse::<i32>().unwrap_or(0) * 10,
            _ => frac.parse().unwrap_or(0),
        };

        let cents = whole_value * 100 + frac_value;
        debug_assert!(cents <= MAX_PRICE_CENTS);
        Ok(Price(cents))
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawPrice {
            Text(String),
            Number(serde_json::Number),
        }

        let raw = match RawPrice::deserialize(deserializer)? {
            RawPrice::Text(s) => s,
            RawPrice::Number(n) => n.to_string(),
        };
        Price::parse(&raw).map_err(serde::de::Error::custom)
    }
}
