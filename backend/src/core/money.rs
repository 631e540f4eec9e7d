//! Money representation
//!
//! The backend speaks decimal amounts (`1250.5`). Inside the crate every
//! amount is an i64 count of minor units (cents) so sums and comparisons
//! stay exact. Conversion rounds half away from zero to the nearest cent.
//!
//! CRITICAL: All money values are i64 (cents)

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serializer};
use std::str::FromStr;

/// Convert a decimal amount to cents
///
/// Returns `None` when the amount does not fit in i64 cents.
///
/// # Example
/// ```
/// use offer_billing_core::core::money::cents_from_decimal;
/// use rust_decimal::Decimal;
///
/// assert_eq!(cents_from_decimal(Decimal::new(12505, 1)), Some(125_050));
/// assert_eq!(cents_from_decimal(Decimal::new(1005, 3)), Some(101));
/// ```
pub fn cents_from_decimal(amount: Decimal) -> Option<i64> {
    amount
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
        .checked_mul(Decimal::ONE_HUNDRED)?
        .to_i64()
}

/// Parse a decimal amount (`"1250.50"`, `"1e3"`) into cents
pub fn parse_cents(text: &str) -> Option<i64> {
    let text = text.trim();
    let amount = Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .ok()?;
    cents_from_decimal(amount)
}

/// Cents as an exact two-place decimal
pub fn decimal_from_cents(cents: i64) -> Decimal {
    Decimal::new(cents, 2)
}

/// Render cents as a plain two-decimal string (`"1250.50"`)
pub fn format_cents(cents: i64) -> String {
    decimal_from_cents(cents).to_string()
}

fn wire_number<S: Serializer>(cents: i64, serializer: S) -> Result<S::Ok, S::Error> {
    let amount = decimal_from_cents(cents)
        .to_f64()
        .ok_or_else(|| serde::ser::Error::custom(format!("amount not representable: {cents}")))?;
    serializer.serialize_f64(amount)
}

/// Serde adapter: decimal on the wire, cents in memory
///
/// Accepts both JSON numbers and numeric strings, since the backend
/// serializes decimal columns as strings on some endpoints.
pub mod decimal_cents {
    use super::*;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawAmount {
        Number(f64),
        Text(String),
    }

    pub fn serialize<S: Serializer>(cents: &i64, serializer: S) -> Result<S::Ok, S::Error> {
        wire_number(*cents, serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
        // A JSON number is re-read through its shortest decimal form, so
        // `1.005` is rounded as 1.005 and not as the nearest binary double.
        let text = match RawAmount::deserialize(deserializer)? {
            RawAmount::Number(n) if n.is_finite() => n.to_string(),
            RawAmount::Number(n) => {
                return Err(serde::de::Error::custom(format!("invalid amount {n}")));
            }
            RawAmount::Text(s) => s,
        };
        parse_cents(&text)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid amount {text:?}")))
    }
}

/// [`decimal_cents`] for optional amounts (update payloads)
pub mod decimal_cents_opt {
    use super::*;

    pub fn serialize<S: Serializer>(cents: &Option<i64>, serializer: S) -> Result<S::Ok, S::Error> {
        match cents {
            Some(cents) => wire_number(*cents, serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
        #[derive(Deserialize)]
        struct Wrapped(#[serde(with = "decimal_cents")] i64);

        Ok(Option::<Wrapped>::deserialize(deserializer)?.map(|Wrapped(cents)| cents))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Priced {
        #[serde(with = "decimal_cents")]
        amount: i64,
    }

    #[test]
    fn test_rounding_half_away_from_zero() {
        assert_eq!(parse_cents("10.125"), Some(1013));
        assert_eq!(parse_cents("-10.125"), Some(-1013));
        assert_eq!(parse_cents("0"), Some(0));
        assert_eq!(parse_cents("1.005"), Some(101));
        assert_eq!(parse_cents("2.675"), Some(268));
        assert_eq!(parse_cents("8.345"), Some(835));
        assert_eq!(parse_cents("1.004"), Some(100));
    }

    #[test]
    fn test_parse_cents_rejects_garbage_and_overflow() {
        assert_eq!(parse_cents("1e3"), Some(100_000));
        assert_eq!(parse_cents("twelve"), None);
        assert_eq!(parse_cents(""), None);
        assert_eq!(parse_cents("99999999999999999999999"), None);
    }

    #[test]
    fn test_midpoints_that_are_inexact_in_binary() {
        let from_string: Priced = serde_json::from_str(r#"{"amount": "1.005"}"#).unwrap();
        assert_eq!(from_string.amount, 101);

        let from_number: Priced = serde_json::from_str(r#"{"amount": 2.675}"#).unwrap();
        assert_eq!(from_number.amount, 268);

        let from_number: Priced = serde_json::from_str(r#"{"amount": 8.345}"#).unwrap();
        assert_eq!(from_number.amount, 835);
    }

    #[test]
    fn test_format_cents() {
        assert_eq!(format_cents(125_050), "1250.50");
        assert_eq!(format_cents(7), "0.07");
        assert_eq!(format_cents(-199), "-1.99");
    }

    #[test]
    fn test_deserialize_number_and_string() {
        let from_number: Priced = serde_json::from_str(r#"{"amount": 1500.25}"#).unwrap();
        assert_eq!(from_number.amount, 150_025);

        let from_string: Priced = serde_json::from_str(r#"{"amount": "99.90"}"#).unwrap();
        assert_eq!(from_string.amount, 9_990);

        assert!(serde_json::from_str::<Priced>(r#"{"amount": "abc"}"#).is_err());
    }

    #[test]
    fn test_serialize_as_decimal() {
        let json = serde_json::to_string(&Priced { amount: 150_025 }).unwrap();
        assert_eq!(json, r#"{"amount":1500.25}"#);
    }
}
