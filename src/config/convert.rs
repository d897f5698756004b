//! Typed conversion of raw source text into record values.
//!
//! Values are produced as [`serde_json::Value`]s shaped the way serde
//! serializes the corresponding Rust type, so each one deserializes straight
//! into the record member it was resolved for.

use chrono::{DateTime, SecondsFormat};
use serde_json::{Map, Number, Value};

use super::error::ConvertError;
use super::field::Kind;

/// Separator between sequence elements and between map pairs.
pub const ITEM_SEPARATOR: char = ',';
/// Separator between a map key and its value.
pub const KEY_VALUE_SEPARATOR: char = ':';

const NANOS_PER_SEC: u128 = 1_000_000_000;

/// Converts `raw` into a value of the given kind.
pub(crate) fn convert_value(raw: &str, kind: &Kind) -> Result<Value, ConvertError> {
    match kind {
        Kind::Seq(inner) => {
            ensure_scalar(inner, kind)?;
            let items = raw
                .split(ITEM_SEPARATOR)
                .enumerate()
                .map(|(i, item)| {
                    let item = item.trim();
                    convert_scalar(item, inner).map_err(|e| match e {
                        ConvertError::Invalid { reason, .. } => ConvertError::invalid(
                            raw,
                            format!("element {i} ({item:?}): {reason}"),
                        ),
                        other => other,
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Value::Array(items))
        }
        Kind::Map(inner) => {
            ensure_scalar(inner, kind)?;
            let mut table = Map::new();
            for pair in raw.split(ITEM_SEPARATOR) {
                let (key, value) = pair
                    .split_once(KEY_VALUE_SEPARATOR)
                    .ok_or_else(|| ConvertError::MapFormat(pair.to_string()))?;
                let key = key.trim();
                let value = value.trim();
                let converted = convert_scalar(value, inner).map_err(|e| match e {
                    ConvertError::Invalid { reason, .. } => {
                        ConvertError::invalid(raw, format!("key {key:?}: {reason}"))
                    }
                    other => other,
                })?;
                table.insert(key.to_string(), converted);
            }
            Ok(Value::Object(table))
        }
        _ => convert_scalar(raw, kind),
    }
}

fn ensure_scalar(inner: &Kind, outer: &Kind) -> Result<(), ConvertError> {
    match inner {
        Kind::Seq(_) | Kind::Map(_) | Kind::Bytes => {
            Err(ConvertError::Unsupported(outer.to_string()))
        }
        _ => Ok(()),
    }
}

fn convert_scalar(raw: &str, kind: &Kind) -> Result<Value, ConvertError> {
    match kind {
        Kind::Bool => parse_bool(raw).map(Value::Bool),
        Kind::Int => raw
            .parse::<i64>()
            .map(Value::from)
            .map_err(|e| ConvertError::invalid(raw, e)),
        Kind::Uint => raw
            .parse::<u64>()
            .map(Value::from)
            .map_err(|e| ConvertError::invalid(raw, e)),
        Kind::Float => {
            let f = raw
                .parse::<f64>()
                .map_err(|e| ConvertError::invalid(raw, e))?;
            Number::from_f64(f)
                .map(Value::Number)
                .ok_or_else(|| ConvertError::invalid(raw, "non-finite floats are not supported"))
        }
        Kind::Text => Ok(Value::String(raw.to_string())),
        Kind::Duration => duration_value(raw),
        Kind::Timestamp => DateTime::parse_from_rfc3339(raw)
            .map(|dt| Value::String(dt.to_rfc3339_opts(SecondsFormat::AutoSi, true)))
            .map_err(|e| ConvertError::invalid(raw, format!("expected RFC 3339 timestamp: {e}"))),
        Kind::Bytes | Kind::Seq(_) | Kind::Map(_) => {
            Err(ConvertError::Unsupported(kind.to_string()))
        }
    }
}

fn parse_bool(raw: &str) -> Result<bool, ConvertError> {
    match raw {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
        _ => Err(ConvertError::invalid(raw, "expected true or false")),
    }
}

/// Serde represents `std::time::Duration` as `{ secs, nanos }`.
fn duration_value(raw: &str) -> Result<Value, ConvertError> {
    let total = parse_duration_nanos(raw)?;
    let secs = u64::try_from(total / NANOS_PER_SEC)
        .map_err(|_| ConvertError::invalid(raw, "duration out of range"))?;
    // Always below one second, fits.
    let nanos = (total % NANOS_PER_SEC) as u32;

    let mut table = Map::new();
    table.insert("secs".into(), Value::from(secs));
    table.insert("nanos".into(), Value::from(nanos));
    Ok(Value::Object(table))
}

/// Parses a sequence of decimal magnitudes with units, such as `1h30m`,
/// `1.5s` or `300ms`, into nanoseconds. A bare `0` needs no unit.
fn parse_duration_nanos(raw: &str) -> Result<u128, ConvertError> {
    let invalid = |reason: &str| ConvertError::invalid(raw, reason);

    let mut rest = raw;
    if rest.starts_with('-') {
        return Err(invalid("negative durations are not supported"));
    }
    if let Some(stripped) = rest.strip_prefix('+') {
        rest = stripped;
    }
    if rest == "0" {
        return Ok(0);
    }
    if rest.is_empty() {
        return Err(invalid("empty duration"));
    }

    let mut total: u128 = 0;
    while !rest.is_empty() {
        let (int_part, after) = split_digits(rest);
        rest = after;

        let mut frac_part = "";
        if let Some(after_dot) = rest.strip_prefix('.') {
            let (digits, after) = split_digits(after_dot);
            frac_part = digits;
            rest = after;
        }
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(invalid("expected a number"));
        }

        let unit_end = rest
            .find(|c: char| c == '.' || c.is_ascii_digit())
            .unwrap_or(rest.len());
        let (unit, after) = rest.split_at(unit_end);
        rest = after;

        let scale: u128 = match unit {
            "ns" => 1,
            "us" | "µs" | "μs" => 1_000,
            "ms" => 1_000_000,
            "s" => NANOS_PER_SEC,
            "m" => 60 * NANOS_PER_SEC,
            "h" => 3_600 * NANOS_PER_SEC,
            "" => return Err(invalid("missing unit")),
            _ => return Err(invalid("unknown unit")),
        };

        let whole = if int_part.is_empty() {
            0
        } else {
            int_part
                .parse::<u128>()
                .map_err(|_| invalid("duration out of range"))?
        };

        // Digits past the twentieth are below nanosecond resolution.
        let mut frac: u128 = 0;
        let mut denom: u128 = 1;
        for digit in frac_part.bytes().take(20) {
            frac = frac * 10 + u128::from(digit - b'0');
            denom *= 10;
        }

        total = whole
            .checked_mul(scale)
            .and_then(|w| w.checked_add(frac * scale / denom))
            .and_then(|v| total.checked_add(v))
            .ok_or_else(|| invalid("duration out of range"))?;
    }

    Ok(total)
}

fn split_digits(s: &str) -> (&str, &str) {
    let end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    s.split_at(end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn secs_nanos(value: &Value) -> (u64, u64) {
        let table = value.as_object().unwrap();
        (
            table["secs"].as_u64().unwrap(),
            table["nanos"].as_u64().unwrap(),
        )
    }

    #[test]
    fn test_sequence_of_text() {
        let value = convert_value("one,two,three", &Kind::seq(Kind::Text)).unwrap();
        assert_eq!(
            value,
            Value::Array(vec!["one".into(), "two".into(), "three".into()])
        );
    }

    #[test]
    fn test_sequence_elements_are_trimmed() {
        let value = convert_value(" 1, 2 ,3", &Kind::seq(Kind::Int)).unwrap();
        assert_eq!(value, json!([1, 2, 3]));
    }

    #[test]
    fn test_sequence_element_failure_names_element() {
        let err = convert_value("1,x,3", &Kind::seq(Kind::Int)).unwrap_err();
        match err {
            ConvertError::Invalid { raw, reason } => {
                assert_eq!(raw, "1,x,3");
                assert!(reason.contains("element 1"), "{reason}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_map_of_int() {
        let value = convert_value("key1:1,key2:2", &Kind::map(Kind::Int)).unwrap();
        assert_eq!(value, json!({"key1": 1, "key2": 2}));
    }

    #[test]
    fn test_map_keys_and_values_are_trimmed() {
        let value = convert_value(" a : x , b:y", &Kind::map(Kind::Text)).unwrap();
        let table = value.as_object().unwrap();
        assert_eq!(table["a"].as_str(), Some("x"));
        assert_eq!(table["b"].as_str(), Some("y"));
    }

    #[test]
    fn test_malformed_map_token() {
        let err = convert_value("key1,key2:2", &Kind::map(Kind::Int)).unwrap_err();
        assert_eq!(err, ConvertError::MapFormat("key1".into()));
    }

    #[test]
    fn test_bool_forms() {
        for raw in ["1", "t", "T", "TRUE", "true", "True"] {
            assert_eq!(convert_value(raw, &Kind::Bool).unwrap(), Value::Bool(true));
        }
        for raw in ["0", "f", "F", "FALSE", "false", "False"] {
            assert_eq!(convert_value(raw, &Kind::Bool).unwrap(), Value::Bool(false));
        }
        assert!(matches!(
            convert_value("invalid", &Kind::Bool),
            Err(ConvertError::Invalid { .. })
        ));
    }

    #[test]
    fn test_numbers() {
        assert_eq!(convert_value("-42", &Kind::Int).unwrap(), json!(-42));
        assert_eq!(convert_value("42", &Kind::Uint).unwrap(), json!(42));
        assert_eq!(convert_value("2.5", &Kind::Float).unwrap(), json!(2.5));
        assert!(convert_value("invalid", &Kind::Int).is_err());
        assert!(convert_value("-1", &Kind::Uint).is_err());
        assert!(convert_value("99999999999999999999", &Kind::Int).is_err());
    }

    #[test]
    fn test_uint_keeps_full_width() {
        let value = convert_value(&u64::MAX.to_string(), &Kind::Uint).unwrap();
        assert_eq!(value.as_u64(), Some(u64::MAX));

        let value = convert_value("9223372036854775808", &Kind::Uint).unwrap();
        assert_eq!(value.as_u64(), Some(1 << 63));

        assert!(convert_value("18446744073709551616", &Kind::Uint).is_err());
    }

    #[test]
    fn test_non_finite_float_rejected() {
        for raw in ["NaN", "inf", "-inf"] {
            assert!(matches!(
                convert_value(raw, &Kind::Float),
                Err(ConvertError::Invalid { .. })
            ));
        }
    }

    #[test]
    fn test_duration_compound() {
        let value = convert_value("1h30m", &Kind::Duration).unwrap();
        assert_eq!(secs_nanos(&value), (5_400, 0));

        let value = convert_value("1.5s", &Kind::Duration).unwrap();
        assert_eq!(secs_nanos(&value), (1, 500_000_000));

        let value = convert_value("2m3s250ms10us", &Kind::Duration).unwrap();
        assert_eq!(secs_nanos(&value), (123, 250_010_000));

        let value = convert_value("0", &Kind::Duration).unwrap();
        assert_eq!(secs_nanos(&value), (0, 0));
    }

    #[test]
    fn test_duration_invalid() {
        for raw in ["invalid", "", "10", "5x", "-1s", ".s", "1h30"] {
            assert!(
                convert_value(raw, &Kind::Duration).is_err(),
                "{raw:?} should not parse"
            );
        }
    }

    #[test]
    fn test_timestamp() {
        let value = convert_value("2006-01-02T15:04:05Z", &Kind::Timestamp).unwrap();
        assert_eq!(value.as_str(), Some("2006-01-02T15:04:05Z"));

        let value = convert_value("2006-01-02T15:04:05+07:00", &Kind::Timestamp).unwrap();
        assert_eq!(value.as_str(), Some("2006-01-02T15:04:05+07:00"));

        assert!(convert_value("invalid", &Kind::Timestamp).is_err());
        assert!(convert_value("2006-01-02", &Kind::Timestamp).is_err());
    }

    #[test]
    fn test_unsupported_kinds() {
        assert_eq!(
            convert_value("abc", &Kind::Bytes),
            Err(ConvertError::Unsupported("bytes".into()))
        );
        assert_eq!(
            convert_value("a,b", &Kind::seq(Kind::seq(Kind::Text))),
            Err(ConvertError::Unsupported("list<list<text>>".into()))
        );
    }
}
