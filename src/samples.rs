use crate::models::{RawSample, Sample};
use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use thiserror::Error;

const OFFSET_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S %z", "%Y-%m-%d %H:%M:%S%.f %z"];
const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SampleError {
    #[error("sample {index}: value {token:?} is not a number")]
    InvalidValue { index: usize, token: String },
    #[error("sample {index}: value has no timestamp")]
    MissingTimestamp { index: usize },
    #[error("sample {index}: timestamp {token:?} is not a recognised date")]
    InvalidTimestamp { index: usize, token: String },
    #[error("date {0:?} is not a YYYY-MM-DD calendar date")]
    InvalidDate(String),
}

/// Pairs every value token with the timestamp token at the same position,
/// then drops pairs whose value is blank.
///
/// Blank values show up when a new day starts before any reading was
/// recorded. A present value opposite a blank or missing timestamp is an
/// error, as is a value that is not a number.
pub fn normalize(raw: &RawSample) -> Result<Vec<Sample>, SampleError> {
    let mut timestamps = raw.timestamps.split('\n');
    let mut samples = Vec::new();

    for (index, token) in raw.values.split('\n').enumerate() {
        let timestamp = timestamps.next().map(str::trim);
        let token = token.trim();
        if token.is_empty() {
            continue;
        }

        let value = parse_value(token).ok_or_else(|| SampleError::InvalidValue {
            index,
            token: token.to_string(),
        })?;
        let stamp = timestamp
            .filter(|stamp| !stamp.is_empty())
            .ok_or(SampleError::MissingTimestamp { index })?;
        let parsed = parse_timestamp(stamp).ok_or_else(|| SampleError::InvalidTimestamp {
            index,
            token: stamp.to_string(),
        })?;

        samples.push(Sample {
            value,
            timestamp: to_iso(parsed),
        });
    }

    Ok(samples)
}

/// The device's calendar date at midnight UTC.
pub fn anchor_date(device_date: &str) -> Result<DateTime<Utc>, SampleError> {
    let trimmed = device_date.trim();
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|midnight| midnight.and_utc())
        .ok_or_else(|| SampleError::InvalidDate(trimmed.to_string()))
}

pub fn to_iso(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}

// Decimal readings are truncated toward zero.
fn parse_value(token: &str) -> Option<i64> {
    if let Ok(value) = token.parse::<i64>() {
        return Some(value);
    }

    token
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite() && value.abs() < i64::MAX as f64)
        .map(|value| value.trunc() as i64)
}

fn parse_timestamp(token: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(token) {
        return Some(parsed.with_timezone(&Utc));
    }

    for format in OFFSET_FORMATS {
        if let Ok(parsed) = DateTime::parse_from_str(token, format) {
            return Some(parsed.with_timezone(&Utc));
        }
    }

    for format in NAIVE_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(token, format) {
            return Some(parsed.and_utc());
        }
    }

    anchor_date(token).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(values: &str, timestamps: &str) -> RawSample {
        RawSample {
            values: values.to_string(),
            timestamps: timestamps.to_string(),
        }
    }

    #[test]
    fn normalize_keeps_order_and_converts_to_utc() {
        let samples = normalize(&raw(
            "61\n72\n0",
            "2021-06-01T08:00:00+02:00\n2021-06-01T09:30:00Z\n2021-06-01 10:00:00",
        ))
        .unwrap();

        assert_eq!(
            samples,
            vec![
                Sample { value: 61, timestamp: "2021-06-01T06:00:00.000Z".into() },
                Sample { value: 72, timestamp: "2021-06-01T09:30:00.000Z".into() },
                Sample { value: 0, timestamp: "2021-06-01T10:00:00.000Z".into() },
            ]
        );
    }

    #[test]
    fn normalize_drops_blank_values_without_shifting_timestamps() {
        let samples = normalize(&raw(
            "3\n\n5",
            "2021-06-01T01:00:00Z\n2021-06-01T02:00:00Z\n2021-06-01T03:00:00Z",
        ))
        .unwrap();

        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].value, 3);
        assert_eq!(samples[0].timestamp, "2021-06-01T01:00:00.000Z");
        assert_eq!(samples[1].value, 5);
        assert_eq!(samples[1].timestamp, "2021-06-01T03:00:00.000Z");
    }

    #[test]
    fn normalize_handles_empty_export() {
        assert!(normalize(&raw("", "")).unwrap().is_empty());
        assert!(normalize(&raw("\n", "\n")).unwrap().is_empty());
    }

    #[test]
    fn normalize_accepts_offset_without_colon_and_crlf() {
        let samples = normalize(&raw("88\r\n", "2021-06-01 12:00:00 +0200\r\n")).unwrap();
        assert_eq!(samples, vec![Sample { value: 88, timestamp: "2021-06-01T10:00:00.000Z".into() }]);
    }

    #[test]
    fn normalize_truncates_decimal_values() {
        let samples = normalize(&raw("12.9", "2021-06-01")).unwrap();
        assert_eq!(samples[0].value, 12);
        assert_eq!(samples[0].timestamp, "2021-06-01T00:00:00.000Z");
    }

    #[test]
    fn normalize_rejects_non_numeric_value() {
        let err = normalize(&raw("70\nabc", "2021-06-01T01:00:00Z\n2021-06-01T02:00:00Z")).unwrap_err();
        assert_eq!(err, SampleError::InvalidValue { index: 1, token: "abc".into() });

        let err = normalize(&raw("NaN", "2021-06-01T01:00:00Z")).unwrap_err();
        assert!(matches!(err, SampleError::InvalidValue { index: 0, .. }));
    }

    #[test]
    fn normalize_rejects_value_without_timestamp() {
        let err = normalize(&raw("1\n2", "2021-06-01T01:00:00Z\n")).unwrap_err();
        assert_eq!(err, SampleError::MissingTimestamp { index: 1 });

        let err = normalize(&raw("1\n2\n3", "2021-06-01T01:00:00Z")).unwrap_err();
        assert_eq!(err, SampleError::MissingTimestamp { index: 1 });
    }

    #[test]
    fn normalize_rejects_unparsable_timestamp() {
        let err = normalize(&raw("1", "yesterday")).unwrap_err();
        assert_eq!(err, SampleError::InvalidTimestamp { index: 0, token: "yesterday".into() });
    }

    #[test]
    fn normalize_ignores_surplus_timestamps() {
        let samples = normalize(&raw("4", "2021-06-01T01:00:00Z\n2021-06-01T02:00:00Z")).unwrap();
        assert_eq!(samples.len(), 1);
    }

    #[test]
    fn anchor_date_is_utc_midnight() {
        let anchored = anchor_date("2021-06-01").unwrap();
        assert_eq!(to_iso(anchored), "2021-06-01T00:00:00.000Z");
    }

    #[test]
    fn anchor_date_rejects_garbage() {
        assert_eq!(anchor_date("06/01/2021"), Err(SampleError::InvalidDate("06/01/2021".into())));
        assert!(anchor_date("2021-02-30").is_err());
    }
}
