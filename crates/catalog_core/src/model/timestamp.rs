//! Timestamp storage and wire formats.
//!
//! Persisted as integer epoch microseconds; exposed on the wire as
//! `YYYY-MM-DDTHH:MM:SS.ffffffZ`.

use chrono::{DateTime, NaiveDateTime, Utc};

/// Wire format used for every exposed timestamp.
pub const WIRE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6fZ";

/// Formats a timestamp using [`WIRE_FORMAT`].
pub fn format_wire(value: &DateTime<Utc>) -> String {
    value.format(WIRE_FORMAT).to_string()
}

/// Parses a client-supplied timestamp.
///
/// Accepts RFC 3339 (`2016-09-01T15:45:55.322421Z`, `...+00:00`) and the
/// space-separated form `2016-09-01 15:45:55.322421+00:00`.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let trimmed = value.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(parsed.with_timezone(&Utc));
    }
    if let Ok(parsed) = DateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S%.f%:z") {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.fZ")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Converts a timestamp to its persisted representation.
pub fn to_micros(value: &DateTime<Utc>) -> i64 {
    value.timestamp_micros()
}

/// Converts a persisted value back to a timestamp.
pub fn from_micros(value: i64) -> Option<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp_micros(value)
}

/// Serde adapter for `DateTime<Utc>` fields in wire format.
pub mod wire {
    use super::{format_wire, parse_timestamp};
    use chrono::{DateTime, Utc};
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_wire(value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_timestamp(&raw).ok_or_else(|| D::Error::custom(format!("invalid timestamp `{raw}`")))
    }
}

/// Serde adapter for `Option<DateTime<Utc>>` fields in wire format.
pub mod wire_option {
    use super::{format_wire, parse_timestamp};
    use chrono::{DateTime, Utc};
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        value: &Option<DateTime<Utc>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(value) => serializer.serialize_str(&format_wire(value)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            Some(raw) => parse_timestamp(&raw)
                .map(Some)
                .ok_or_else(|| D::Error::custom(format!("invalid timestamp `{raw}`"))),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{format_wire, from_micros, parse_timestamp, to_micros};
    use chrono::{TimeZone, Utc};

    #[test]
    fn wire_format_keeps_six_fraction_digits() {
        let value = Utc.with_ymd_and_hms(2016, 9, 1, 15, 45, 55).unwrap();
        assert_eq!(format_wire(&value), "2016-09-01T15:45:55.000000Z");
    }

    #[test]
    fn parses_wire_rfc3339_and_space_separated_forms() {
        let expected = from_micros(1_472_744_755_322_421).unwrap();
        assert_eq!(parse_timestamp("2016-09-01T15:45:55.322421Z"), Some(expected));
        assert_eq!(
            parse_timestamp("2016-09-01T15:45:55.322421+00:00"),
            Some(expected)
        );
        assert_eq!(
            parse_timestamp("2016-09-01 15:45:55.322421+00:00"),
            Some(expected)
        );
        assert_eq!(parse_timestamp("yesterday"), None);
    }

    #[test]
    fn micros_preserve_sub_second_precision() {
        let value = parse_timestamp("2020-02-29T23:59:59.999999Z").unwrap();
        assert_eq!(from_micros(to_micros(&value)), Some(value));
    }
}
