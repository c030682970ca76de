//! `DD.MM.YYYY` date format used on the wire and by the lookup service

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serializer};

/// Wire format for release dates
pub const FORMAT: &str = "%d.%m.%Y";

/// Parse a `DD.MM.YYYY` date
pub fn parse(value: &str) -> crate::Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), FORMAT).map_err(|e| {
        crate::Error::InvalidInput(format!(
            "invalid date '{}' (expected DD.MM.YYYY): {}",
            value, e
        ))
    })
}

/// Render a date as `DD.MM.YYYY`
pub fn format(date: &NaiveDate) -> String {
    date.format(FORMAT).to_string()
}

pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format(date))
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
    let s = String::deserialize(deserializer)?;
    parse(&s).map_err(serde::de::Error::custom)
}

/// Same format for `Option<NaiveDate>` fields
pub mod option {
    use super::*;

    pub fn serialize<S: Serializer>(
        date: &Option<NaiveDate>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match date {
            Some(d) => serializer.serialize_some(&format(d)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveDate>, D::Error> {
        let s: Option<String> = Option::deserialize(deserializer)?;
        s.map(|s| parse(&s).map_err(serde::de::Error::custom))
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_format() {
        let date = parse("16.07.2006").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2006, 7, 16).unwrap());
        assert_eq!(format(&date), "16.07.2006");
    }

    #[test]
    fn test_parse_rejects_iso() {
        let err = parse("2006-07-16").unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::InvalidArgument);
    }
}
