use chrono::{NaiveDate, NaiveDateTime};

use crate::error::ScanError;

pub(crate) const DATE_FORMAT: &str = "%d%m%Y";
const DOTTED_TIME_FORMAT: &str = "%d%m%Y%H.%M";
const COMPACT_TIME_FORMAT: &str = "%d%m%Y%H%M";

fn concat(parts: [Option<&str>; 3]) -> Option<String> {
    let [a, b, c] = parts;
    Some(format!("{}{}{}", a?, b?, c?))
}

/// Reduces the OCR layouts of a `dd?mm?yyyy` date to `ddmmyyyy`.
fn normalize_date(text: &str) -> Result<String, ScanError> {
    let unrecognized = || ScanError::UnrecognizedDateFormat(text.to_string());

    match text.len() {
        9 => concat([text.get(..2), text.get(2..4), text.get(5..)]).ok_or_else(unrecognized),
        10 => concat([text.get(..2), text.get(3..5), text.get(6..)]).ok_or_else(unrecognized),
        // A day of "1" is sometimes read twice, leaving a stray separator.
        11 => {
            let undup = text.replacen("1/", "1", 1);
            if undup.len() == 10 {
                normalize_date(&undup)
            } else {
                Err(unrecognized())
            }
        }
        _ => Err(unrecognized()),
    }
}

pub fn parse_date(text: &str) -> Result<NaiveDate, ScanError> {
    let clean = normalize_date(text)?;
    NaiveDate::parse_from_str(&clean, DATE_FORMAT).map_err(|source| ScanError::DateParse {
        text: text.to_string(),
        source,
    })
}

/// Parses an `HH.MM` or `HHMM` cell against a `ddmmyyyy` date string.
pub fn parse_time(date: &str, time: &str) -> Result<NaiveDateTime, ScanError> {
    let joined = format!("{date}{time}");
    NaiveDateTime::parse_from_str(&joined, DOTTED_TIME_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(&joined, COMPACT_TIME_FORMAT))
        .map_err(|_| ScanError::TimeParseFailure {
            date: date.to_string(),
            text: time.to_string(),
        })
}

pub(crate) fn format_date_key(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}
