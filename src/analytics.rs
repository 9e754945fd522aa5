use chrono::{NaiveDateTime, NaiveTime, TimeDelta, Timelike};

use crate::error::ScanError;
use crate::model::{Entry, PRETTY_TIME, Report};
use crate::options::AnalyticsOptions;
use crate::warning::{ScanWarning, WarningCode};

pub const UNCLOSED_DAY: &str = "UnclosedDay";
pub const MISSING_REPORT: &str = "Vacation/Una";

fn since_midnight(time: NaiveDateTime) -> i64 {
    i64::from(time.hour()) * 3600 + i64::from(time.minute()) * 60
}

/// Rounds to the nearest multiple of `step`, halves rounding up.
fn round_to(seconds: i64, step: i64) -> i64 {
    let remainder = seconds.rem_euclid(step);
    if remainder * 2 >= step {
        seconds - remainder + step
    } else {
        seconds - remainder
    }
}

/// Mean time of day of the extracted field, ignoring the date.
pub fn average<F>(entries: &[Entry], extract: F, default: TimeDelta, rounding: TimeDelta) -> TimeDelta
where
    F: Fn(&Entry) -> Option<NaiveDateTime>,
{
    let (total, count) = entries
        .iter()
        .filter_map(extract)
        .fold((0_i64, 0_i64), |(total, count), time| {
            (total + since_midnight(time), count + 1)
        });

    if count == 0 {
        return default;
    }

    let step = rounding.num_seconds().max(1);
    TimeDelta::seconds(round_to(total / count, step))
}

pub fn average_in(entries: &[Entry], options: &AnalyticsOptions) -> TimeDelta {
    average(entries, |entry| entry.in_time, options.default_in, options.rounding)
}

pub fn average_out(entries: &[Entry], options: &AnalyticsOptions) -> TimeDelta {
    average(entries, |entry| entry.out_time, options.default_out, options.rounding)
}

fn clock_on(entry: &Entry, offset: TimeDelta) -> String {
    let midnight = entry
        .date
        .unwrap_or_default()
        .and_time(NaiveTime::MIN);
    (midnight + offset).format(PRETTY_TIME).to_string()
}

/// Completes a half-recorded day with the average for the missing side.
pub fn fix_entry(entry: &Entry, avg_in: TimeDelta, avg_out: TimeDelta) -> Result<String, ScanError> {
    let (arrived, left) = match (entry.in_time, entry.out_time) {
        (None, None) => {
            return Err(ScanError::AmbiguousEntry(
                "both times are empty".to_string(),
            ));
        }
        (Some(_), Some(_)) => {
            return Err(ScanError::AmbiguousEntry(
                "both times are non-empty".to_string(),
            ));
        }
        (Some(in_time), None) => (
            in_time.format(PRETTY_TIME).to_string(),
            clock_on(entry, avg_out),
        ),
        (None, Some(out_time)) => (
            clock_on(entry, avg_in),
            out_time.format(PRETTY_TIME).to_string(),
        ),
    };

    Ok(format!(
        "{}: arrived at {arrived}, left at {left}",
        entry.date_label()
    ))
}

/// Turns reconstructed rows into problem lines and suggested fixes.
pub fn build_report(entries: &[Entry], options: &AnalyticsOptions) -> (Report, Vec<ScanWarning>) {
    let avg_in = average_in(entries, options);
    let avg_out = average_out(entries, options);
    tracing::debug!(
        avg_in_minutes = avg_in.num_minutes(),
        avg_out_minutes = avg_out.num_minutes(),
        "computed averages"
    );

    let mut report = Report::default();
    let mut warnings = Vec::new();

    for (row, entry) in entries.iter().enumerate() {
        if entry.activity.is_empty() {
            continue;
        }

        let date = entry.date_label();
        match entry.activity.as_str() {
            UNCLOSED_DAY => {
                report.problems.push(format!("{date}: Unclosed day"));
                match fix_entry(entry, avg_in, avg_out) {
                    Ok(fix) => report.fixes.push(fix),
                    Err(error) => {
                        tracing::warn!(row, %error, "failed to generate fix text");
                        warnings.push(
                            ScanWarning::new(WarningCode::FixSkipped, error.to_string())
                                .with_row(row),
                        );
                    }
                }
            }
            MISSING_REPORT => report.problems.push(format!("{date}: Missing report")),
            activity => report.problems.push(format!("{date}: {activity}")),
        }
    }

    (report, warnings)
}
