//! Timestamp rendering for operator-facing output.

use time::format_description::BorrowedFormatItem;
use time::format_description::well_known::Rfc3339;
use time::macros::{format_description, offset};
use time::{Date, OffsetDateTime, PrimitiveDateTime, Time, UtcOffset};

const IST: UtcOffset = offset!(+5:30);

const IST_FORMAT: &[BorrowedFormatItem<'static>] = format_description!(
    "[day]/[month]/[year], [hour repr:12 padding:none]:[minute]:[second] [period] IST"
);

/// Offset-less timestamps the backends emit; read as UTC.
const NAIVE_FORMATS: [&[BorrowedFormatItem<'static>]; 2] = [
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second][optional [.[subsecond]]]"),
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second][optional [.[subsecond]]]"),
];

const DATE_ONLY: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

/// Render a backend timestamp as `DD/MM/YYYY, H:MM:SS AM IST`.
///
/// `None` or blank input renders as `Never`; anything unparseable as
/// `Invalid Date`.
#[must_use]
pub fn format_ist(raw: Option<&str>) -> String {
    let Some(raw) = raw.map(str::trim).filter(|r| !r.is_empty()) else {
        return "Never".to_owned();
    };
    parse_timestamp(raw)
        .and_then(|at| at.to_offset(IST).format(IST_FORMAT).ok())
        .unwrap_or_else(|| "Invalid Date".to_owned())
}

fn parse_timestamp(raw: &str) -> Option<OffsetDateTime> {
    if let Ok(at) = OffsetDateTime::parse(raw, &Rfc3339) {
        return Some(at);
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|format| PrimitiveDateTime::parse(raw, format).ok())
        .or_else(|| {
            Date::parse(raw, DATE_ONLY)
                .ok()
                .map(|date| PrimitiveDateTime::new(date, Time::MIDNIGHT))
        })
        .map(PrimitiveDateTime::assume_utc)
}

#[cfg(test)]
#[path = "display_test.rs"]
mod tests;
