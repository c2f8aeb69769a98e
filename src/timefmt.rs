// SPDX-License-Identifier: MPL-2.0

//! Spanish date and time labels.

use crate::config::CAMPUS_UTC_OFFSET_SECS;
use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, Utc, Weekday};

pub const MONTHS: [&str; 12] = [
    "enero",
    "febrero",
    "marzo",
    "abril",
    "mayo",
    "junio",
    "julio",
    "agosto",
    "septiembre",
    "octubre",
    "noviembre",
    "diciembre",
];

pub fn campus_offset() -> FixedOffset {
    FixedOffset::east_opt(CAMPUS_UTC_OFFSET_SECS).expect("campus offset is within a day")
}

/// Calendar day of an instant, on campus.
pub fn campus_date(at: &DateTime<Utc>) -> NaiveDate {
    at.with_timezone(&campus_offset()).date_naive()
}

pub fn today() -> NaiveDate {
    campus_date(&Utc::now())
}

pub fn month_name(month: u32) -> &'static str {
    MONTHS[(month.clamp(1, 12) - 1) as usize]
}

pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Lunes",
        Weekday::Tue => "Martes",
        Weekday::Wed => "Miércoles",
        Weekday::Thu => "Jueves",
        Weekday::Fri => "Viernes",
        Weekday::Sat => "Sábado",
        Weekday::Sun => "Domingo",
    }
}

/// "Octubre 2026"
pub fn month_label(day: NaiveDate) -> String {
    let name = month_name(day.month());
    let mut chars = name.chars();
    let capitalized: String = match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    };
    format!("{} {}", capitalized, day.year())
}

/// "15 de agosto"
pub fn day_label(day: NaiveDate) -> String {
    format!("{} de {}", day.day(), month_name(day.month()))
}

/// Post timestamp relative to `now`: minutes for the last hour, hours for
/// the last day, then the calendar day. Both are rounded up.
pub fn relative_to(at: Option<&DateTime<Utc>>, now: DateTime<Utc>) -> String {
    let Some(at) = at else {
        return "hace un momento".to_string();
    };

    let millis = (now - *at).num_milliseconds().unsigned_abs();
    let minutes = millis.div_ceil(60_000);
    let hours = millis.div_ceil(3_600_000);

    if minutes == 0 {
        "hace un momento".to_string()
    } else if minutes < 60 {
        format!("hace {} min", minutes)
    } else if hours < 24 {
        format!("hace {} h", hours)
    } else {
        day_label(campus_date(at))
    }
}

pub fn relative(at: Option<&DateTime<Utc>>) -> String {
    relative_to(at, Utc::now())
}
