//! Display formatting shared by the renderers.

use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime, PrimitiveDateTime};

/// Group digits with a comma every three places, like `toLocaleString("en-US")`.
pub fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Count tokens produced by splitting on every whitespace character.
///
/// Runs of whitespace yield empty tokens and the empty string counts as one word.
pub fn word_count(text: &str) -> usize {
    text.split(char::is_whitespace).count()
}

/// Render an ISO-8601 publish date as `M/D/YYYY`.
///
/// Accepts RFC 3339 timestamps, naive `YYYY-MM-DDTHH:MM:SS[.frac]` timestamps and bare
/// dates. Anything else is returned unchanged; a missing date reads "Unknown date".
pub fn publish_date(raw: Option<&str>) -> String {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return "Unknown date".to_string();
    };
    match parse_date(raw) {
        Some(date) => format!("{}/{}/{}", u8::from(date.month()), date.day(), date.year()),
        None => raw.to_string(),
    }
}

fn parse_date(raw: &str) -> Option<Date> {
    if let Ok(ts) = OffsetDateTime::parse(raw, &Rfc3339) {
        return Some(ts.date());
    }
    let naive = format_description!(
        "[year]-[month]-[day]T[hour]:[minute]:[second][optional [.[subsecond]]]"
    );
    if let Ok(ts) = PrimitiveDateTime::parse(raw, &naive) {
        return Some(ts.date());
    }
    let plain = format_description!("[year]-[month]-[day]");
    Date::parse(raw, &plain).ok()
}
