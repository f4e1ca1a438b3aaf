//! Date helper functions

use chrono::{DateTime, Locale, TimeZone, Utc};
use chrono_tz::Tz;

/// Format a date using a Moment.js-compatible format string, with month and
/// weekday names in `locale`
///
/// # Examples
/// ```ignore
/// format_date(&date, "DD MMM YYYY", Locale::pt_BR) // -> "25 mar 2021"
/// ```
pub fn format_date<Z: TimeZone>(date: &DateTime<Z>, format: &str, locale: Locale) -> String
where
    Z::Offset: std::fmt::Display,
{
    let chrono_format = moment_to_chrono_format(format);
    date.format_localized(&chrono_format, locale).to_string()
}

/// Format an optional publication date in the configured zone.
/// A missing date renders as an empty string.
pub fn format_publication_date(
    date: Option<&DateTime<Utc>>,
    format: &str,
    locale: Locale,
    zone: Tz,
) -> String {
    date.map(|d| format_date(&d.with_timezone(&zone), format, locale))
        .unwrap_or_default()
}

/// Format a date in ISO 8601 / XML format
pub fn date_xml<Z: TimeZone>(date: &DateTime<Z>) -> String
where
    Z::Offset: std::fmt::Display,
{
    date.format("%Y-%m-%dT%H:%M:%S%.3f%:z").to_string()
}

/// Map a language tag such as `pt-BR` to a chrono locale, defaulting to `en_US`
pub fn locale_for(language: &str) -> Locale {
    match language.replace('-', "_").to_ascii_lowercase().as_str() {
        "pt_br" | "pt" => Locale::pt_BR,
        "pt_pt" => Locale::pt_PT,
        "en_gb" => Locale::en_GB,
        "es" | "es_es" => Locale::es_ES,
        "fr" | "fr_fr" => Locale::fr_FR,
        "de" | "de_de" => Locale::de_DE,
        "it" | "it_it" => Locale::it_IT,
        "ja" | "ja_jp" => Locale::ja_JP,
        "zh" | "zh_cn" => Locale::zh_CN,
        _ => Locale::en_US,
    }
}

/// Parse an IANA zone name; empty or unknown names fall back to UTC
pub fn timezone_for(name: &str) -> Tz {
    if name.trim().is_empty() {
        return Tz::UTC;
    }
    name.parse::<Tz>().unwrap_or_else(|_| {
        tracing::warn!("Unknown timezone {:?}, using UTC", name);
        Tz::UTC
    })
}

/// Convert Moment.js format to chrono format
fn moment_to_chrono_format(format: &str) -> String {
    // Longest patterns first within each unit
    let replacements = [
        ("YYYY", "%Y"),
        ("YY", "%y"),
        ("MMMM", "%B"),
        ("MMM", "%b"),
        ("MM", "%m"),
        ("DDDD", "%j"),
        ("DD", "%d"),
        ("HH", "%H"),
        ("hh", "%I"),
        ("mm", "%M"),
        ("ss", "%S"),
        ("dddd", "%A"),
        ("ddd", "%a"),
        ("ZZ", "%z"),
        ("SSS", "%3f"),
    ];

    let mut result = format.to_string();

    for (from, to) in replacements {
        result = result.replace(from, to);
    }

    result
}
