//! Cache-control directives - parsing and header rendering

use serde::Deserialize;
use thiserror::Error;
use tracing::error;

/// Errors from duration normalization
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DurationError {
    #[error("calendar units (years/months) are not supported in cache durations: {0}")]
    CalendarUnits(String),
    #[error("invalid duration: {0}")]
    Invalid(String),
}

/// Value of a `max-age` / `s-maxage` directive: plain seconds or an
/// ISO-8601 duration string
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum DurationValue {
    Seconds(u64),
    Text(String),
}

/// A cache-control configuration value: either a raw header string
/// passed through unchanged, or a structured set of directives
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum CacheControlDirective {
    Raw(String),
    Directives(CacheDirectives),
}

/// Structured cache-control directives as they appear in the
/// per-MIME-type settings table
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CacheDirectives {
    #[serde(rename = "must-revalidate")]
    pub must_revalidate: Option<bool>,
    #[serde(rename = "no-cache")]
    pub no_cache: Option<bool>,
    #[serde(rename = "no-store")]
    pub no_store: Option<bool>,
    #[serde(rename = "no-transform")]
    pub no_transform: Option<bool>,
    pub public: Option<bool>,
    pub private: Option<bool>,
    #[serde(rename = "proxy-revalidate")]
    pub proxy_revalidate: Option<bool>,
    #[serde(rename = "max-age")]
    pub max_age: Option<DurationValue>,
    #[serde(rename = "s-maxage")]
    pub s_maxage: Option<DurationValue>,
}

/// Render a cache-control directive to a wire-ready header value.
///
/// A raw string is returned unchanged. Structured directives build a
/// comma-separated token list in a fixed order; boolean flags are
/// emitted only when exactly `true`, and a duration that fails to
/// parse is logged and its token omitted.
pub fn render_cache_control(directive: &CacheControlDirective) -> String {
    let d = match directive {
        CacheControlDirective::Raw(s) => return s.clone(),
        CacheControlDirective::Directives(d) => d,
    };

    let mut tokens: Vec<String> = Vec::new();

    let flags = [
        ("must-revalidate", d.must_revalidate),
        ("no-cache", d.no_cache),
        ("no-store", d.no_store),
        ("no-transform", d.no_transform),
        ("public", d.public),
        ("private", d.private),
        ("proxy-revalidate", d.proxy_revalidate),
    ];
    for (name, value) in flags {
        if value == Some(true) {
            tokens.push(name.to_string());
        }
    }

    if let Some(value) = &d.max_age {
        push_duration_token(&mut tokens, "max-age", value);
    }
    if let Some(value) = &d.s_maxage {
        push_duration_token(&mut tokens, "s-maxage", value);
    }

    tokens.join(", ")
}

fn push_duration_token(tokens: &mut Vec<String>, name: &str, value: &DurationValue) {
    match duration_seconds(value) {
        Ok(seconds) => tokens.push(format!("{}=\"{}\"", name, seconds)),
        Err(e) => error!("Could not parse {} directive: {}", name, e),
    }
}

/// Normalize a duration directive value to whole seconds
pub fn duration_seconds(value: &DurationValue) -> Result<u64, DurationError> {
    match value {
        DurationValue::Seconds(seconds) => Ok(*seconds),
        DurationValue::Text(text) => parse_duration_seconds(text),
    }
}

/// Parse a duration string to seconds. A string of digits is taken as
/// seconds directly; anything else must be an ISO-8601 duration
/// (`P[nW][nD][T[nH][nM][nS]]`).
pub fn parse_duration_seconds(input: &str) -> Result<u64, DurationError> {
    if !input.is_empty() && input.bytes().all(|b| b.is_ascii_digit()) {
        return input
            .parse()
            .map_err(|_| DurationError::Invalid(input.to_string()));
    }

    parse_iso8601_seconds(input)
}

/// Convert an ISO-8601 duration to total seconds as
/// `weeks*7*86400 + days*86400 + hours*3600 + minutes*60 + seconds`.
/// Calendar units (years, months) have no fixed length and are
/// rejected rather than silently truncated.
fn parse_iso8601_seconds(input: &str) -> Result<u64, DurationError> {
    let rest = match input.strip_prefix('P') {
        Some(rest) => rest,
        None => return Err(DurationError::Invalid(input.to_string())),
    };

    let (date_part, time_part) = match rest.split_once('T') {
        Some((date, time)) => (date, Some(time)),
        None => (rest, None),
    };

    // "P" and "P1DT" are not valid durations
    if date_part.is_empty() && time_part.is_none() {
        return Err(DurationError::Invalid(input.to_string()));
    }
    if matches!(time_part, Some(t) if t.is_empty()) {
        return Err(DurationError::Invalid(input.to_string()));
    }

    let mut total: u64 = 0;

    for (number, unit) in split_components(date_part, input)? {
        total += match unit {
            'W' => number * 7 * 86_400,
            'D' => number * 86_400,
            'Y' | 'M' => return Err(DurationError::CalendarUnits(input.to_string())),
            _ => return Err(DurationError::Invalid(input.to_string())),
        };
    }

    if let Some(time_part) = time_part {
        for (number, unit) in split_components(time_part, input)? {
            total += match unit {
                'H' => number * 3_600,
                'M' => number * 60,
                'S' => number,
                _ => return Err(DurationError::Invalid(input.to_string())),
            };
        }
    }

    Ok(total)
}

/// Split one duration part into (number, unit-letter) pairs
fn split_components(part: &str, input: &str) -> Result<Vec<(u64, char)>, DurationError> {
    let mut components = Vec::new();
    let mut digits = String::new();

    for ch in part.chars() {
        if ch.is_ascii_digit() {
            digits.push(ch);
        } else if ch.is_ascii_alphabetic() {
            if digits.is_empty() {
                return Err(DurationError::Invalid(input.to_string()));
            }
            let number = digits
                .parse()
                .map_err(|_| DurationError::Invalid(input.to_string()))?;
            components.push((number, ch.to_ascii_uppercase()));
            digits.clear();
        } else {
            return Err(DurationError::Invalid(input.to_string()));
        }
    }

    // trailing digits with no unit letter
    if !digits.is_empty() {
        return Err(DurationError::Invalid(input.to_string()));
    }

    Ok(components)
}
