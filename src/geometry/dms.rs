//! Degrees/minutes/seconds parsing and formatting
//!
//! Parsing is lenient about layout: signed decimal degrees, `d m s` or `d m`
//! with any separators (`3° 37′ 09″W`, `3:37:09 W`), and the fixed-width
//! `dddmmss` form (`0033709W`) are all accepted. A leading `-` or a trailing
//! `S`/`W` makes the value negative.

use regex::Regex;
use std::str::FromStr;
use std::sync::LazyLock;

use crate::error::{GeoError, Result};

static SEPARATORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^0-9.,]+").expect("static regex"));
static COMPASS_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)[NSEW]$").expect("static regex"));
static FIXED_WIDTH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{7}$").expect("static regex"));

/// Output layout for [`to_dms`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DmsFormat {
    /// Decimal degrees, `ddd.dddd°`
    D,
    /// Degrees and decimal minutes, `ddd°mm.mm′`
    Dm,
    /// Degrees, minutes and seconds, `ddd°mm′ss″`
    #[default]
    Dms,
}

impl DmsFormat {
    fn default_decimals(self) -> usize {
        match self {
            DmsFormat::D => 4,
            DmsFormat::Dm => 2,
            DmsFormat::Dms => 0,
        }
    }
}

impl FromStr for DmsFormat {
    type Err = GeoError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "d" => Ok(DmsFormat::D),
            "dm" => Ok(DmsFormat::Dm),
            "dms" => Ok(DmsFormat::Dms),
            other => Err(GeoError::InvalidInput(format!(
                "Unknown DMS format '{}', expected d, dm or dms",
                other
            ))),
        }
    }
}

/// Parse degrees, or degrees/minutes/seconds, into decimal degrees
pub fn parse_dms(input: &str) -> Result<f64> {
    let trimmed = input.trim();
    let invalid = || GeoError::InvalidInput(format!("Cannot parse '{}' as an angle", input));

    if let Ok(value) = trimmed.parse::<f64>() {
        return if value.is_finite() {
            Ok(value)
        } else {
            Err(invalid())
        };
    }

    let body = trimmed.strip_prefix('-').unwrap_or(trimmed);
    let body = COMPASS_SUFFIX.replace(body, "");
    let parts: Vec<&str> = SEPARATORS
        .split(&body)
        .filter(|part| !part.is_empty())
        .collect();

    let number = |s: &str| s.parse::<f64>().map_err(|_| invalid());

    let degrees = match *parts.as_slice() {
        [d, m, s] => number(d)? + number(m)? / 60.0 + number(s)? / 3600.0,
        [d, m] => number(d)? + number(m)? / 60.0,
        [d] => {
            let has_ns = trimmed.contains(['N', 'S', 'n', 's']);
            let digits = if has_ns {
                format!("0{}", d)
            } else {
                d.to_string()
            };
            if FIXED_WIDTH.is_match(&digits) {
                number(&digits[0..3])? + number(&digits[3..5])? / 60.0 + number(&digits[5..])? / 3600.0
            } else {
                number(d)?
            }
        }
        _ => return Err(invalid()),
    };

    let negative = trimmed.starts_with('-') || trimmed.ends_with(['S', 'W', 's', 'w']);
    Ok(if negative { -degrees } else { degrees })
}

fn round_to(value: f64, dp: usize) -> f64 {
    let factor = 10f64.powi(dp as i32);
    (value * factor).round() / factor
}

/// Left-pad the integer part with zeros up to `width` digits
fn pad(text: String, value: f64, width: usize) -> String {
    let mut padded = text;
    let mut limit = 10f64.powi(width as i32 - 1);
    while limit >= 10.0 {
        if value < limit {
            padded.insert(0, '0');
        }
        limit /= 10.0;
    }
    padded
}

/// Format decimal degrees as an unsigned deg/min/sec string
///
/// `dp` defaults to 4 for [`DmsFormat::D`], 2 for [`DmsFormat::Dm`] and 0
/// for [`DmsFormat::Dms`]. Degrees are zero-padded to three digits.
pub fn to_dms(deg: f64, format: DmsFormat, dp: Option<usize>) -> String {
    if deg.is_nan() {
        return "NaN".to_string();
    }
    let dp = dp.unwrap_or_else(|| format.default_decimals());
    let deg = deg.abs();

    match format {
        DmsFormat::D => {
            let d = round_to(deg, dp);
            format!("{}\u{00B0}", pad(format!("{:.*}", dp, d), d, 3))
        }
        DmsFormat::Dm => {
            let min = round_to(deg * 60.0, dp);
            let d = (min / 60.0).floor();
            let m = round_to(min % 60.0, dp);
            format!(
                "{}\u{00B0}{}\u{2032}",
                pad(format!("{}", d as u64), d, 3),
                pad(format!("{:.*}", dp, m), m, 2)
            )
        }
        DmsFormat::Dms => {
            let sec = round_to(deg * 3600.0, dp);
            let d = (sec / 3600.0).floor();
            let m = (sec / 60.0).floor() % 60.0;
            let s = round_to(sec % 60.0, dp);
            format!(
                "{}\u{00B0}{}\u{2032}{}\u{2033}",
                pad(format!("{}", d as u64), d, 3),
                pad(format!("{}", m as u64), m, 2),
                pad(format!("{:.*}", dp, s), s, 2)
            )
        }
    }
}

/// Format a latitude with an N/S suffix
pub fn to_lat(deg: f64, format: DmsFormat, dp: Option<usize>) -> String {
    let text = to_dms(deg, format, dp);
    if deg.is_nan() {
        return text;
    }
    // latitudes never need the third degree digit
    let trimmed = text.strip_prefix('0').unwrap_or(&text);
    format!("{}{}", trimmed, if deg < 0.0 { 'S' } else { 'N' })
}

/// Format a longitude with an E/W suffix
pub fn to_lon(deg: f64, format: DmsFormat, dp: Option<usize>) -> String {
    let text = to_dms(deg, format, dp);
    if deg.is_nan() {
        return text;
    }
    format!("{}{}", text, if deg < 0.0 { 'W' } else { 'E' })
}

/// Format a compass bearing, normalized to 0°..360°
pub fn to_bearing(deg: f64, format: DmsFormat, dp: Option<usize>) -> String {
    let normalized = (deg + 360.0) % 360.0;
    to_dms(normalized, format, dp).replacen("360", "000", 1)
}
