//! Human-readable byte sizes.
//!
//! Rendering always uses binary prefixes (KiB, MiB, ...). Parsing accepts
//! both SI (`KB` = 1000) and binary (`KiB` = 1024) units.

use humansize::{BINARY, FormatSizeOptions};

use crate::error::SizeParseError;

/// Default large-file threshold: 1 MiB.
pub const DEFAULT_THRESHOLD: u64 = 1024 * 1024;

const KIB: u64 = 1024;

/// Format a byte count for display.
///
/// Counts under 1 KiB are printed as whole bytes (`"100 B"`); anything larger
/// uses the biggest binary unit that keeps the value at or above 1, with two
/// decimals (`"1.00 MiB"`).
pub fn format_size(bytes: u64) -> String {
    if bytes < KIB {
        return format!("{bytes} B");
    }
    let options = FormatSizeOptions::from(BINARY)
        .decimal_places(2)
        .decimal_zeroes(2);
    humansize::format_size(bytes, options)
}

/// Parse a size string such as `"512"`, `"10KB"`, `"1 MiB"` or `"1.5 gib"`.
///
/// Units are case-insensitive. `K`, `M`, `G` and `T` on their own are binary
/// shorthands. A bare number is a byte count. Fractional results are
/// truncated to whole bytes.
pub fn parse_size(input: &str) -> Result<u64, SizeParseError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(SizeParseError::Empty);
    }

    let split = trimmed
        .find(|c: char| c.is_alphabetic() || c.is_whitespace())
        .unwrap_or(trimmed.len());
    let (number, unit) = trimmed.split_at(split);
    let unit = unit.trim_start();

    let multiplier = unit_multiplier(unit).ok_or_else(|| SizeParseError::UnknownUnit {
        input: input.to_string(),
        unit: unit.to_string(),
    })?;

    let invalid_number = || SizeParseError::InvalidNumber {
        input: input.to_string(),
        number: number.to_string(),
    };

    if number.is_empty() || !number.chars().all(|c| c.is_ascii_digit() || c == '.') {
        return Err(invalid_number());
    }

    if !number.contains('.') {
        let whole: u64 = number.parse().map_err(|_| SizeParseError::Overflow {
            input: input.to_string(),
        })?;
        return whole
            .checked_mul(multiplier)
            .ok_or_else(|| SizeParseError::Overflow {
                input: input.to_string(),
            });
    }

    let value: f64 = number.parse().map_err(|_| invalid_number())?;
    let bytes = value * multiplier as f64;
    if bytes >= u64::MAX as f64 {
        return Err(SizeParseError::Overflow {
            input: input.to_string(),
        });
    }
    Ok(bytes as u64)
}

/// Bytes per unit, or `None` for an unknown unit.
fn unit_multiplier(unit: &str) -> Option<u64> {
    let multiplier = match unit.to_ascii_uppercase().as_str() {
        "" | "B" => 1,
        "KB" => 1000,
        "MB" => 1000u64.pow(2),
        "GB" => 1000u64.pow(3),
        "TB" => 1000u64.pow(4),
        "PB" => 1000u64.pow(5),
        "K" | "KIB" => KIB,
        "M" | "MIB" => KIB.pow(2),
        "G" | "GIB" => KIB.pow(3),
        "T" | "TIB" => KIB.pow(4),
        "PIB" => KIB.pow(5),
        _ => return None,
    };
    Some(multiplier)
}
