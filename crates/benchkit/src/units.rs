//! Scaled unit formatting and parsing.
//!
//! Quantities are rendered against a [`ScaleTable`]: a base unit, a constant
//! factor, and an ascending list of suffixes. The same tables drive the
//! scanner, so `"10k"` read through [`METRIC`] gives `10_000`.
//!
//! # Example
//!
//! ```
//! use benchkit::units;
//!
//! assert_eq!(units::format_binary(1536.0), "1.50K");
//! assert_eq!(units::format_time_us(2_500_000.0), "2.50s");
//! assert_eq!(units::scan_metric("10k").unwrap(), 10_000);
//! assert_eq!(units::scan_time("2m").unwrap(), 120);
//! ```

use winnow::ModalResult;
use winnow::ascii::{digit1, multispace0};
use winnow::combinator::{opt, preceded};
use winnow::prelude::*;
use winnow::token::take_while;

/// Error type for unit scanning.
#[derive(Debug, thiserror::Error)]
pub enum UnitError {
    #[error("invalid number: {0:?}")]
    InvalidNumber(String),

    #[error("unknown unit: {0:?}")]
    UnknownUnit(String),

    #[error("value out of range: {0:?}")]
    OutOfRange(String),
}

pub type Result<T> = std::result::Result<T, UnitError>;

/// An ordered set of unit suffixes with a constant factor between neighbours.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScaleTable {
    scale: u32,
    base: &'static str,
    units: &'static [&'static str],
}

/// Microseconds, scaling by 1000.
pub const TIME_US: ScaleTable = ScaleTable::new(1000, "us", &["ms", "s"]);

/// Seconds, scaling by 60.
pub const TIME_S: ScaleTable = ScaleTable::new(60, "s", &["m", "h"]);

/// Powers of 1024.
pub const BINARY: ScaleTable = ScaleTable::new(1024, "", &["K", "M", "G", "T", "P"]);

/// Powers of 1000.
pub const METRIC: ScaleTable = ScaleTable::new(1000, "", &["k", "M", "G", "T", "P"]);

impl ScaleTable {
    /// Create a table. `units` must be ordered from smallest to largest.
    pub const fn new(scale: u32, base: &'static str, units: &'static [&'static str]) -> Self {
        Self { scale, base, units }
    }

    /// Factor between two neighbouring units.
    pub const fn scale(&self) -> u32 {
        self.scale
    }

    /// Label of the unscaled unit (may be empty).
    pub const fn base(&self) -> &'static str {
        self.base
    }

    /// Suffixes, smallest first.
    pub const fn units(&self) -> &'static [&'static str] {
        self.units
    }

    /// Multiplier for `unit`, matched case-insensitively.
    ///
    /// The base unit maps to 1 and `units[i]` to `scale^(i + 1)`.
    pub fn factor(&self, unit: &str) -> Option<u64> {
        if unit.eq_ignore_ascii_case(self.base) {
            return Some(1);
        }
        let index = self
            .units
            .iter()
            .position(|u| u.eq_ignore_ascii_case(unit))?;
        u64::from(self.scale).checked_pow(index as u32 + 1)
    }
}

/// Render `value` against `table` with `precision` decimals.
///
/// The value is divided down while it has reached the next unit. A value that
/// would only print as the next unit after rounding (e.g. `1023.999` at two
/// decimals) is stepped as well. Nothing steps earlier than that: `900`
/// through [`BINARY`] renders as `"900.00"`, not `"0.88K"`. The last suffix
/// of a table is a ceiling and is never selected.
pub fn format_units(value: f64, table: &ScaleTable, precision: usize) -> String {
    let scale = f64::from(table.scale);
    let mut amount = value;
    let mut unit = table.base;

    let reachable = &table.units[..table.units.len().saturating_sub(1)];
    for next in reachable {
        if !reaches(amount, scale, precision) {
            break;
        }
        amount /= scale;
        unit = next;
    }

    format!("{amount:.precision$}{unit}")
}

fn reaches(amount: f64, scale: f64, precision: usize) -> bool {
    if amount >= scale {
        return true;
    }
    format!("{amount:.precision$}")
        .parse::<f64>()
        .is_ok_and(|shown| shown >= scale)
}

/// Format a byte count in powers of 1024.
pub fn format_binary(value: f64) -> String {
    format_units(value, &BINARY, 2)
}

/// Format a count in powers of 1000.
pub fn format_metric(value: f64) -> String {
    format_units(value, &METRIC, 2)
}

/// Format a duration given in microseconds.
///
/// Values of a second or more switch to the seconds table.
pub fn format_time_us(value: f64) -> String {
    if value >= 1_000_000.0 {
        format_units(value / 1_000_000.0, &TIME_S, 2)
    } else {
        format_units(value, &TIME_US, 2)
    }
}

/// Format a duration given in seconds, without decimals.
pub fn format_time_s(value: f64) -> String {
    format_units(value, &TIME_S, 0)
}

/// Parse `text` into a count using `table`'s suffixes.
///
/// The text is an unsigned integer, optionally with a fractional part, followed
/// by an optional suffix of at most two characters. Characters past the
/// suffix are ignored.
pub fn scan_units(text: &str, table: &ScaleTable) -> Result<u64> {
    let mut input = text;
    let quantity = quantity(&mut input)
        .map_err(|_| UnitError::InvalidNumber(text.to_string()))?;

    let factor = if quantity.unit.is_empty() {
        1
    } else {
        table
            .factor(quantity.unit)
            .ok_or_else(|| UnitError::UnknownUnit(quantity.unit.to_string()))?
    };

    quantity
        .scaled(factor)
        .ok_or_else(|| UnitError::OutOfRange(text.to_string()))
}

/// Parse a count with a metric suffix (`k`, `M`, `G`, `T`, `P`).
pub fn scan_metric(text: &str) -> Result<u64> {
    scan_units(text, &METRIC)
}

/// Parse a count with a binary suffix (`K`, `M`, `G`, `T`, `P`).
pub fn scan_binary(text: &str) -> Result<u64> {
    scan_units(text, &BINARY)
}

/// Parse a duration in seconds (`s`, `m`, `h`).
pub fn scan_time(text: &str) -> Result<u64> {
    scan_units(text, &TIME_S)
}

struct Quantity<'a> {
    whole: u64,
    fraction: Option<&'a str>,
    unit: &'a str,
}

impl Quantity<'_> {
    /// Digits of the fraction beyond this are dropped.
    const MAX_FRACTION_DIGITS: usize = 18;

    fn scaled(&self, factor: u64) -> Option<u64> {
        let mut total = u128::from(self.whole) * u128::from(factor);
        if let Some(digits) = self.fraction {
            let digits = &digits[..digits.len().min(Self::MAX_FRACTION_DIGITS)];
            let numerator: u128 = digits.parse().ok()?;
            let denominator = 10u128.pow(digits.len() as u32);
            total += numerator * u128::from(factor) / denominator;
        }
        u64::try_from(total).ok()
    }
}

fn quantity<'i>(input: &mut &'i str) -> ModalResult<Quantity<'i>> {
    (
        preceded(multispace0, digit1.try_map(str::parse::<u64>)),
        opt(preceded('.', digit1)),
        preceded(multispace0, take_while(0..=2, |c: char| !c.is_whitespace())),
    )
        .map(|(whole, fraction, unit)| Quantity {
            whole,
            fraction,
            unit,
        })
        .parse_next(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_binary() {
        assert_eq!(format_binary(0.0), "0.00");
        assert_eq!(format_binary(900.0), "900.00");
        assert_eq!(format_binary(1023.0), "1023.00");
        assert_eq!(format_binary(1024.0), "1.00K");
        assert_eq!(format_binary(1536.0), "1.50K");
        assert_eq!(format_binary(3.0 * 1024.0 * 1024.0), "3.00M");
    }

    #[test]
    fn test_format_rounds_forward() {
        assert_eq!(format_binary(1023.999), "1.00K");
        assert_eq!(format_time_s(59.6), "1m");
    }

    #[test]
    fn test_format_metric() {
        assert_eq!(format_metric(999.0), "999.00");
        assert_eq!(format_metric(1000.0), "1.00k");
        assert_eq!(format_metric(999_000.0), "999.00k");
        assert_eq!(format_metric(2_500_000.0), "2.50M");
    }

    #[test]
    fn test_format_stops_before_last_unit() {
        let peta = 1024f64.powi(5);
        assert_eq!(format_binary(peta), "1024.00T");
        assert_eq!(format_time_s(7200.0), "120m");
    }

    #[test]
    fn test_format_time_us() {
        assert_eq!(format_time_us(250.0), "250.00us");
        assert_eq!(format_time_us(1500.0), "1.50ms");
        assert_eq!(format_time_us(1_000_000.0), "1.00s");
        assert_eq!(format_time_us(90_000_000.0), "1.50m");
    }

    #[test]
    fn test_format_time_s() {
        assert_eq!(format_time_s(30.0), "30s");
        assert_eq!(format_time_s(120.0), "2m");
    }

    #[test]
    fn test_scan_metric() {
        assert_eq!(scan_metric("10").unwrap(), 10);
        assert_eq!(scan_metric("10k").unwrap(), 10_000);
        assert_eq!(scan_metric("10K").unwrap(), 10_000);
        assert_eq!(scan_metric("3M").unwrap(), 3_000_000);
        assert_eq!(scan_metric("1G").unwrap(), 1_000_000_000);
        assert_eq!(scan_metric(" 5 k").unwrap(), 5_000);
        assert_eq!(scan_metric("010k").unwrap(), 10_000);
    }

    #[test]
    fn test_scan_fraction() {
        assert_eq!(scan_metric("1.5k").unwrap(), 1_500);
        assert_eq!(scan_metric("999.00k").unwrap(), 999_000);
        assert_eq!(scan_binary("1.50K").unwrap(), 1_536);
        assert_eq!(scan_metric("2.9").unwrap(), 2);
    }

    #[test]
    fn test_scan_time() {
        assert_eq!(scan_time("30").unwrap(), 30);
        assert_eq!(scan_time("30s").unwrap(), 30);
        assert_eq!(scan_time("30S").unwrap(), 30);
        assert_eq!(scan_time("2m").unwrap(), 120);
        assert_eq!(scan_time("1h").unwrap(), 3600);
    }

    #[test]
    fn test_scan_unknown_unit() {
        assert!(matches!(scan_metric("10x"), Err(UnitError::UnknownUnit(u)) if u == "x"));
        assert!(matches!(scan_metric("10kb"), Err(UnitError::UnknownUnit(_))));
        assert!(matches!(scan_time("10ms"), Err(UnitError::UnknownUnit(_))));
        assert!(matches!(scan_metric("10."), Err(UnitError::UnknownUnit(_))));
    }

    #[test]
    fn test_scan_ignores_trailing_text() {
        assert_eq!(scan_metric("10k requests").unwrap(), 10_000);
    }

    #[test]
    fn test_scan_invalid_number() {
        assert!(matches!(scan_metric(""), Err(UnitError::InvalidNumber(_))));
        assert!(matches!(scan_metric("k10"), Err(UnitError::InvalidNumber(_))));
        assert!(matches!(scan_metric("-1"), Err(UnitError::InvalidNumber(_))));
        assert!(matches!(
            scan_metric("99999999999999999999"),
            Err(UnitError::InvalidNumber(_))
        ));
    }

    #[test]
    fn test_scan_out_of_range() {
        assert!(matches!(scan_metric("20000P"), Err(UnitError::OutOfRange(_))));
    }

    #[test]
    fn test_factor() {
        assert_eq!(METRIC.factor(""), Some(1));
        assert_eq!(METRIC.factor("k"), Some(1000));
        assert_eq!(METRIC.factor("P"), Some(1_000_000_000_000_000));
        assert_eq!(TIME_S.factor("H"), Some(3600));
        assert_eq!(TIME_S.factor("d"), None);
    }

    #[test]
    fn test_scan_formatted_metric() {
        for value in [0.0, 7.0, 999.0, 1000.0, 123_456.0, 9_999_999.0, 4.2e12] {
            let text = format_metric(value);
            let scanned = scan_metric(&text).unwrap() as f64;
            let step = if value >= 1000.0 { value / 100.0 } else { 1.0 };
            assert!(
                (scanned - value).abs() <= step,
                "{value} -> {text} -> {scanned}"
            );
        }
    }
}
