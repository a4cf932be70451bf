use num_format::{Locale, ToFormattedString};
use rust_decimal::{prelude::ToPrimitive, Decimal};

/// Per-share dividends are often fractions of a cent, so values keep four
/// decimal places.
pub fn round_to_decimals(input: Decimal) -> Decimal {
    input.round_dp(4)
}

/// Brazilian formatting: `.` groups thousands, `,` separates decimals.
pub fn format_brl(amount: Decimal) -> String {
    let rounded = round_to_decimals(amount);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    let abs = rounded.abs();
    let units = abs.trunc().to_i64().unwrap_or(0);
    let fraction = ((abs.fract() * Decimal::from(10_000)).round()).to_i64().unwrap_or(0);
    format!(
        "R$ {sign}{},{fraction:04}",
        units.to_formatted_string(&Locale::de)
    )
}
