use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use crate::error::{InspectorError, InspectorResult};

pub fn decimal_to_f64(value: Decimal, field_name: &str) -> InspectorResult<f64> {
    value.to_f64().ok_or_else(|| {
        InspectorError::InvalidData(format!("{field_name} cannot be represented as f64"))
    })
}

/// Extracts a price from free-form model text such as `"17.020,5"`,
/// `"17020.50 pts"` or `"N/A"`.
///
/// The first run of digits (with `.`/`,` separators and an optional leading
/// minus) is taken. When both separators occur, the last one is the decimal
/// mark. A separator that repeats (`"1.234.567"`) groups thousands. A lone
/// separator followed by exactly three digits groups thousands too, unless the
/// integer part is `0` (`"17.020"` and `"17,020"` read 17020, `"0.125"` stays
/// fractional).
#[must_use]
pub fn parse_price_text(text: &str) -> Option<Decimal> {
    let start = text.find(|c: char| c.is_ascii_digit())?;
    let negative = text[..start].ends_with('-');
    let token: String = text[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.' || *c == ',')
        .collect();
    let token = token.trim_end_matches(['.', ',']);

    let normalized = match (token.rfind('.'), token.rfind(',')) {
        (Some(dot), Some(comma)) if comma > dot => token.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => token.replace(',', ""),
        (Some(_), None) => normalize_single_separator(token, '.'),
        (None, Some(_)) => normalize_single_separator(token, ','),
        (None, None) => token.to_owned(),
    };

    let value = Decimal::from_str(&normalized).ok()?;
    Some(if negative { -value } else { value })
}

fn normalize_single_separator(token: &str, separator: char) -> String {
    let groups_thousands = token.matches(separator).count() > 1
        || token
            .split_once(separator)
            .is_some_and(|(integer, fraction)| integer != "0" && fraction.len() == 3);
    if groups_thousands {
        token.replace(separator, "")
    } else {
        token.replace(separator, ".")
    }
}
