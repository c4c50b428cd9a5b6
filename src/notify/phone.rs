//! Phone number normalization for the messaging gateway.
//!
//! The gateway accepts Bangladeshi mobile numbers in the national
//! `8801XXXXXXXXX` form. Customers enter numbers in whatever format they
//! like, so the dispatcher normalizes before sending and refuses to attempt
//! delivery to anything that does not normalize cleanly.

use crate::errors::{Error, Result};

/// Normalizes a raw phone number to the `8801XXXXXXXXX` national format.
///
/// Spaces and dashes are stripped, a leading `+880` loses its plus, and a
/// local `01...` number gains the `88` country prefix. The result must match
/// `8801` followed by nine digits; anything else fails fast, before any
/// network call is made.
pub fn normalize_phone(raw: &str) -> Result<String> {
    let mut number: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect();

    if let Some(rest) = number.strip_prefix("+880") {
        number = format!("880{rest}");
    } else if number.starts_with("01") {
        number = format!("88{number}");
    }

    if !is_national_mobile(&number) {
        return Err(Error::InvalidPhone {
            phone: raw.to_string(),
        });
    }

    Ok(number)
}

/// Whether a string is `"8801"` followed by exactly nine digits.
fn is_national_mobile(number: &str) -> bool {
    number.len() == 13
        && number.starts_with("8801")
        && number.chars().all(|c| c.is_ascii_digit())
}
