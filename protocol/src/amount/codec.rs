//! # Fixed-Point Amount Codec
//!
//! Converts between what a human types (`"1.5"`) and what the protocol
//! stores (`150`). The conversion is string surgery, not arithmetic: the
//! fractional part is padded to the scale and glued onto the whole part,
//! so there is no rounding anywhere.
//!
//! Going the other way is a display transform. Trailing zeros are dropped,
//! so `decode(encode("1.50"))` is `"1.5"`. Numerically equal, not
//! byte-for-byte equal, and that is intended.
//!
//! Validation lives here too. The UI filters keystrokes with
//! [`accepts_input`], but [`encode_scaled`] re-checks everything so that a
//! caller that skips the filter gets an error instead of an amount at the
//! wrong scale.

use thiserror::Error;

use super::Amount;
use crate::config::AMOUNT_DECIMALS;

/// Errors produced while encoding decimal input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountError {
    /// The input is not a non-negative decimal with at most `scale`
    /// fractional digits.
    #[error("invalid amount {input:?}: {reason}")]
    InvalidFormat {
        /// The offending input, verbatim.
        input: String,
        /// What was wrong with it.
        reason: &'static str,
    },
}

impl AmountError {
    fn invalid(input: &str, reason: &'static str) -> Self {
        AmountError::InvalidFormat {
            input: input.to_string(),
            reason,
        }
    }
}

/// Encodes a decimal string at the token's fixed scale of two digits.
///
/// `"5"` → `500`, `"1.5"` → `150`, `"0.01"` → `1`, `""` → `0`.
pub fn encode(input: &str) -> Result<Amount, AmountError> {
    encode_scaled(input, AMOUNT_DECIMALS)
}

/// Encodes a decimal string into an integer scaled by `10^scale`.
///
/// Trailing decimal points are ignored. Input that is empty after that
/// encodes to zero. Whitespace is not stripped: `" 1"` is as malformed here
/// as it is to [`accepts_input`].
///
/// # Errors
///
/// [`AmountError::InvalidFormat`] when the input has anything other than
/// ASCII digits and one decimal point, or more than `scale` fractional
/// digits.
pub fn encode_scaled(input: &str, scale: u32) -> Result<Amount, AmountError> {
    let trimmed = input.trim_end_matches('.');
    if trimmed.is_empty() {
        return Ok(Amount::zero());
    }

    let (whole, fraction) = match trimmed.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (trimmed, ""),
    };

    if !whole.bytes().all(|b| b.is_ascii_digit()) {
        return Err(AmountError::invalid(input, "whole part must be digits"));
    }
    if fraction.contains('.') {
        return Err(AmountError::invalid(input, "more than one decimal point"));
    }
    if !fraction.bytes().all(|b| b.is_ascii_digit()) {
        return Err(AmountError::invalid(input, "fractional part must be digits"));
    }

    let scale = scale as usize;
    if fraction.len() > scale {
        return Err(AmountError::invalid(input, "too many fractional digits"));
    }

    let mut digits = String::with_capacity(whole.len() + scale);
    digits.push_str(whole);
    digits.push_str(fraction);
    digits.extend(std::iter::repeat('0').take(scale - fraction.len()));

    // Only "." could leave no digits, and it was trimmed above.
    digits
        .parse()
        .map_err(|_| AmountError::invalid(input, "not a number"))
}

/// Decodes an amount at the fixed two-digit scale.
pub fn decode_default(amount: &Amount) -> String {
    decode(amount, AMOUNT_DECIMALS)
}

/// Renders an amount scaled by `10^scale` as a minimal decimal string.
///
/// `0` → `"0"`, `5` → `"0.05"`, `150` → `"1.5"`, `100` → `"1"`.
pub fn decode(amount: &Amount, scale: u32) -> String {
    if amount.is_zero() {
        return "0".to_string();
    }

    let digits = amount.as_biguint().to_string();
    let scale = scale as usize;
    if scale == 0 {
        return digits;
    }

    // Left-pad so the whole part is never empty.
    let padded = format!("{:0>width$}", digits, width = scale + 1);
    let (whole, fraction) = padded.split_at(padded.len() - scale);
    let fraction = fraction.trim_end_matches('0');

    if fraction.is_empty() {
        whole.to_string()
    } else {
        format!("{}.{}", whole, fraction)
    }
}

/// Keystroke filter for amount inputs: `^\d*\.?\d{0,scale}$`.
///
/// Partial input such as `""`, `"."` or `"3."` is accepted because the
/// user is still typing; [`encode_scaled`] maps all of those sensibly.
pub fn accepts_input(input: &str, scale: u32) -> bool {
    let (whole, fraction) = match input.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (input, ""),
    };
    whole.bytes().all(|b| b.is_ascii_digit())
        && fraction.bytes().all(|b| b.is_ascii_digit())
        && fraction.len() <= scale as usize
}

/// Decrypted balance as shown next to the encrypted one: `"1.5 PRIV"`.
pub fn format_balance(amount: &Amount, scale: u32, symbol: &str) -> String {
    format!("{} {}", decode(amount, scale), symbol)
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigUint;

    fn enc(s: &str) -> u64 {
        let amount = encode(s).unwrap();
        amount.to_string().parse().unwrap()
    }

    #[test]
    fn encode_known_values() {
        assert_eq!(enc(""), 0);
        assert_eq!(enc("."), 0);
        assert_eq!(enc("5"), 500);
        assert_eq!(enc("5."), 500);
        assert_eq!(enc("0.01"), 1);
        assert_eq!(enc("1.5"), 150);
        assert_eq!(enc("10.50"), 1050);
        assert_eq!(enc(".5"), 50);
        assert_eq!(enc("007"), 700);
    }

    #[test]
    fn encode_strips_repeated_trailing_points() {
        assert_eq!(enc("5.."), 500);
    }

    #[test]
    fn encode_rejects_extra_fraction_digits() {
        // Silently producing 1234 here would mean 12.34 instead of 1.234.
        let err = encode("1.234").unwrap_err();
        assert!(matches!(
            err,
            AmountError::InvalidFormat {
                reason: "too many fractional digits",
                ..
            }
        ));
    }

    #[test]
    fn encode_rejects_garbage() {
        assert!(encode("1a").is_err());
        assert!(encode("-1").is_err());
        assert!(encode("1.2.3").is_err());
        assert!(encode("1e5").is_err());
        assert!(encode("1,5").is_err());
    }

    #[test]
    fn encode_rejects_whitespace_like_the_keystroke_filter() {
        for input in [" 1", "1 ", " 1.5 ", "1. 5", "\t2"] {
            assert!(!accepts_input(input, 2), "filter accepted {:?}", input);
            assert!(
                matches!(encode(input), Err(AmountError::InvalidFormat { .. })),
                "encode accepted {:?}",
                input
            );
        }
    }

    #[test]
    fn encode_scaled_uses_requested_scale() {
        let wei = encode_scaled("1.5", 18).unwrap();
        assert_eq!(wei.to_string(), "1500000000000000000");
        assert_eq!(encode_scaled("42", 0).unwrap(), Amount::from(42));
        assert!(encode_scaled("4.2", 0).is_err());
    }

    #[test]
    fn decode_known_values() {
        assert_eq!(decode_default(&Amount::from(0)), "0");
        assert_eq!(decode_default(&Amount::from(5)), "0.05");
        assert_eq!(decode_default(&Amount::from(150)), "1.5");
        assert_eq!(decode_default(&Amount::from(100)), "1");
        assert_eq!(decode_default(&Amount::from(1050)), "10.5");
        assert_eq!(decode_default(&Amount::from(12345)), "123.45");
    }

    #[test]
    fn decode_with_other_scales() {
        assert_eq!(decode(&Amount::from(42), 0), "42");
        assert_eq!(decode(&Amount::from(1), 18), "0.000000000000000001");
    }

    #[test]
    fn decode_is_exact_division_by_hundred() {
        for raw in [1u64, 9, 10, 99, 100, 101, 999, 1_000_000, 123_456_789] {
            let text = decode_default(&Amount::from(raw));
            let (whole, frac) = text.split_once('.').unwrap_or((&text, ""));
            let frac = format!("{:0<2}", frac);
            let rebuilt: u64 = format!("{}{}", whole, frac).parse().unwrap();
            assert_eq!(rebuilt, raw, "decode({}) = {}", raw, text);
        }
    }

    #[test]
    fn round_trip_is_numeric() {
        for input in ["0", "0.1", "0.10", "1", "1.05", "99.99", "1000.5", "3."] {
            let encoded = encode(input).unwrap();
            let decoded = decode_default(&encoded);
            assert_eq!(encode(&decoded).unwrap(), encoded, "input {}", input);
        }
    }

    #[test]
    fn huge_amounts_survive() {
        let input = "123456789012345678901234567890.12";
        let encoded = encode(input).unwrap();
        assert_eq!(
            encoded.as_biguint(),
            &"12345678901234567890123456789012".parse::<BigUint>().unwrap()
        );
        assert_eq!(decode_default(&encoded), input);
    }

    #[test]
    fn keystroke_filter() {
        assert!(accepts_input("", 2));
        assert!(accepts_input(".", 2));
        assert!(accepts_input("3.", 2));
        assert!(accepts_input("3.14", 2));
        assert!(!accepts_input("3.141", 2));
        assert!(!accepts_input("3..", 2));
        assert!(!accepts_input("abc", 2));
        assert!(!accepts_input(" 1", 2));
        assert!(accepts_input("17", 0));
        assert!(!accepts_input("1.7", 0));
    }

    #[test]
    fn balance_formatting() {
        assert_eq!(format_balance(&Amount::from(150), 2, "PRIV"), "1.5 PRIV");
        assert_eq!(format_balance(&Amount::zero(), 2, "PRIV"), "0 PRIV");
    }
}
