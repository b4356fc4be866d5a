//! Base62 encoding over the `[0-9A-Za-z]` alphabet.

/// The short code alphabet, in digit order.
pub const ALPHABET: &[u8; 62] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

const BASE: u64 = ALPHABET.len() as u64;

/// Returns `true` if `c` belongs to the base62 alphabet.
pub fn is_base62(c: char) -> bool {
    c.is_ascii_alphanumeric()
}

/// Encodes `value` as a base62 string without leading zeros.
///
/// Zero encodes as `"0"`, every other value starts with a non-zero digit,
/// so the mapping between numbers and strings is one-to-one.
pub fn encode(mut value: u64) -> String {
    if value == 0 {
        return "0".to_string();
    }

    let mut digits = Vec::with_capacity(11);
    while value > 0 {
        digits.push(ALPHABET[(value % BASE) as usize]);
        value /= BASE;
    }
    digits.reverse();

    // alphabet is pure ASCII
    digits.into_iter().map(char::from).collect()
}

/// Returns `62^exp`, or `None` if it does not fit in a `u64`.
pub fn pow(exp: u32) -> Option<u64> {
    BASE.checked_pow(exp)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_small_values() {
        assert_eq!(encode(0), "0");
        assert_eq!(encode(9), "9");
        assert_eq!(encode(10), "A");
        assert_eq!(encode(61), "z");
        assert_eq!(encode(62), "10");
    }

    #[test]
    fn encode_has_no_leading_zero() {
        for value in [1_u64, 62, 3_843, 238_328, 14_776_336, u64::MAX] {
            assert!(!encode(value).starts_with('0'), "value {value}");
        }
    }

    #[test]
    fn encode_largest_value() {
        assert_eq!(encode(u64::MAX), "LygHa16AHYF");
    }

    #[test]
    fn alphabet_is_ascii_alphanumeric() {
        assert!(ALPHABET.iter().all(|b| is_base62(char::from(*b))));
    }

    #[test]
    fn pow_bounds() {
        assert_eq!(pow(0), Some(1));
        assert_eq!(pow(4), Some(14_776_336));
        assert!(pow(10).is_some());
        assert!(pow(11).is_none());
    }
}
