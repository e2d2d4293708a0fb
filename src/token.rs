//! Token descriptors and unit formatting

use alloy_primitives::{address, Address, U256};
use serde::{Deserialize, Serialize};

/// Fractional digits shown in balance panels
pub const DISPLAY_PRECISION: u8 = 4;

/// Largest decimals value accepted in config
pub const MAX_DECIMALS: u8 = 36;

/// An ERC-20 token the sweeper tracks
///
/// `decimals` is always explicit. It is never guessed from the name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TokenDescriptor {
    /// Contract address
    pub address: Address,
    /// Display name
    pub name: String,
    /// Decimal places
    pub decimals: u8,
}

impl TokenDescriptor {
    pub fn new(address: Address, name: impl Into<String>, decimals: u8) -> Self {
        Self {
            address,
            name: name.into(),
            decimals,
        }
    }

    /// Scale a raw on-chain amount for display
    pub fn format_amount(&self, raw: U256) -> String {
        format_units(raw, self.decimals, DISPLAY_PRECISION)
    }
}

/// The built-in token set
pub fn default_tokens() -> Vec<TokenDescriptor> {
    vec![
        TokenDescriptor::new(
            address!("dAC17F958D2ee523a2206206994597C13D831ec7"),
            "Tether USDT",
            6,
        ),
        TokenDescriptor::new(
            address!("2791Bca1f2de4661ED88A30C99A7a9449Aa84174"),
            "Polygon USDC",
            6,
        ),
        TokenDescriptor::new(
            address!("B0bBe7A71162fc57df10c15a5BC74f4caE772782"),
            "Arb DAI",
            18,
        ),
        TokenDescriptor::new(
            address!("94b008aA00579c1307B0EF2c499aD98a8ce58e58"),
            "Opt USDT",
            6,
        ),
    ]
}

/// Format `raw / 10^decimals` with exactly `precision` fractional digits, rounding half up
///
/// Works on the decimal digits of `raw`, so any `decimals` value is exact.
pub fn format_units(raw: U256, decimals: u8, precision: u8) -> String {
    let decimals = decimals as usize;
    let precision = precision as usize;

    // At least one whole digit
    let digits = format!("{:0>width$}", raw.to_string(), width = decimals + 1);
    let (whole, fraction) = digits.split_at(digits.len() - decimals);

    let mut kept: Vec<u8> = whole
        .bytes()
        .chain(fraction.bytes().take(precision))
        .collect();
    kept.resize(whole.len() + precision, b'0');

    if fraction.as_bytes().get(precision).is_some_and(|d| *d >= b'5') {
        round_up(&mut kept);
    }

    let split = kept.len() - precision;
    let whole: String = kept[..split].iter().map(|d| *d as char).collect();
    if precision == 0 {
        return whole;
    }
    let fraction: String = kept[split..].iter().map(|d| *d as char).collect();
    format!("{}.{}", whole, fraction)
}

/// Add one unit in the last place of an ASCII digit string
fn round_up(digits: &mut Vec<u8>) {
    for digit in digits.iter_mut().rev() {
        if *digit == b'9' {
            *digit = b'0';
        } else {
            *digit += 1;
            return;
        }
    }
    digits.insert(0, b'1');
}

/// Shorten an address for display: first 8 characters, `...`, last 4
pub fn shorten_address(address: &Address) -> String {
    let full = address.to_checksum(None);
    format!("{}...{}", &full[..8], &full[full.len() - 4..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_units_usdt() {
        assert_eq!(format_units(U256::from(5_000_000u64), 6, 4), "5.0000");
        assert_eq!(format_units(U256::from(1_234_567u64), 6, 4), "1.2346");
        assert_eq!(format_units(U256::ZERO, 6, 4), "0.0000");
    }

    #[test]
    fn test_format_units_dai() {
        let one_and_half = U256::from(1_500_000_000_000_000_000u128);
        assert_eq!(format_units(one_and_half, 18, 4), "1.5000");
    }

    #[test]
    fn test_format_units_rounds_into_whole() {
        assert_eq!(format_units(U256::from(999_999_999u64), 6, 4), "1000.0000");
    }

    #[test]
    fn test_format_units_small_decimals() {
        assert_eq!(format_units(U256::from(42u64), 0, 4), "42.0000");
        assert_eq!(format_units(U256::from(42u64), 2, 0), "0");
    }

    #[test]
    fn test_format_units_beyond_word_size() {
        // 10^78 does not fit in a U256
        assert_eq!(format_units(U256::MAX, 78, 4), "0.1158");
        assert_eq!(format_units(U256::from(1u64), 78, 4), "0.0000");
        assert_eq!(format_units(U256::MAX, 255, 2), "0.00");
        assert_eq!(format_units(U256::from(7u64), 0, 80).len(), 82);
    }

    #[test]
    fn test_default_tokens_decimals_are_explicit() {
        let tokens = default_tokens();
        assert_eq!(tokens.len(), 4);
        let dai = tokens.iter().find(|t| t.name == "Arb DAI").unwrap();
        assert_eq!(dai.decimals, 18);
        assert!(tokens
            .iter()
            .filter(|t| t.name != "Arb DAI")
            .all(|t| t.decimals == 6));
    }

    #[test]
    fn test_shorten_address() {
        let addr = address!("dAC17F958D2ee523a2206206994597C13D831ec7");
        assert_eq!(shorten_address(&addr), "0xdAC17F...1ec7");
    }
}
