use std::str::FromStr;

use solana_sdk::pubkey::Pubkey;

/// Parse a base58 account address.
pub fn parse_address(address: &str) -> crate::Result<Pubkey> {
    Pubkey::from_str(address.trim()).map_err(|_| crate::Error::InvalidAddress(address.to_string()))
}

/// Shorten an address for display, e.g. `7xKX…gAsU`.
pub fn shorten_address(address: &str) -> String {
    let chars = address.chars().collect::<Vec<_>>();
    if chars.len() <= 10 {
        return address.to_string();
    }
    let head = chars[..4].iter().collect::<String>();
    let tail = chars[chars.len() - 4..].iter().collect::<String>();
    format!("{head}…{tail}")
}
