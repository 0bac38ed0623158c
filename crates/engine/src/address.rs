//! Address re-encoding across bech32 prefixes (spec §4.10).

use bech32::{FromBase32, ToBase32};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AddressError {
    #[error("invalid bech32 address: {0}")]
    InvalidBech32(String),

    #[error("unexpected address byte length {0}, expected 20 or 32")]
    UnexpectedLength(usize),
}

/// Decodes `address`, validates its byte length is the expected Cosmos range
/// (20 or 32 bytes), and re-encodes it with `target_prefix`. Never used for
/// intermediate PFM hops, which use the literal receiver `"pfm"`.
pub fn to_prefix(address: &str, target_prefix: &str) -> Result<String, AddressError> {
    let (_, data, variant) =
        bech32::decode(address).map_err(|e| AddressError::InvalidBech32(e.to_string()))?;
    let bytes = Vec::<u8>::from_base32(&data).map_err(|e| AddressError::InvalidBech32(e.to_string()))?;
    if bytes.len() != 20 && bytes.len() != 32 {
        return Err(AddressError::UnexpectedLength(bytes.len()));
    }
    bech32::encode(target_prefix, bytes.to_base32(), variant)
        .map_err(|e| AddressError::InvalidBech32(e.to_string()))
}

pub fn decode_prefix(address: &str) -> Result<String, AddressError> {
    let (hrp, _, _) = bech32::decode(address).map_err(|e| AddressError::InvalidBech32(e.to_string()))?;
    Ok(hrp)
}

#[cfg(test)]
mod tests {
    use super::*;

    const COSMOS_ZERO_ADDR: &str = "cosmos1qqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqnrql8a";
    const OSMO_ZERO_ADDR: &str = "osmo1qqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqmcn030";
    const JUNO_ZERO_ADDR: &str = "juno1qqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqq93ryqp";

    #[test]
    fn round_trips_through_an_intermediate_prefix() {
        let via_osmo = to_prefix(COSMOS_ZERO_ADDR, "osmo").unwrap();
        assert_eq!(via_osmo, OSMO_ZERO_ADDR);
        let back_to_juno = to_prefix(&via_osmo, "juno").unwrap();
        let direct_to_juno = to_prefix(COSMOS_ZERO_ADDR, "juno").unwrap();
        assert_eq!(back_to_juno, direct_to_juno);
        assert_eq!(direct_to_juno, JUNO_ZERO_ADDR);
    }

    #[test]
    fn rejects_garbage_input() {
        assert!(to_prefix("not-a-bech32-address", "osmo").is_err());
    }

    #[test]
    fn prefix_changes_but_payload_does_not() {
        let osmo_addr = to_prefix(COSMOS_ZERO_ADDR, "osmo").unwrap();
        assert!(osmo_addr.starts_with("osmo1"));
        assert_eq!(decode_prefix(&osmo_addr).unwrap(), "osmo");
    }
}
