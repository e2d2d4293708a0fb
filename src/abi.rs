//! Contract ABI bindings
//!
//! Only the handful of functions the sweeper calls are bound here.

use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::{sol, SolCall};

use crate::error::Result;

sol! {
    /// ERC-20 subset used to read and sweep balances
    interface IERC20 {
        function transfer(address to, uint256 amount) external returns (bool);
        function balanceOf(address owner) external view returns (uint256);
    }

    /// Avocado forwarder, computes counterfactual wallet addresses
    interface IAvoForwarder {
        function computeAvocado(address owner_, uint32 index_) external view returns (address);
    }
}

/// Calldata for `transfer(to, amount)`
pub fn encode_transfer(to: Address, amount: U256) -> Bytes {
    IERC20::transferCall { to, amount }.abi_encode().into()
}

/// Calldata for `balanceOf(owner)`
pub fn encode_balance_of(owner: Address) -> Bytes {
    IERC20::balanceOfCall { owner }.abi_encode().into()
}

pub fn decode_balance_of(data: &[u8]) -> Result<U256> {
    let decoded = IERC20::balanceOfCall::abi_decode_returns(data, true)?;
    Ok(decoded._0)
}

/// Calldata for `computeAvocado(owner, index)`
pub fn encode_compute_avocado(owner: Address, index: u32) -> Bytes {
    IAvoForwarder::computeAvocadoCall {
        owner_: owner,
        index_: index,
    }
    .abi_encode()
    .into()
}

pub fn decode_compute_avocado(data: &[u8]) -> Result<Address> {
    let decoded = IAvoForwarder::computeAvocadoCall::abi_decode_returns(data, true)?;
    Ok(decoded._0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;

    const OWNER: Address = address!("1111111111111111111111111111111111111111");

    fn word_for(addr: Address) -> Vec<u8> {
        let mut word = vec![0u8; 32];
        word[12..].copy_from_slice(addr.as_slice());
        word
    }

    #[test]
    fn test_transfer_calldata() {
        let data = encode_transfer(OWNER, U256::from(5_000_000u64));
        assert_eq!(data.len(), 4 + 32 + 32);
        // transfer(address,uint256)
        assert_eq!(&data[..4], &[0xa9, 0x05, 0x9c, 0xbb]);
        assert_eq!(&data[4..36], word_for(OWNER).as_slice());
        assert_eq!(U256::from_be_slice(&data[36..]), U256::from(5_000_000u64));
    }

    #[test]
    fn test_balance_of_selector() {
        let data = encode_balance_of(OWNER);
        assert_eq!(&data[..4], &[0x70, 0xa0, 0x82, 0x31]);
    }

    #[test]
    fn test_compute_avocado_calldata() {
        let data = encode_compute_avocado(OWNER, 3);
        assert_eq!(data.len(), 4 + 32 + 32);
        assert_eq!(&data[4..36], word_for(OWNER).as_slice());
        assert_eq!(data[67], 3);
    }

    #[test]
    fn test_decode_compute_avocado() {
        let wallet = address!("2222222222222222222222222222222222222222");
        assert_eq!(decode_compute_avocado(&word_for(wallet)).unwrap(), wallet);
    }

    #[test]
    fn test_decode_rejects_short_return() {
        assert!(decode_compute_avocado(&[0u8; 4]).is_err());
        assert!(decode_balance_of(&[]).is_err());
    }
}
