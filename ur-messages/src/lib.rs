//! Wire types shared by the universal resolver core and its callers.
//!
//! Every encoding in this crate is Solidity ABI and is byte-stable: the
//! suspension payloads travel through off-chain clients that decode them with
//! their own ABI tooling.
pub mod abi;
pub mod types;

use alloy_primitives::FixedBytes;
use alloy_primitives::B256;

/// Fixed-size hash identifying a name in the registry.
pub type Node = B256;

/// 4-byte function or error selector.
pub type Selector = FixedBytes<4>;

/// SLIP-44 style coin type used by multi-coin address records.
pub type CoinType = u64;

/// Coin type of the native chain address record.
pub const ETH_COIN_TYPE: CoinType = 60;
