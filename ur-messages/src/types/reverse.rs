//! Metadata of a suspended reverse resolution.
use alloy_primitives::Address;
use alloy_primitives::Bytes;
use alloy_primitives::U256;
use alloy_sol_types::SolValue;

use super::MessageError;
use crate::CoinType;
use crate::ETH_COIN_TYPE;

/// Head size of `abi.encode(string, address)`; the string offset points
/// right past it.
const NAME_AND_RESOLVER_HEAD: u64 = 0x40;

/// Which half of a reverse resolution a continuation belongs to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReverseStage {
    /// Looking up the primary name of the address.
    LookupName { coin_type: CoinType },

    /// Forward-resolving `name` to verify the round trip. `reverse_resolver`
    /// answered the name lookup.
    VerifyAddress {
        name: String,
        reverse_resolver: Address,
        coin_type: CoinType,
    },
}

impl ReverseStage {
    /// Encodes the stage as continuation metadata.
    ///
    /// Name lookups carry nothing for the native coin and
    /// `abi.encode(uint256 coinType)` otherwise. Verification carries
    /// `abi.encode(string name, address resolver)`, with a trailing
    /// `uint256 coinType` for non-native coins.
    pub fn encode(&self) -> Bytes {
        match self {
            ReverseStage::LookupName { coin_type } if *coin_type == ETH_COIN_TYPE => Bytes::new(),
            ReverseStage::LookupName { coin_type } => U256::from(*coin_type)
                .abi_encode()
                .into(),
            ReverseStage::VerifyAddress {
                name,
                reverse_resolver,
                coin_type,
            } if *coin_type == ETH_COIN_TYPE => (name.clone(), *reverse_resolver)
                .abi_encode_params()
                .into(),
            ReverseStage::VerifyAddress {
                name,
                reverse_resolver,
                coin_type,
            } => (name.clone(), *reverse_resolver, U256::from(*coin_type))
                .abi_encode_params()
                .into(),
        }
    }

    pub fn decode(metadata: &[u8]) -> Result<Self, MessageError> {
        match metadata.len() {
            0 => Ok(ReverseStage::LookupName {
                coin_type: ETH_COIN_TYPE,
            }),
            32 => {
                let coin_type = U256::abi_decode(metadata, true)?;
                Ok(ReverseStage::LookupName {
                    coin_type: to_coin_type(coin_type)?,
                })
            },
            _ if metadata.get(..32).map(U256::from_be_slice)
                == Some(U256::from(NAME_AND_RESOLVER_HEAD)) =>
            {
                let (name, reverse_resolver) =
                    <(String, Address)>::abi_decode_params(metadata, true)?;
                Ok(ReverseStage::VerifyAddress {
                    name,
                    reverse_resolver,
                    coin_type: ETH_COIN_TYPE,
                })
            },
            _ => {
                let (name, reverse_resolver, coin_type) =
                    <(String, Address, U256)>::abi_decode_params(metadata, true)?;
                Ok(ReverseStage::VerifyAddress {
                    name,
                    reverse_resolver,
                    coin_type: to_coin_type(coin_type)?,
                })
            },
        }
    }

    pub fn coin_type(&self) -> CoinType {
        match self {
            ReverseStage::LookupName { coin_type } => *coin_type,
            ReverseStage::VerifyAddress { coin_type, .. } => *coin_type,
        }
    }
}

fn to_coin_type(value: U256) -> Result<CoinType, MessageError> {
    u64::try_from(value).map_err(|_| MessageError::CoinTypeOverflow)
}
