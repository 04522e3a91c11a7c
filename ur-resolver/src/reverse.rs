//! Reverse resolution: address to primary name, then the name back to an
//! address.
//!
//! Either stage may go off-chain. The continuation metadata records which
//! stage is pending so that [`UniversalResolver::reverse_callback`] can pick
//! up where the suspension happened.
use alloy_primitives::Address;
use alloy_primitives::Bytes;
use alloy_primitives::U256;
use alloy_sol_types::SolCall;
use alloy_sol_types::SolValue;
use tracing::debug;
use ur_messages::abi::IAddrResolver;
use ur_messages::abi::IAddressResolver;
use ur_messages::abi::INameResolver;
use ur_messages::types::continuation::ContinuationState;
use ur_messages::types::reverse::ReverseStage;
use ur_messages::CoinType;
use ur_messages::ETH_COIN_TYPE;

use crate::dispatch::finish_single;
use crate::dispatch::Suspend;
use crate::error::Result;
use crate::name::dns_encode;
use crate::name::namehash;
use crate::telemetry;
use crate::telemetry::RequestKind;
use crate::universal::UniversalResolver;
use crate::universal::REVERSE_CALLBACK;
use crate::world::Chain;
use crate::world::Registry;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReverseResult {
    /// Primary name, empty when the address has none.
    pub name: String,

    /// What the primary name resolves to for the queried coin type. It is
    /// not compared with the queried address.
    pub resolved_address: Bytes,

    /// Resolver that answered the name lookup.
    pub reverse_resolver: Address,

    /// Resolver that answered the address lookup.
    pub resolver: Address,
}

/// `<hex>.addr.reverse` for the native coin, `<hex>.<coin type in hex>.reverse`
/// otherwise.
pub fn reverse_name(
    address: Address,
    coin_type: CoinType,
) -> String {
    let address = hex::encode(address);
    if coin_type == ETH_COIN_TYPE {
        format!("{address}.addr.reverse")
    } else {
        format!("{address}.{coin_type:x}.reverse")
    }
}

/// The address record query for `name`. The native coin uses the
/// single-coin `addr(bytes32)` so that pre-multicoin resolvers can answer.
fn address_call(
    name: &str,
    coin_type: CoinType,
) -> Bytes {
    let node = namehash(name);
    if coin_type == ETH_COIN_TYPE {
        IAddrResolver::addrCall { node }
            .abi_encode()
            .into()
    } else {
        IAddressResolver::addrCall {
            node,
            coinType: U256::from(coin_type),
        }
        .abi_encode()
        .into()
    }
}

fn decode_address(
    reply: &[u8],
    coin_type: CoinType,
) -> Result<Bytes> {
    if coin_type == ETH_COIN_TYPE {
        let address = Address::abi_decode(reply, true)?;
        Ok(Bytes::copy_from_slice(address.as_slice()))
    } else {
        Ok(Bytes::abi_decode(reply, true)?)
    }
}

impl<R: Registry, C: Chain> UniversalResolver<R, C> {
    /// Finds the primary name of `address` and what that name resolves to.
    pub fn reverse(
        &self,
        address: Address,
        coin_type: CoinType,
        gateways: Option<&[String]>,
    ) -> Result<ReverseResult> {
        telemetry::request(RequestKind::Reverse);
        let urls = self.gateways_or_default(gateways);

        let name = reverse_name(address, coin_type);
        let encoded = dns_encode(&name)?;
        let target = self.target(&encoded)?;
        let call = INameResolver::nameCall {
            node: namehash(&name),
        }
        .abi_encode();

        let batch = self.dispatch(&target, vec![call.into()]);
        let results = self.settle(
            batch,
            Suspend {
                callback: REVERSE_CALLBACK,
                urls: urls.clone(),
                metadata: ReverseStage::LookupName { coin_type }.encode(),
                bundled_multicall: false,
            },
        )?;

        let reply = finish_single(results, false)?;
        self.verify_address(&reply, target.resolver, coin_type, urls)
    }

    /// Completes a reverse resolution suspended in either stage.
    pub fn reverse_callback(
        &self,
        response: &[u8],
        extra_data: &[u8],
    ) -> Result<ReverseResult> {
        telemetry::request(RequestKind::ReverseCallback);
        let state = ContinuationState::decode(extra_data)?;
        let stage = ReverseStage::decode(&state.metadata)?;

        let results = self.resume(response, &state, REVERSE_CALLBACK)?;
        let reply = finish_single(results, false)?;

        match stage {
            ReverseStage::LookupName { coin_type } => {
                self.verify_address(&reply, state.resolver, coin_type, state.urls)
            },
            ReverseStage::VerifyAddress {
                name,
                reverse_resolver,
                coin_type,
            } => Ok(ReverseResult {
                name,
                resolved_address: decode_address(&reply, coin_type)?,
                reverse_resolver,
                resolver: state.resolver,
            }),
        }
    }

    /// Second stage: forward-resolves the name found by `reverse_resolver`.
    fn verify_address(
        &self,
        name_reply: &[u8],
        reverse_resolver: Address,
        coin_type: CoinType,
        urls: Vec<String>,
    ) -> Result<ReverseResult> {
        let name = String::abi_decode(name_reply, true)?;
        if name.is_empty() {
            debug!(%reverse_resolver, "no primary name set");
            return Ok(ReverseResult {
                name,
                resolved_address: Bytes::new(),
                reverse_resolver,
                resolver: Address::ZERO,
            });
        }

        let encoded = dns_encode(&name)?;
        let target = self.target(&encoded)?;
        let batch = self.dispatch(&target, vec![address_call(&name, coin_type)]);
        let results = self.settle(
            batch,
            Suspend {
                callback: REVERSE_CALLBACK,
                urls,
                metadata: ReverseStage::VerifyAddress {
                    name: name.clone(),
                    reverse_resolver,
                    coin_type,
                }
                .encode(),
                bundled_multicall: false,
            },
        )?;

        let reply = finish_single(results, false)?;
        Ok(ReverseResult {
            name,
            resolved_address: decode_address(&reply, coin_type)?,
            reverse_resolver,
            resolver: target.resolver,
        })
    }
}
