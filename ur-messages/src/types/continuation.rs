//! Resumption state threaded through an off-chain round trip.
//!
//! The state is the `extraData` of the top-level `OffchainLookup` and is laid
//! out as `abi.encode(bool, address, string[], bytes, (bytes4,bytes)[])`.
//! Nothing is kept server-side: decoding the bytes handed back by the client is
//! the only way to resume.
use alloy_primitives::Address;
use alloy_primitives::Bytes;
use alloy_sol_types::SolValue;
use derive_debug_plus::Dbg;

use super::MessageError;
use crate::abi::CallbackData;
use crate::Selector;

/// Callback selector marking an item that is answered by calling the resolver
/// again on resumption instead of consuming a gateway response.
pub const ON_CHAIN_SENTINEL: Selector = Selector::ZERO;

/// Callback selector marking an item that already failed at the gateway; its
/// data is the failure payload, returned as is once the batch completes.
pub const FAILED_SENTINEL: Selector = Selector::new([0xff; 4]);

type Encoded = (bool, Address, Vec<String>, Bytes, Vec<CallbackData>);

#[derive(Clone, Dbg, PartialEq, Eq)]
pub struct ContinuationState {
    /// The request was a single call carrying a bundled `multicall`; results
    /// are re-wrapped into the multicall return encoding once complete.
    pub bundled_multicall: bool,

    /// Resolver consulted for every item.
    pub resolver: Address,

    /// Batch gateway URLs to use if resumption suspends again.
    pub urls: Vec<String>,

    /// Opaque bookkeeping of multi-stage requests (reverse resolution).
    #[dbg(formatter = crate::types::hex_pretty)]
    pub metadata: Bytes,

    /// One entry per sub-query, in request order.
    pub calls: Vec<CallbackData>,
}

impl ContinuationState {
    pub fn encode(&self) -> Bytes {
        let encoded: Encoded = (
            self.bundled_multicall,
            self.resolver,
            self.urls.clone(),
            self.metadata.clone(),
            self.calls.clone(),
        );
        encoded
            .abi_encode_params()
            .into()
    }

    pub fn decode(data: &[u8]) -> Result<Self, MessageError> {
        let (bundled_multicall, resolver, urls, metadata, calls) =
            <Encoded as SolValue>::abi_decode_params(data, true)?;
        Ok(Self {
            bundled_multicall,
            resolver,
            urls,
            metadata,
            calls,
        })
    }

    /// Number of items waiting on a gateway response.
    pub fn pending_offchain(&self) -> usize {
        self.calls
            .iter()
            .filter(|call| call.is_pending())
            .count()
    }
}

impl CallbackData {
    /// Item to be answered by replaying `call` against the resolver.
    pub fn on_chain(call: impl Into<Bytes>) -> Self {
        Self {
            callbackFunction: ON_CHAIN_SENTINEL,
            data: call.into(),
        }
    }

    /// Item waiting on a gateway response, resumed through the resolver's
    /// `callback(response, extra_data)`.
    pub fn offchain(
        callback: Selector,
        extra_data: impl Into<Bytes>,
    ) -> Self {
        Self {
            callbackFunction: callback,
            data: extra_data.into(),
        }
    }

    /// Item settled as a failure with `error` as its result.
    pub fn failed(error: impl Into<Bytes>) -> Self {
        Self {
            callbackFunction: FAILED_SENTINEL,
            data: error.into(),
        }
    }

    pub fn is_on_chain(&self) -> bool {
        self.callbackFunction == ON_CHAIN_SENTINEL
    }

    pub fn is_failed(&self) -> bool {
        self.callbackFunction == FAILED_SENTINEL
    }

    /// Whether the item consumes a gateway response on resumption.
    pub fn is_pending(&self) -> bool {
        !self.is_on_chain() && !self.is_failed()
    }
}
