use std::fmt::Display;
use std::fmt::Formatter;

use alloy_primitives::Address;
use alloy_primitives::Bytes;
use alloy_sol_types::SolError;
use derive_debug_plus::Dbg;
use serde_derive::Deserialize;
use serde_derive::Serialize;
use thiserror::Error;

use crate::abi;
use crate::Selector;

pub mod continuation;
pub mod gateway;
pub mod reverse;

/// Failures decoding a payload that came back through an off-chain client.
#[derive(Error, Debug)]
pub enum MessageError {
    #[error("ABI decoding failed: {0}")]
    Abi(#[from] alloy_sol_types::Error),

    #[error("gateway reply carries {failures} failure flags for {responses} responses")]
    ResponseLengthMismatch { failures: usize, responses: usize },

    #[error("{pending} item(s) wait on the gateway but {responses} response(s) came back")]
    PendingMismatch { pending: usize, responses: usize },

    #[error("single-call continuation carries {0} items")]
    SingleCallExpected(usize),

    #[error("coin type does not fit in 64 bits")]
    CoinTypeOverflow,
}

/// Request that must be served by a gateway before a resolver can answer.
#[derive(Clone, Dbg, PartialEq, Eq, Deserialize, Serialize)]
pub struct GatewayRequest {
    /// Resolver that raised the lookup.
    pub sender: Address,

    /// Candidate gateway URLs declared by the resolver.
    pub urls: Vec<String>,

    #[dbg(formatter = crate::types::hex_pretty)]
    pub data: Bytes,
}

impl From<GatewayRequest> for abi::GatewayQuery {
    fn from(request: GatewayRequest) -> Self {
        Self {
            sender: request.sender,
            urls: request.urls,
            data: request.data,
        }
    }
}

impl From<abi::GatewayQuery> for GatewayRequest {
    fn from(query: abi::GatewayQuery) -> Self {
        Self {
            sender: query.sender,
            urls: query.urls,
            data: query.data,
        }
    }
}

/// One demultiplexed item of a batch gateway reply.
#[derive(Clone, Dbg, PartialEq, Eq, Deserialize, Serialize)]
pub struct GatewayResponse {
    /// Set when the gateway could not serve the request; `data` then holds an
    /// error payload, typically `HttpError`.
    pub failed: bool,

    #[dbg(formatter = crate::types::hex_pretty)]
    pub data: Bytes,
}

/// EIP-3668 suspension: the caller must fetch `call_data` from one of `urls`
/// and call `callback_function(response, extra_data)` on `sender`.
#[derive(Clone, Dbg, PartialEq, Eq, Deserialize, Serialize)]
pub struct OffchainLookup {
    pub sender: Address,

    pub urls: Vec<String>,

    #[dbg(formatter = crate::types::hex_pretty)]
    pub call_data: Bytes,

    pub callback_function: Selector,

    #[dbg(formatter = crate::types::hex_pretty)]
    pub extra_data: Bytes,
}

impl OffchainLookup {
    /// Parses revert data as an `OffchainLookup`, if it is one.
    pub fn from_revert_data(data: &[u8]) -> Option<Self> {
        if !data.starts_with(abi::OffchainLookup::SELECTOR.as_slice()) {
            return None;
        }
        abi::OffchainLookup::abi_decode(data, true)
            .ok()
            .map(Into::into)
    }

    /// The revert data a contract would emit for this suspension.
    pub fn revert_data(&self) -> Bytes {
        abi::OffchainLookup::from(self.clone())
            .abi_encode()
            .into()
    }
}

impl From<abi::OffchainLookup> for OffchainLookup {
    fn from(lookup: abi::OffchainLookup) -> Self {
        Self {
            sender: lookup.sender,
            urls: lookup.urls,
            call_data: lookup.callData,
            callback_function: lookup.callbackFunction,
            extra_data: lookup.extraData,
        }
    }
}

impl From<OffchainLookup> for abi::OffchainLookup {
    fn from(lookup: OffchainLookup) -> Self {
        Self {
            sender: lookup.sender,
            urls: lookup.urls,
            callData: lookup.call_data,
            callbackFunction: lookup.callback_function,
            extraData: lookup.extra_data,
        }
    }
}

impl Display for OffchainLookup {
    fn fmt(
        &self,
        f: &mut Formatter<'_>,
    ) -> std::fmt::Result {
        write!(
            f,
            "OffchainLookup<{}, callback {}, {} url(s)>",
            self.sender,
            self.callback_function,
            self.urls.len()
        )
    }
}

/// Decodes `HttpError` items from a gateway failure payload, if it is one.
pub fn http_error_items(data: &[u8]) -> Option<Vec<abi::HttpErrorItem>> {
    if !data.starts_with(abi::HttpError::SELECTOR.as_slice()) {
        return None;
    }
    abi::HttpError::abi_decode(data, true)
        .ok()
        .map(|error| error.errors)
}

/// Hex rendering of a payload for logs and `Debug`, cut after 68 bytes
/// (selector plus two words).
pub fn hex_pretty(bytes: &Bytes) -> String {
    if bytes.len() > 68 {
        format!("0x{}..({} bytes)", hex::encode(&bytes[..68]), bytes.len())
    } else {
        format!("0x{}", hex::encode(bytes))
    }
}
