use alloy_primitives::Address;
use alloy_sol_types::SolCall;
use ur_messages::abi::IUniversalResolver;
use ur_messages::Selector;

use crate::world::Chain;
use crate::world::Registry;

/// Selector of the entry point resuming a single-call request.
pub const RESOLVE_SINGLE_CALLBACK: Selector =
    Selector::new(IUniversalResolver::resolveSingleCallbackCall::SELECTOR);

/// Selector of the entry point resuming a batch request.
pub const RESOLVE_CALLBACK: Selector = Selector::new(IUniversalResolver::resolveCallbackCall::SELECTOR);

/// Selector of the entry point resuming a reverse resolution.
pub const REVERSE_CALLBACK: Selector = Selector::new(IUniversalResolver::reverseCallbackCall::SELECTOR);

/// Entry point of every resolution.
///
/// `address` is where suspended requests resume: it is the `sender` of every
/// `OffchainLookup` raised here. `batch_gateway_urls` is used whenever the
/// caller does not supply its own list.
pub struct UniversalResolver<R, C> {
    address: Address,
    registry: R,
    chain: C,
    batch_gateway_urls: Vec<String>,
}

impl<R: Registry, C: Chain> UniversalResolver<R, C> {
    pub fn new(
        address: Address,
        registry: R,
        chain: C,
        batch_gateway_urls: Vec<String>,
    ) -> Self {
        Self {
            address,
            registry,
            chain,
            batch_gateway_urls,
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn batch_gateway_urls(&self) -> &[String] {
        &self.batch_gateway_urls
    }

    pub(crate) fn registry(&self) -> &R {
        &self.registry
    }

    pub(crate) fn chain(&self) -> &C {
        &self.chain
    }

    /// The caller's gateways if given, the configured ones otherwise.
    pub(crate) fn gateways_or_default(
        &self,
        gateways: Option<&[String]>,
    ) -> Vec<String> {
        gateways
            .unwrap_or(&self.batch_gateway_urls)
            .to_vec()
    }
}
