//! Resumption of suspended requests once the gateway has answered.
use alloy_primitives::Address;
use alloy_primitives::Bytes;
use alloy_sol_types::SolValue;
use tracing::info;
use ur_messages::abi::CallResult;
use ur_messages::types::continuation::ContinuationState;
use ur_messages::Selector;

use crate::dispatch::finish_single;
use crate::dispatch::Batch;
use crate::dispatch::Capability;
use crate::dispatch::Step;
use crate::dispatch::Suspend;
use crate::error::Result;
use crate::gateway;
use crate::telemetry;
use crate::telemetry::RequestKind;
use crate::universal::UniversalResolver;
use crate::universal::RESOLVE_CALLBACK;
use crate::universal::RESOLVE_SINGLE_CALLBACK;
use crate::world::Chain;
use crate::world::Registry;

impl<R: Registry, C: Chain> UniversalResolver<R, C> {
    /// Completes a request suspended by [`UniversalResolver::resolve`].
    pub fn resolve_single_callback(
        &self,
        response: &[u8],
        extra_data: &[u8],
    ) -> Result<(Bytes, Address)> {
        telemetry::request(RequestKind::ResolveSingleCallback);
        let state = ContinuationState::decode(extra_data)?;
        let results = self.resume(response, &state, RESOLVE_SINGLE_CALLBACK)?;
        Ok((
            finish_single(results, state.bundled_multicall)?,
            state.resolver,
        ))
    }

    /// Completes a request suspended by [`UniversalResolver::resolve_batch`].
    pub fn resolve_callback(
        &self,
        response: &[u8],
        extra_data: &[u8],
    ) -> Result<(Vec<CallResult>, Address)> {
        telemetry::request(RequestKind::ResolveCallback);
        let state = ContinuationState::decode(extra_data)?;
        let results = self.resume(response, &state, RESOLVE_CALLBACK)?;
        Ok((results, state.resolver))
    }

    /// Settles every item of `state` in order. On-chain items are replayed,
    /// items that failed at the gateway keep their failure payload, off-chain
    /// items are handed their response through the resolver's
    /// callback. Suspends again, resuming through `callback`, if any of
    /// those calls asks for more gateway data.
    pub(crate) fn resume(
        &self,
        response: &[u8],
        state: &ContinuationState,
        callback: Selector,
    ) -> Result<Vec<CallResult>> {
        let items = gateway::demultiplex(&state.calls, response)?;
        info!(
            resolver = %state.resolver,
            items = items.len(),
            pending = state.pending_offchain(),
            "resuming with gateway data"
        );

        let unwrap = Capability::probe(self.chain(), state.resolver).is_wildcard();
        let steps = items
            .into_iter()
            .map(|(item, response)| match response {
                None if item.is_failed() => Step::Failed(item.data.clone()),
                None => self.invoke(state.resolver, item.data.clone(), unwrap),
                Some(response) if response.failed => Step::Failed(response.data),
                Some(response) => {
                    let mut call = item.callbackFunction.to_vec();
                    call.extend((response.data, item.data.clone()).abi_encode_params());
                    self.invoke(state.resolver, call.into(), unwrap)
                },
            })
            .collect();

        self.settle(
            Batch {
                resolver: state.resolver,
                steps,
            },
            Suspend {
                callback,
                urls: state.urls.clone(),
                metadata: state.metadata.clone(),
                bundled_multicall: state.bundled_multicall,
            },
        )
    }
}
