//! Sends queries to a located resolver and classifies what comes back.
use alloy_primitives::Address;
use alloy_primitives::Bytes;
use alloy_sol_types::SolCall;
use alloy_sol_types::SolValue;
use tracing::debug;
use tracing::info;
use tracing::trace;
use ur_messages::abi::CallResult;
use ur_messages::abi::IERC165;
use ur_messages::abi::IExtendedResolver;
use ur_messages::abi::IMulticallable;
use ur_messages::abi::EXTENDED_RESOLVER_INTERFACE_ID;
use ur_messages::types::continuation::ContinuationState;
use ur_messages::types::gateway::encode_query;
use ur_messages::types::http_error_items;
use ur_messages::types::MessageError;
use ur_messages::types::OffchainLookup;
use ur_messages::Selector;

use crate::error::ResolveError;
use crate::error::Result;
use crate::gateway;
use crate::name::DnsName;
use crate::telemetry;
use crate::telemetry::RequestKind;
use crate::universal::UniversalResolver;
use crate::universal::RESOLVE_CALLBACK;
use crate::universal::RESOLVE_SINGLE_CALLBACK;
use crate::world::CallOutcome;
use crate::world::Chain;
use crate::world::Registry;

/// What a resolver told us about ENSIP-10 support.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Capability {
    /// Accepts `resolve(name, data)` for any name under its own.
    Wildcard,

    /// Answers direct calls for its exact node only.
    Legacy,

    /// The probe reverted or returned garbage; handled as `Legacy`.
    ProbeFailed,
}

impl Capability {
    pub fn probe(
        chain: &impl Chain,
        resolver: Address,
    ) -> Self {
        let call = IERC165::supportsInterfaceCall {
            interfaceID: EXTENDED_RESOLVER_INTERFACE_ID.into(),
        }
        .abi_encode();

        let capability = match chain.static_call(resolver, &call) {
            CallOutcome::Success(data) => {
                match IERC165::supportsInterfaceCall::abi_decode_returns(&data, true) {
                    Ok(supported) if supported._0 => Capability::Wildcard,
                    Ok(_) => Capability::Legacy,
                    Err(_) => Capability::ProbeFailed,
                }
            },
            CallOutcome::Revert(_) => Capability::ProbeFailed,
        };
        debug!(%resolver, ?capability, "probed resolver");
        capability
    }

    pub fn is_wildcard(self) -> bool {
        self == Capability::Wildcard
    }
}

/// State of one sub-query.
#[derive(Clone, Debug)]
pub(crate) enum Step {
    /// Settled by calling the resolver; `call` replays it.
    Done { call: Bytes, result: CallResult },

    /// The gateway failed the item; nothing to replay, the payload is the
    /// result.
    Failed(Bytes),

    /// The resolver asked for gateway data.
    Pending(OffchainLookup),
}

impl Step {
    fn is_pending(&self) -> bool {
        matches!(self, Step::Pending(_))
    }
}

/// Every sub-query of one request, all against the same resolver.
pub(crate) struct Batch {
    pub resolver: Address,
    pub steps: Vec<Step>,
}

/// How to resume a batch if it has to go off-chain.
pub(crate) struct Suspend {
    pub callback: Selector,
    pub urls: Vec<String>,
    pub metadata: Bytes,
    pub bundled_multicall: bool,
}

/// A located resolver, ready to be queried.
pub(crate) struct Target<'a> {
    pub name: DnsName<'a>,
    pub resolver: Address,
    pub capability: Capability,
}

impl<R: Registry, C: Chain> UniversalResolver<R, C> {
    /// Resolves one record of `name`.
    ///
    /// `data` is a resolver call such as `addr(bytes32)`. A `multicall` is
    /// split into its calls and the answer comes back in the `multicall`
    /// return encoding. Returns the raw answer and the resolver that gave it.
    pub fn resolve(
        &self,
        name: &[u8],
        data: &[u8],
        gateways: Option<&[String]>,
    ) -> Result<(Bytes, Address)> {
        telemetry::request(RequestKind::Resolve);
        let target = self.target(name)?;

        let bundled = unbundle(data);
        let bundled_multicall = bundled.is_some();
        let calls = bundled.unwrap_or_else(|| vec![Bytes::copy_from_slice(data)]);

        let batch = self.dispatch(&target, calls);
        let results = self.settle(
            batch,
            Suspend {
                callback: RESOLVE_SINGLE_CALLBACK,
                urls: self.gateways_or_default(gateways),
                metadata: Bytes::new(),
                bundled_multicall,
            },
        )?;
        Ok((finish_single(results, bundled_multicall)?, target.resolver))
    }

    /// Resolves several records of `name` at once. A failing call only fails
    /// its own entry.
    pub fn resolve_batch(
        &self,
        name: &[u8],
        calls: &[Bytes],
        gateways: Option<&[String]>,
    ) -> Result<(Vec<CallResult>, Address)> {
        telemetry::request(RequestKind::ResolveBatch);
        let target = self.target(name)?;

        let batch = self.dispatch(&target, calls.to_vec());
        let results = self.settle(
            batch,
            Suspend {
                callback: RESOLVE_CALLBACK,
                urls: self.gateways_or_default(gateways),
                metadata: Bytes::new(),
                bundled_multicall: false,
            },
        )?;
        Ok((results, target.resolver))
    }

    pub(crate) fn target<'a>(
        &self,
        name: &'a [u8],
    ) -> Result<Target<'a>> {
        let name = DnsName::parse(name)?;
        let found = self.locate(&name)?;
        if !self
            .chain()
            .is_contract(found.resolver)
        {
            return Err(ResolveError::ResolverNotContract(found.resolver));
        }

        let capability = Capability::probe(self.chain(), found.resolver);
        if !capability.is_wildcard() && !found.is_exact() {
            return Err(ResolveError::ResolverWildcardNotSupported(found.resolver));
        }

        Ok(Target {
            name,
            resolver: found.resolver,
            capability,
        })
    }

    /// Sends every call to the target, wrapped in `resolve(name, call)` when
    /// the resolver supports it.
    pub(crate) fn dispatch(
        &self,
        target: &Target<'_>,
        calls: Vec<Bytes>,
    ) -> Batch {
        let wildcard = target.capability.is_wildcard();
        let steps = calls
            .into_iter()
            .map(|call| {
                let call = if wildcard {
                    IExtendedResolver::resolveCall {
                        name: Bytes::copy_from_slice(target.name.as_bytes()),
                        data: call,
                    }
                    .abi_encode()
                    .into()
                } else {
                    call
                };
                self.invoke(target.resolver, call, wildcard)
            })
            .collect();

        Batch {
            resolver: target.resolver,
            steps,
        }
    }

    /// Calls the resolver once. With `unwrap`, a successful reply is the ABI
    /// encoding of the real answer as `bytes`.
    pub(crate) fn invoke(
        &self,
        resolver: Address,
        call: Bytes,
        unwrap: bool,
    ) -> Step {
        let result = match self
            .chain()
            .static_call(resolver, &call)
        {
            CallOutcome::Success(data) if unwrap => match Bytes::abi_decode(&data, true) {
                Ok(answer) => CallResult::ok(answer),
                Err(_) => {
                    debug!(%resolver, "wrapped reply is not bytes");
                    CallResult::failed(data)
                },
            },
            CallOutcome::Success(data) => CallResult::ok(data),
            CallOutcome::Revert(data) => match OffchainLookup::from_revert_data(&data) {
                Some(lookup) if lookup.sender == resolver => return Step::Pending(lookup),
                Some(lookup) => {
                    debug!(
                        %resolver,
                        sender = %lookup.sender,
                        "ignoring off-chain lookup raised on behalf of another contract"
                    );
                    CallResult::failed(data)
                },
                None => CallResult::failed(data),
            },
        };

        trace!(%resolver, success = result.success, "resolver call settled");
        Step::Done { call, result }
    }

    /// Returns the batch results, or suspends the whole batch when any
    /// sub-query is waiting on a gateway.
    pub(crate) fn settle(
        &self,
        batch: Batch,
        suspend: Suspend,
    ) -> Result<Vec<CallResult>> {
        if !batch
            .steps
            .iter()
            .any(Step::is_pending)
        {
            let results: Vec<CallResult> = batch
                .steps
                .into_iter()
                .filter_map(|step| match step {
                    Step::Done { result, .. } => Some(result),
                    Step::Failed(error) => Some(CallResult::failed(error)),
                    Step::Pending(_) => None,
                })
                .collect();
            for _ in results.iter().filter(|result| !result.success) {
                telemetry::resolver_error();
            }
            return Ok(results);
        }

        let (calls, requests) = gateway::aggregate(batch.steps);
        let state = ContinuationState {
            bundled_multicall: suspend.bundled_multicall,
            resolver: batch.resolver,
            urls: suspend.urls.clone(),
            metadata: suspend.metadata,
            calls,
        };
        let lookup = OffchainLookup {
            sender: self.address(),
            urls: suspend.urls,
            call_data: encode_query(&requests),
            callback_function: suspend.callback,
            extra_data: state.encode(),
        };

        telemetry::offchain_lookup();
        info!(
            resolver = %batch.resolver,
            requests = requests.len(),
            items = state.calls.len(),
            callback = %suspend.callback,
            "suspending for off-chain data"
        );
        Err(ResolveError::OffchainLookup(Box::new(lookup)))
    }
}

/// The calls bundled in a `multicall`, if `data` is one.
fn unbundle(data: &[u8]) -> Option<Vec<Bytes>> {
    if !data.starts_with(&IMulticallable::multicallCall::SELECTOR) {
        return None;
    }
    IMulticallable::multicallCall::abi_decode(data, true)
        .ok()
        .map(|multicall| multicall.data)
}

/// Collapses batch results into the answer of a single-call request.
pub(crate) fn finish_single(
    results: Vec<CallResult>,
    bundled_multicall: bool,
) -> Result<Bytes> {
    if bundled_multicall {
        let answers: Vec<Bytes> = results
            .into_iter()
            .map(|result| result.returnData)
            .collect();
        return Ok(answers.abi_encode().into());
    }

    let count = results.len();
    let mut results = results.into_iter();
    match (results.next(), results.next()) {
        (Some(result), None) => check_single(result),
        _ => Err(MessageError::SingleCallExpected(count).into()),
    }
}

/// A failed single call becomes the request's error.
fn check_single(result: CallResult) -> Result<Bytes> {
    if result.success {
        return Ok(result.returnData);
    }
    match http_error_items(&result.returnData) {
        Some(errors) => Err(ResolveError::HttpError(errors)),
        None => Err(ResolveError::ResolverError(result.returnData)),
    }
}
