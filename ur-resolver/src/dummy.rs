//! In-memory registry and chain with scripted resolver contracts.
use std::collections::HashMap;
use std::collections::HashSet;

use alloy_primitives::Address;
use alloy_primitives::Bytes;
use alloy_primitives::FixedBytes;
use alloy_sol_types::Revert;
use alloy_sol_types::SolCall;
use alloy_sol_types::SolError;
use alloy_sol_types::SolValue;
use tracing::trace;
use ur_messages::abi;
use ur_messages::abi::IAddrResolver;
use ur_messages::abi::IAddressResolver;
use ur_messages::abi::IERC165;
use ur_messages::abi::IExtendedResolver;
use ur_messages::abi::IMulticallable;
use ur_messages::abi::INameResolver;
use ur_messages::abi::ITextResolver;
use ur_messages::abi::IUniversalResolver;
use ur_messages::abi::EXTENDED_RESOLVER_INTERFACE_ID;
use ur_messages::CoinType;
use ur_messages::Node;
use ur_messages::ETH_COIN_TYPE;

use crate::name::namehash;
use crate::world::CallOutcome;
use crate::world::Chain;
use crate::world::Registry;

/// A deployed contract answering read-only calls.
pub trait DummyContract {
    fn call(
        &self,
        data: &[u8],
    ) -> CallOutcome;
}

#[derive(Default)]
pub struct InMemoryRegistry {
    resolvers: HashMap<Node, Address>,
}

impl InMemoryRegistry {
    pub fn set_resolver(
        &mut self,
        name: &str,
        resolver: Address,
    ) {
        self.resolvers
            .insert(namehash(name), resolver);
    }

    pub fn with_resolver(
        mut self,
        name: &str,
        resolver: Address,
    ) -> Self {
        self.set_resolver(name, resolver);
        self
    }
}

impl Registry for InMemoryRegistry {
    fn resolver(
        &self,
        node: Node,
    ) -> Address {
        self.resolvers
            .get(&node)
            .copied()
            .unwrap_or_default()
    }
}

/// Addresses without a deployed contract behave like externally owned
/// accounts: every call succeeds with no data.
#[derive(Default)]
pub struct InMemoryChain {
    contracts: HashMap<Address, Box<dyn DummyContract>>,
}

impl InMemoryChain {
    pub fn deploy(
        &mut self,
        address: Address,
        contract: impl DummyContract + 'static,
    ) {
        self.contracts
            .insert(address, Box::new(contract));
    }

    pub fn with_contract(
        mut self,
        address: Address,
        contract: impl DummyContract + 'static,
    ) -> Self {
        self.deploy(address, contract);
        self
    }
}

impl Chain for InMemoryChain {
    fn is_contract(
        &self,
        address: Address,
    ) -> bool {
        self.contracts
            .contains_key(&address)
    }

    fn static_call(
        &self,
        to: Address,
        data: &[u8],
    ) -> CallOutcome {
        let outcome = match self.contracts.get(&to) {
            Some(contract) => contract.call(data),
            None => CallOutcome::Success(Bytes::new()),
        };
        trace!(%to, reverted = matches!(outcome, CallOutcome::Revert(_)), "static call");
        outcome
    }
}

fn decode_call<T: SolCall>(data: &[u8]) -> Option<T> {
    if !data.starts_with(&T::SELECTOR) {
        return None;
    }
    T::abi_decode(data, true).ok()
}

fn supports_interface(
    data: &[u8],
    extended: bool,
) -> Option<CallOutcome> {
    let call = decode_call::<IERC165::supportsInterfaceCall>(data)?;
    let supported = call.interfaceID == FixedBytes::from(EXTENDED_RESOLVER_INTERFACE_ID) && extended;
    Some(ok(supported.abi_encode()))
}

fn selector(data: &[u8]) -> Option<[u8; 4]> {
    data.get(..4)
        .and_then(|selector| <[u8; 4]>::try_from(selector).ok())
}

fn ok(data: Vec<u8>) -> CallOutcome {
    CallOutcome::Success(data.into())
}

fn revert_empty() -> CallOutcome {
    CallOutcome::Revert(Bytes::new())
}

/// Record storage answering direct calls for the nodes it holds. Does not
/// support wildcard resolution.
#[derive(Clone, Debug, Default)]
pub struct PublicResolver {
    addrs: HashMap<Node, Address>,
    coin_addrs: HashMap<(Node, CoinType), Bytes>,
    texts: HashMap<(Node, String), String>,
    names: HashMap<Node, String>,
}

impl PublicResolver {
    pub fn with_addr(
        mut self,
        name: &str,
        address: Address,
    ) -> Self {
        self.addrs
            .insert(namehash(name), address);
        self
    }

    pub fn with_coin_addr(
        mut self,
        name: &str,
        coin_type: CoinType,
        address: Bytes,
    ) -> Self {
        self.coin_addrs
            .insert((namehash(name), coin_type), address);
        self
    }

    pub fn with_text(
        mut self,
        name: &str,
        key: &str,
        value: &str,
    ) -> Self {
        self.texts
            .insert((namehash(name), key.to_string()), value.to_string());
        self
    }

    pub fn with_name(
        mut self,
        name: &str,
        primary: &str,
    ) -> Self {
        self.names
            .insert(namehash(name), primary.to_string());
        self
    }

    fn coin_addr(
        &self,
        node: Node,
        coin_type: CoinType,
    ) -> Bytes {
        if coin_type == ETH_COIN_TYPE {
            return self
                .addrs
                .get(&node)
                .map(|address| Bytes::copy_from_slice(address.as_slice()))
                .unwrap_or_default();
        }
        self.coin_addrs
            .get(&(node, coin_type))
            .cloned()
            .unwrap_or_default()
    }
}

impl DummyContract for PublicResolver {
    fn call(
        &self,
        data: &[u8],
    ) -> CallOutcome {
        if let Some(outcome) = supports_interface(data, false) {
            return outcome;
        }
        if let Some(call) = decode_call::<IAddrResolver::addrCall>(data) {
            let address = self
                .addrs
                .get(&call.node)
                .copied()
                .unwrap_or_default();
            return ok(address.abi_encode());
        }
        if let Some(call) = decode_call::<IAddressResolver::addrCall>(data) {
            let Ok(coin_type) = CoinType::try_from(call.coinType) else {
                return ok(Bytes::new().abi_encode());
            };
            return ok(self
                .coin_addr(call.node, coin_type)
                .abi_encode());
        }
        if let Some(call) = decode_call::<INameResolver::nameCall>(data) {
            let name = self
                .names
                .get(&call.node)
                .cloned()
                .unwrap_or_default();
            return ok(name.abi_encode());
        }
        if let Some(call) = decode_call::<ITextResolver::textCall>(data) {
            let value = self
                .texts
                .get(&(call.node, call.key))
                .cloned()
                .unwrap_or_default();
            return ok(value.abi_encode());
        }
        if let Some(call) = decode_call::<IMulticallable::multicallCall>(data) {
            let mut results = Vec::with_capacity(call.data.len());
            for inner in &call.data {
                match self.call(inner) {
                    CallOutcome::Success(result) => results.push(result),
                    revert => return revert,
                }
            }
            return ok(results.abi_encode());
        }
        revert_empty()
    }
}

/// Prefix of the `extraData` of a second off-chain round.
const SECOND_ROUND: [u8; 4] = *b"more";

/// Wildcard resolver serving every record from a gateway.
///
/// `resolve(name, data)` suspends with `callData = extraData = data` and
/// resumes through `resolveCallback`, which answers `name(bytes32)` with
/// `primary_name`, `addr(bytes32,uint256)` with the resolver's address as
/// `bytes` and everything else with the resolver's own address.
/// Selectors registered with [`OffchainResolver::with_onchain_answer`] are
/// answered without going off-chain, those registered with
/// [`OffchainResolver::with_second_round`] need two gateway round trips.
#[derive(Clone, Debug)]
pub struct OffchainResolver {
    address: Address,
    urls: Vec<String>,
    primary_name: String,
    onchain: HashMap<[u8; 4], Bytes>,
    second_round: HashSet<[u8; 4]>,
}

impl OffchainResolver {
    pub fn new(
        address: Address,
        urls: Vec<String>,
        primary_name: &str,
    ) -> Self {
        Self {
            address,
            urls,
            primary_name: primary_name.to_string(),
            onchain: HashMap::new(),
            second_round: HashSet::new(),
        }
    }

    pub fn with_onchain_answer(
        mut self,
        selector: [u8; 4],
        answer: Bytes,
    ) -> Self {
        self.onchain
            .insert(selector, answer);
        self
    }

    pub fn with_second_round(
        mut self,
        selector: [u8; 4],
    ) -> Self {
        self.second_round
            .insert(selector);
        self
    }

    fn resolve(
        &self,
        data: Bytes,
    ) -> CallOutcome {
        if let Some(answer) = selector(&data).and_then(|selector| self.onchain.get(&selector)) {
            return ok(answer.abi_encode());
        }
        self.lookup(data)
    }

    fn lookup(
        &self,
        data: Bytes,
    ) -> CallOutcome {
        let lookup = abi::OffchainLookup {
            sender: self.address,
            urls: self.urls.clone(),
            callData: data.clone(),
            callbackFunction: IUniversalResolver::resolveCallbackCall::SELECTOR.into(),
            extraData: data,
        };
        CallOutcome::Revert(lookup.abi_encode().into())
    }

    fn callback(
        &self,
        response: Bytes,
        extra_data: Bytes,
    ) -> CallOutcome {
        if response != extra_data {
            return CallOutcome::Revert(revert_reason("Response data error"));
        }

        let data = match extra_data.strip_prefix(SECOND_ROUND.as_slice()) {
            Some(data) => data,
            None if selector(&extra_data).is_some_and(|selector| self.second_round.contains(&selector)) => {
                return self.lookup([SECOND_ROUND.as_slice(), &extra_data[..]].concat().into());
            },
            None => &extra_data[..],
        };

        let answer = if data.starts_with(&INameResolver::nameCall::SELECTOR) {
            self.primary_name.abi_encode()
        } else if data.starts_with(&IAddressResolver::addrCall::SELECTOR) {
            Bytes::copy_from_slice(self.address.as_slice()).abi_encode()
        } else {
            self.address.abi_encode()
        };
        ok(Bytes::from(answer).abi_encode())
    }
}

impl DummyContract for OffchainResolver {
    fn call(
        &self,
        data: &[u8],
    ) -> CallOutcome {
        if let Some(outcome) = supports_interface(data, true) {
            return outcome;
        }
        if let Some(call) = decode_call::<IExtendedResolver::resolveCall>(data) {
            return self.resolve(call.data);
        }
        if let Some(call) = decode_call::<IUniversalResolver::resolveCallbackCall>(data) {
            return self.callback(call.response, call.extraData);
        }
        revert_empty()
    }
}

/// Pre-ERC-165 resolver: the capability probe reverts, `addr(bytes32)`
/// answers `addr` for every node.
#[derive(Clone, Debug)]
pub struct LegacyResolver {
    addr: Address,
}

impl LegacyResolver {
    pub fn new(addr: Address) -> Self {
        Self { addr }
    }
}

impl DummyContract for LegacyResolver {
    fn call(
        &self,
        data: &[u8],
    ) -> CallOutcome {
        if decode_call::<IAddrResolver::addrCall>(data).is_some() {
            return ok(self.addr.abi_encode());
        }
        revert_empty()
    }
}

/// Claims wildcard support, then reverts every call with
/// `Error("Not Supported")`.
#[derive(Clone, Debug, Default)]
pub struct RevertResolver;

impl DummyContract for RevertResolver {
    fn call(
        &self,
        data: &[u8],
    ) -> CallOutcome {
        if let Some(outcome) = supports_interface(data, true) {
            return outcome;
        }
        CallOutcome::Revert(revert_reason("Not Supported"))
    }
}

pub fn revert_reason(reason: &str) -> Bytes {
    Revert {
        reason: reason.to_string(),
    }
    .abi_encode()
    .into()
}
