//! Collaborators the core reads from. Neither is ever mutated here.
use alloy_primitives::Address;
use alloy_primitives::Bytes;
use ur_messages::Node;

/// Name registry: one resolver binding per node, `Address::ZERO` when unset.
pub trait Registry {
    fn resolver(
        &self,
        node: Node,
    ) -> Address;
}

/// Result of a read-only contract call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CallOutcome {
    Success(Bytes),
    Revert(Bytes),
}

/// Read-only view of deployed contracts.
///
/// Calls are synchronous and must not block on external I/O; a resolver that
/// needs external data reverts with an `OffchainLookup` instead.
pub trait Chain {
    /// Whether `address` holds executable code.
    fn is_contract(
        &self,
        address: Address,
    ) -> bool;

    fn static_call(
        &self,
        to: Address,
        data: &[u8],
    ) -> CallOutcome;
}

impl<T: Registry + ?Sized> Registry for &T {
    fn resolver(
        &self,
        node: Node,
    ) -> Address {
        (**self).resolver(node)
    }
}

impl<T: Chain + ?Sized> Chain for &T {
    fn is_contract(
        &self,
        address: Address,
    ) -> bool {
        (**self).is_contract(address)
    }

    fn static_call(
        &self,
        to: Address,
        data: &[u8],
    ) -> CallOutcome {
        (**self).static_call(to, data)
    }
}
