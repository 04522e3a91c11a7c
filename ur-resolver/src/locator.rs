//! Finds the resolver responsible for a name.
use alloy_primitives::Address;
use tracing::debug;
use ur_messages::Node;

use crate::error::ResolveError;
use crate::error::Result;
use crate::name::DnsName;
use crate::universal::UniversalResolver;
use crate::world::Chain;
use crate::world::Registry;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ResolverMatch {
    pub resolver: Address,

    /// Node of the ancestor the resolver is bound to.
    pub node: Node,

    /// Encoded bytes of the leaf labels the resolver answers for by wildcard.
    pub offset: usize,
}

impl ResolverMatch {
    /// Whether the resolver is bound to the queried name itself.
    pub fn is_exact(&self) -> bool {
        self.offset == 0
    }
}

impl<R: Registry, C: Chain> UniversalResolver<R, C> {
    /// Walks from the leaf to the root and returns the first ancestor bound to
    /// a deployed resolver.
    pub fn find_resolver(
        &self,
        name: &[u8],
    ) -> Result<ResolverMatch> {
        let name = DnsName::parse(name)?;
        self.locate(&name)
    }

    pub(crate) fn locate(
        &self,
        name: &DnsName<'_>,
    ) -> Result<ResolverMatch> {
        for ancestor in name.ancestors() {
            let resolver = self
                .registry()
                .resolver(ancestor.node);
            if resolver.is_zero() {
                continue;
            }
            if !self
                .chain()
                .is_contract(resolver)
            {
                debug!(
                    %resolver,
                    node = %ancestor.node,
                    "skipping resolver binding without code"
                );
                continue;
            }

            return Ok(ResolverMatch {
                resolver,
                node: ancestor.node,
                offset: ancestor.offset,
            });
        }

        debug!(%name, "no resolver bound on any ancestor");
        Err(ResolveError::ResolverNotFound)
    }
}
