//! JSON description of a registry and its resolver contracts.
use std::collections::BTreeMap;
use std::path::Path;

use alloy_primitives::Address;
use alloy_primitives::Bytes;
use anyhow::ensure;
use anyhow::Context;
use serde_derive::Deserialize;
use tracing::debug;
use ur_messages::CoinType;
use ur_resolver::dummy::InMemoryChain;
use ur_resolver::dummy::InMemoryRegistry;
use ur_resolver::dummy::LegacyResolver;
use ur_resolver::dummy::OffchainResolver;
use ur_resolver::dummy::PublicResolver;
use ur_resolver::dummy::RevertResolver;

#[derive(Deserialize, Debug, Clone)]
pub(crate) struct Fixture
{
    /// Name to resolver address.
    #[serde(default)]
    pub(crate) registry: BTreeMap<String, Address>,

    #[serde(default)]
    pub(crate) resolvers: Vec<ResolverFixture>,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub(crate) enum ResolverFixture
{
    Public
    {
        address: Address,
        #[serde(default)]
        addrs: BTreeMap<String, Address>,
        #[serde(default)]
        coin_addrs: Vec<CoinAddrFixture>,
        #[serde(default)]
        texts: Vec<TextFixture>,
        /// Reverse name to primary name.
        #[serde(default)]
        names: BTreeMap<String, String>,
    },
    Offchain
    {
        address: Address,
        urls: Vec<String>,
        #[serde(default)]
        primary_name: String,
        /// Inner call selector to the answer returned without a lookup.
        #[serde(default)]
        onchain_answers: BTreeMap<String, Bytes>,
    },
    Legacy
    {
        address: Address,
        addr: Address,
    },
    Revert
    {
        address: Address,
    },
}

#[derive(Deserialize, Debug, Clone)]
pub(crate) struct CoinAddrFixture
{
    name: String,
    coin_type: CoinType,
    address: Bytes,
}

#[derive(Deserialize, Debug, Clone)]
pub(crate) struct TextFixture
{
    name: String,
    key: String,
    value: String,
}

impl Fixture
{
    pub(crate) fn load(path: &Path) -> anyhow::Result<Fixture>
    {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to open `{}`", path.display()))?;
        serde_json::from_str(&content).context("failed to parse fixture JSON")
    }

    pub(crate) fn into_world(self) -> anyhow::Result<(InMemoryRegistry, InMemoryChain)>
    {
        let mut registry = InMemoryRegistry::default();
        for (name, resolver) in &self.registry
        {
            registry.set_resolver(name, *resolver);
        }

        let mut chain = InMemoryChain::default();
        for resolver in self.resolvers
        {
            resolver.deploy(&mut chain)?;
        }

        debug!(
            bindings = self.registry.len(),
            "fixture world ready"
        );
        Ok((registry, chain))
    }
}

impl ResolverFixture
{
    fn deploy(
        self,
        chain: &mut InMemoryChain,
    ) -> anyhow::Result<()>
    {
        match self
        {
            ResolverFixture::Public {
                address,
                addrs,
                coin_addrs,
                texts,
                names,
            } =>
            {
                let mut resolver = PublicResolver::default();
                for (name, addr) in addrs
                {
                    resolver = resolver.with_addr(&name, addr);
                }
                for coin_addr in coin_addrs
                {
                    resolver = resolver.with_coin_addr(
                        &coin_addr.name,
                        coin_addr.coin_type,
                        coin_addr.address,
                    );
                }
                for text in texts
                {
                    resolver = resolver.with_text(&text.name, &text.key, &text.value);
                }
                for (name, primary) in names
                {
                    resolver = resolver.with_name(&name, &primary);
                }
                chain.deploy(address, resolver);
            },
            ResolverFixture::Offchain {
                address,
                urls,
                primary_name,
                onchain_answers,
            } =>
            {
                let mut resolver = OffchainResolver::new(address, urls, &primary_name);
                for (selector, answer) in onchain_answers
                {
                    resolver = resolver.with_onchain_answer(parse_selector(&selector)?, answer);
                }
                chain.deploy(address, resolver);
            },
            ResolverFixture::Legacy { address, addr } =>
            {
                chain.deploy(address, LegacyResolver::new(addr));
            },
            ResolverFixture::Revert { address } =>
            {
                chain.deploy(address, RevertResolver);
            },
        }
        Ok(())
    }
}

fn parse_selector(selector: &str) -> anyhow::Result<[u8; 4]>
{
    let mut bytes = [0u8; 4];
    let digits = selector
        .strip_prefix("0x")
        .unwrap_or(selector);
    ensure!(
        digits.len() == 8,
        "selector `{selector}` is not 4 bytes"
    );
    hex::decode_to_slice(digits, &mut bytes).with_context(|| format!("invalid selector `{selector}`"))?;
    Ok(bytes)
}
