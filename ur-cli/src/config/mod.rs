use alloy_primitives::Address;
use anyhow::Context;
use config::FileFormat;
use lazy_static_include::*;
use serde_derive::Deserialize;
use tracing::debug;

lazy_static_include_str! {
    DEFAULT_CONFIG => "src/config/default.toml",
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub(crate) struct Config
{
    pub(crate) resolver: ResolverConfig,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub(crate) struct ResolverConfig
{
    /// Address suspended requests resume at.
    pub(crate) address: Address,
    /// Gateways used when a request does not bring its own.
    pub(crate) batch_gateway_urls: Vec<String>,
}

impl ResolverConfig
{
    pub fn validate(&self)
    {
        assert!(
            !self
                .address
                .is_zero(),
            "Universal resolver address is required"
        );
        assert!(
            !self
                .batch_gateway_urls
                .is_empty(),
            "At least one batch gateway URL is required"
        );
        assert!(
            self.batch_gateway_urls
                .iter()
                .all(|url| !url.is_empty()),
            "Batch gateway URLs must not be empty"
        );
    }
}

impl Config
{
    pub fn load(local_file: Option<String>) -> anyhow::Result<Config>
    {
        let mut config_builder = config::Config::builder();
        config_builder = config_builder.add_source(
            config::File::from_str(
                &DEFAULT_CONFIG,
                FileFormat::Toml,
            ),
        );

        if let Some(local_file) = local_file
        {
            debug!(
                "Loading local configuration from {}",
                local_file
            );
            config_builder = config_builder.add_source(config::File::with_name(&local_file));
        }

        let config_builder = config_builder
            .add_source(
                config::Environment::with_prefix("UR")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("resolver.batch_gateway_urls")
                    .try_parsing(true)
                    .ignore_empty(true),
            )
            .build()
            .context("Could not load configuration")?;

        config_builder
            .try_deserialize()
            .context("Could not deserialize configuration")
    }

    pub fn validate(&self)
    {
        self.resolver
            .validate();
    }
}
