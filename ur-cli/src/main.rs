use std::panic;
use std::path::PathBuf;

use alloy_primitives::Address;
use alloy_primitives::Bytes;
use anyhow::Context;
use backtrace::Backtrace;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use serde_json::json;
use serde_json::Value;
use tracing::error;
use tracing::info;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use ur_messages::abi::CallResult;
use ur_messages::CoinType;
use ur_messages::ETH_COIN_TYPE;
use ur_resolver::dummy::InMemoryChain;
use ur_resolver::dummy::InMemoryRegistry;
use ur_resolver::name::dns_encode;
use ur_resolver::name::namehash;
use ur_resolver::reverse::ReverseResult;
use ur_resolver::ResolveError;
use ur_resolver::UniversalResolver;

use crate::config::Config;
use crate::fixture::Fixture;

mod config;
mod fixture;

type Resolver = UniversalResolver<InMemoryRegistry, InMemoryChain>;

#[derive(Parser, Clone, Debug)]
/// Resolve names against a fixture world and print the outcome as JSON.
///
/// A request that needs gateway data prints the `offchain_lookup` to serve;
/// feed the gateway reply back with `resume`.
struct Cli {
    /// Path to the configuration file.
    #[clap(short, long)]
    config: Option<String>,

    /// If set, output logs in JSON format.
    #[clap(short, long, action)]
    json: bool,

    /// Registry bindings and resolver contracts, as JSON.
    #[clap(short, long)]
    fixture: PathBuf,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Clone, Debug)]
enum Command {
    /// Print the DNS encoding and node of a name.
    EncodeName { name: String },

    /// Find the resolver responsible for a name.
    FindResolver { name: String },

    /// Resolve one record; `data` is the hex resolver call.
    Resolve {
        name: String,
        data: Bytes,

        /// Batch gateways replacing the configured ones.
        #[clap(long = "gateway")]
        gateways: Vec<String>,
    },

    /// Resolve several records of the same name.
    ResolveBatch {
        name: String,
        #[clap(required = true)]
        calls: Vec<Bytes>,

        #[clap(long = "gateway")]
        gateways: Vec<String>,
    },

    /// Find the primary name of an address and verify it.
    Reverse {
        address: Address,

        #[clap(long, default_value_t = ETH_COIN_TYPE)]
        coin_type: CoinType,

        #[clap(long = "gateway")]
        gateways: Vec<String>,
    },

    /// Resume a suspended request with the batch gateway reply.
    Resume {
        #[clap(value_enum)]
        callback: Callback,
        response: Bytes,
        extra_data: Bytes,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Callback {
    Single,
    Batch,
    Reverse,
}

fn setup_logging(json: bool) {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy();
    if json {
        let subscriber = tracing_subscriber::fmt()
            .json()
            .with_level(true)
            .with_file(true)
            .with_line_number(true)
            .with_target(true)
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .finish();
        tracing::subscriber::set_global_default(subscriber).expect("Setting up logging failed");
    } else {
        let subscriber = tracing_subscriber::fmt()
            .pretty()
            .compact()
            .with_level(true)
            .with_file(false)
            .with_line_number(false)
            .without_time()
            .with_target(false)
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .finish();
        tracing::subscriber::set_global_default(subscriber).expect("Setting up logging failed");
    };
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.json);

    panic::set_hook(Box::new(|panic_info| {
        let msg = match panic_info.payload().downcast_ref::<&'static str>() {
            Some(s) => *s,
            None => {
                match panic_info.payload().downcast_ref::<String>() {
                    Some(s) => &s[..],
                    None => "Box<dyn Any>",
                }
            },
        };
        let (file, lineno, col) = match panic_info.location() {
            Some(l) => (l.file(), l.line(), l.column()),
            None => ("<unknown>", 0, 0),
        };

        error!(
            msg,
            file,
            lineno,
            col,
            "Panic occurred: {:?}",
            Backtrace::new(),
        );
    }));

    let config = Config::load(cli.config)?;
    config.validate();

    let (registry, chain) = Fixture::load(&cli.fixture)?
        .into_world()
        .context("while deploying the fixture")?;
    let resolver = UniversalResolver::new(
        config.resolver.address,
        registry,
        chain,
        config
            .resolver
            .batch_gateway_urls,
    );
    info!(address = %resolver.address(), "universal resolver ready");

    let output = run(&resolver, cli.command)?;
    println!(
        "{}",
        serde_json::to_string_pretty(&output)?
    );
    Ok(())
}

fn run(
    resolver: &Resolver,
    command: Command,
) -> anyhow::Result<Value> {
    let output = match command {
        Command::EncodeName { name } => {
            json!({
                "dns": dns_encode(&name)?,
                "node": namehash(&name),
            })
        },
        Command::FindResolver { name } => {
            let found = resolver.find_resolver(&dns_encode(&name)?)?;
            json!({
                "resolver": found.resolver,
                "node": found.node,
                "offset": found.offset,
            })
        },
        Command::Resolve {
            name,
            data,
            gateways,
        } => {
            let result = resolver.resolve(&dns_encode(&name)?, &data, gateways_of(&gateways));
            render(result, |(result, used)| {
                json!({
                    "result": result,
                    "resolver": used,
                })
            })
        },
        Command::ResolveBatch {
            name,
            calls,
            gateways,
        } => {
            let result = resolver.resolve_batch(&dns_encode(&name)?, &calls, gateways_of(&gateways));
            render(result, |(results, used)| {
                json!({
                    "results": call_results(results),
                    "resolver": used,
                })
            })
        },
        Command::Reverse {
            address,
            coin_type,
            gateways,
        } => render(
            resolver.reverse(address, coin_type, gateways_of(&gateways)),
            reverse_result,
        ),
        Command::Resume {
            callback: Callback::Single,
            response,
            extra_data,
        } => render(
            resolver.resolve_single_callback(&response, &extra_data),
            |(result, used)| {
                json!({
                    "result": result,
                    "resolver": used,
                })
            },
        ),
        Command::Resume {
            callback: Callback::Batch,
            response,
            extra_data,
        } => render(
            resolver.resolve_callback(&response, &extra_data),
            |(results, used)| {
                json!({
                    "results": call_results(results),
                    "resolver": used,
                })
            },
        ),
        Command::Resume {
            callback: Callback::Reverse,
            response,
            extra_data,
        } => render(
            resolver.reverse_callback(&response, &extra_data),
            reverse_result,
        ),
    };
    Ok(output)
}

fn gateways_of(gateways: &[String]) -> Option<&[String]> {
    (!gateways.is_empty()).then_some(gateways)
}

/// Suspensions and resolution failures are outcomes to print, not errors of
/// the tool.
fn render<T>(
    result: ur_resolver::Result<T>,
    ok: impl FnOnce(T) -> Value,
) -> Value {
    match result {
        Ok(value) => ok(value),
        Err(ResolveError::OffchainLookup(lookup)) => json!({ "offchain_lookup": lookup }),
        Err(error) => {
            json!({
                "error": error.to_string(),
                "revert_data": error.revert_data(),
            })
        },
    }
}

fn call_results(results: Vec<CallResult>) -> Value {
    results
        .into_iter()
        .map(|result| {
            json!({
                "success": result.success,
                "return_data": result.returnData,
            })
        })
        .collect()
}

fn reverse_result(result: ReverseResult) -> Value {
    json!({
        "name": result.name,
        "resolved_address": result.resolved_address,
        "reverse_resolver": result.reverse_resolver,
        "resolver": result.resolver,
    })
}
