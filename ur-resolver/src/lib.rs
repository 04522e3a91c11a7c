//! Name resolution through a chain of per-name resolvers, with EIP-3668
//! off-chain continuations.
pub mod dispatch;
pub mod error;
mod gateway;
pub mod locator;
pub mod name;
pub mod resume;
pub mod reverse;
mod telemetry;
pub mod universal;
pub mod world;

#[cfg(any(test, feature = "dummy-resolvers"))]
pub mod dummy;


pub use error::ResolveError;
pub use error::Result;
pub use universal::UniversalResolver;
