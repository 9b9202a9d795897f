//! Lazily built, cached provider singletons.
//!
//! A [`ProviderRegistry`] owns one [`Factory`] per registered name. Each factory
//! keeps the instance its registration function produced; the registry rebuilds
//! it only when a change predicate reports that configuration went stale.

pub mod errors;
pub mod factory;
pub mod key;
pub mod registry;

pub use errors::{BoxError, ProviderError, ProviderResult};
pub use factory::Factory;
pub use key::ProviderKey;
pub use registry::{ProviderRegistry, UpdateCheck, no_updates};
pub use wte_common::RunMode;
