//! Moments Storage Library
//!
//! Storage network abstraction for the moments uploader. A [`StorageNetwork`]
//! is a pay-per-byte decentralized store exposing price, balance, fund and
//! upload operations. Two adapters are provided:
//!
//! - **Bundlr**: accepts buffered and streamed uploads (primary by default)
//! - **Irys**: accepts buffered uploads only (secondary by default)
//!
//! Both speak the same bundler-node REST dialect through a shared node client.
//! Handles are only handed out by the async factory once the node has answered
//! a readiness probe.

#[cfg(feature = "network-bundlr")]
pub mod bundlr;
pub mod factory;
#[cfg(feature = "network-irys")]
pub mod irys;
pub(crate) mod node;
pub mod tags;
pub mod traits;

// Re-export commonly used types
#[cfg(feature = "network-bundlr")]
pub use bundlr::BundlrNetwork;
pub use factory::{create_network, create_networks, Credentials, Networks};
#[cfg(feature = "network-irys")]
pub use irys::IrysNetwork;
pub use moments_core::{Amount, NetworkKind};
pub use tags::{Tag, TagSet};
pub use traits::{
    ByteReader, FundReceipt, NetworkError, NetworkResult, StorageNetwork, UploadReceipt,
};
