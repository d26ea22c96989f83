//! VESS Core: Identifier primitives, timestamps, errors, and engine
//! configuration shared by the VESS credential crates.

pub mod config;
pub mod error;
pub mod timestamp;
pub mod types;

pub use config::{EngineConfig, Eip712Config, LoggingConfig};
pub use error::CoreError;
pub use types::{is_did_string, is_ethereum_address, Did, ETH_CHAIN_ID, PKH_DID_PREFIX};
