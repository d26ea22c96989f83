use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// CAIP-2 chain reference for Ethereum mainnet, as used inside `did:pkh`.
pub const ETH_CHAIN_ID: &str = "eip155:1:";

/// Prefix of every issuer DID derived from an Ethereum address.
pub const PKH_DID_PREFIX: &str = "did:pkh:eip155:1:";

/// Whether `value` is a `0x`-prefixed, 20-byte hex address (any case).
pub fn is_ethereum_address(value: &str) -> bool {
    let Some(hex) = value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
    else {
        return false;
    };
    hex.len() == 40 && hex.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Whether `value` has the shape `did:<method>:<method-specific-id>`.
///
/// The method is alphanumeric; the identifier may also contain `.`, `-`,
/// `:` and `_`.
pub fn is_did_string(value: &str) -> bool {
    let Some(rest) = value.strip_prefix("did:") else {
        return false;
    };
    let Some((method, id)) = rest.split_once(':') else {
        return false;
    };
    !method.is_empty()
        && method.bytes().all(|b| b.is_ascii_alphanumeric())
        && !id.is_empty()
        && id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'.' | b'-' | b':' | b'_'))
}

/// Decentralized Identifier of a credential issuer or holder.
///
/// Issuers are identified by `did:pkh:eip155:1:<lower-case address>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Did(String);

impl Did {
    /// Parse an existing DID string.
    pub fn parse(uri: impl Into<String>) -> Result<Self, CoreError> {
        let uri = uri.into();
        if !is_did_string(&uri) {
            return Err(CoreError::InvalidDid(format!(
                "expected 'did:<method>:<identifier>', got: {}",
                uri
            )));
        }
        Ok(Self(uri))
    }

    /// Derive the issuer DID for an Ethereum address.
    ///
    /// Raw addresses are lower-cased and prefixed with [`PKH_DID_PREFIX`].
    /// Input that is already DID-shaped passes through unchanged.
    pub fn from_address(address: &str) -> Result<Self, CoreError> {
        if is_ethereum_address(address) {
            return Ok(Self(format!(
                "{}{}",
                PKH_DID_PREFIX,
                address.to_ascii_lowercase()
            )));
        }
        if is_did_string(address) {
            return Ok(Self(address.to_string()));
        }
        Err(CoreError::InvalidAddress(format!(
            "expected a 0x-prefixed 20-byte address or a DID, got: {:?}",
            address
        )))
    }

    /// Get the full DID URI.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Extract the method (`pkh`, `key`, ...).
    pub fn method(&self) -> Option<&str> {
        self.0.split(':').nth(1)
    }

    /// Extract the method-specific identifier.
    pub fn method_specific_id(&self) -> Option<&str> {
        self.0.splitn(3, ':').nth(2)
    }

    /// The Ethereum address embedded in a mainnet `did:pkh` identifier.
    pub fn ethereum_address(&self) -> Option<&str> {
        let prefix = self.0.get(..PKH_DID_PREFIX.len())?;
        if !prefix.eq_ignore_ascii_case(PKH_DID_PREFIX) {
            return None;
        }
        let address = &self.0[PKH_DID_PREFIX.len()..];
        is_ethereum_address(address).then_some(address)
    }

    /// Verification method that points at the DID's Ethereum address.
    pub fn ethereum_verification_method(&self) -> String {
        format!("{}#ethereumAddress", self.0)
    }
}

impl fmt::Display for Did {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Did {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for Did {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<Did> for String {
    fn from(did: Did) -> Self {
        did.0
    }
}
