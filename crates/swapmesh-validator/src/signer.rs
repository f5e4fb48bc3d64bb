//! Signer dispatch: externally-owned vs. delegated makers.
//!
//! A maker address is either the raw ed25519 verifying key of an
//! externally-owned account, or the id of a delegated (contract-kind)
//! account that performs its own signature acceptance. The kind is decided
//! once, at verification entry: addresses registered in the
//! [`SignerRegistry`] dispatch to their [`DelegatedSigner`], everything
//! else verifies directly against ed25519.

use std::collections::HashMap;
use std::sync::Arc;

use ed25519_dalek::{Signature, VerifyingKey};
use swapmesh_types::{Address, ExchangeError, OrderHash, Result};

/// A delegated account's own signature acceptance check.
///
/// Mirrors a contract account verifying on its own terms; returning `true`
/// is the acceptance value the validator requires.
pub trait DelegatedSigner: Send + Sync {
    fn is_valid_signature(&self, order_hash: &OrderHash, signature: &[u8]) -> bool;
}

/// Maps delegated maker addresses to their verification capability and
/// verifies direct ed25519 signatures for everyone else.
#[derive(Default, Clone)]
pub struct SignerRegistry {
    delegated: HashMap<Address, Arc<dyn DelegatedSigner>>,
}

impl SignerRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a delegated verifier for a maker address.
    pub fn register(&mut self, maker: Address, signer: Arc<dyn DelegatedSigner>) {
        self.delegated.insert(maker, signer);
    }

    /// Remove a delegated verifier.
    pub fn deregister(&mut self, maker: Address) {
        self.delegated.remove(&maker);
    }

    #[must_use]
    pub fn is_delegated(&self, maker: Address) -> bool {
        self.delegated.contains_key(&maker)
    }

    /// Verify `signature` over `hash` for `maker`, dispatching on the
    /// maker's account kind.
    ///
    /// # Errors
    /// Returns `SignatureInvalid` on any verification failure: malformed
    /// key or signature bytes, a failed ed25519 check, or a delegated
    /// verifier declining.
    pub fn verify(&self, maker: Address, hash: &OrderHash, signature: &[u8]) -> Result<()> {
        if let Some(delegated) = self.delegated.get(&maker) {
            if delegated.is_valid_signature(hash, signature) {
                return Ok(());
            }
            return Err(ExchangeError::SignatureInvalid);
        }

        let key = VerifyingKey::from_bytes(maker.as_bytes())
            .map_err(|_| ExchangeError::SignatureInvalid)?;
        let signature =
            Signature::from_slice(signature).map_err(|_| ExchangeError::SignatureInvalid)?;
        key.verify_strict(hash.as_bytes(), &signature)
            .map_err(|_| ExchangeError::SignatureInvalid)
    }
}

impl std::fmt::Debug for SignerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignerRegistry")
            .field("delegated", &self.delegated.len())
            .finish()
    }
}
