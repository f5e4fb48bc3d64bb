//! Order model and canonical hashing.
//!
//! Orders are constructed and signed off-system; they exist only as signed
//! messages until presented to the settlement engine. Every order carries
//! two content-derived identifiers:
//!
//! - [`Order::key`] — stable across `value` renegotiation; keys the fill
//!   ledger and cancellation.
//! - [`Order::hash`] — sensitive to every field; the signature pre-image.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::{Address, Asset, OrderHash, OrderKey};

/// A signed intent to exchange `make_asset` for `take_asset`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Order {
    /// The order's originator.
    pub maker: Address,
    /// What the maker gives up.
    pub make_asset: Asset,
    /// Restricts who may be matched against this order. `ZERO` = open.
    pub taker: Address,
    /// What the maker demands in return.
    pub take_asset: Asset,
    /// Uniquifier. `0` forces the effective sender to equal the maker:
    /// a zero-salt order cannot be relayed and cannot be cancelled.
    pub salt: u64,
    /// Validity lower bound, unix seconds. `0` = no lower bound.
    pub start: u64,
    /// Validity upper bound, unix seconds. `0` = no upper bound.
    pub end: u64,
    /// Redirects the proceeds the maker would otherwise receive.
    /// `ZERO` = proceeds go to the maker.
    pub recipient: Address,
}

impl Order {
    /// Fill-ledger and cancellation key.
    ///
    /// Covers `(maker, make type, take type, salt)` only, so partial fills
    /// of the same logical order accumulate under one key even when the
    /// values are renegotiated between fills.
    #[must_use]
    pub fn key(&self) -> OrderKey {
        let mut encoded = Vec::with_capacity(128);
        encoded.extend_from_slice(self.maker.as_bytes());
        self.make_asset.asset_type.encode_into(&mut encoded);
        self.take_asset.asset_type.encode_into(&mut encoded);
        encoded.extend_from_slice(&self.salt.to_le_bytes());

        let mut hasher = Sha256::new();
        hasher.update(b"swapmesh:orderkey:v1:");
        hasher.update(&encoded);
        OrderKey(hasher.finalize().into())
    }

    /// Signature pre-image over the entire order.
    #[must_use]
    pub fn hash(&self) -> OrderHash {
        let mut encoded = Vec::with_capacity(256);
        encoded.extend_from_slice(self.maker.as_bytes());
        self.make_asset.asset_type.encode_into(&mut encoded);
        encoded.extend_from_slice(&self.make_asset.value.to_le_bytes());
        encoded.extend_from_slice(self.taker.as_bytes());
        self.take_asset.asset_type.encode_into(&mut encoded);
        encoded.extend_from_slice(&self.take_asset.value.to_le_bytes());
        encoded.extend_from_slice(&self.salt.to_le_bytes());
        encoded.extend_from_slice(&self.start.to_le_bytes());
        encoded.extend_from_slice(&self.end.to_le_bytes());
        encoded.extend_from_slice(self.recipient.as_bytes());

        let mut hasher = Sha256::new();
        hasher.update(b"swapmesh:order:v1:");
        hasher.update(&encoded);
        OrderHash(hasher.finalize().into())
    }

    /// Whether anyone may take the other side of this order.
    #[must_use]
    pub fn is_open_taker(&self) -> bool {
        self.taker.is_zero()
    }

    /// Where this order's proceeds go: the recipient override if set,
    /// otherwise the maker.
    #[must_use]
    pub fn proceeds_to(&self) -> Address {
        if self.recipient.is_zero() {
            self.maker
        } else {
            self.recipient
        }
    }
}

/// Two opposing signed orders submitted for matching.
///
/// Signatures are 64-byte ed25519 over [`Order::hash`]; an empty signature
/// is accepted only when the effective sender is the maker itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderPair {
    pub left: Order,
    pub right: Order,
    pub left_signature: Vec<u8>,
    pub right_signature: Vec<u8>,
}

impl OrderPair {
    #[must_use]
    pub fn new(left: Order, right: Order) -> Self {
        Self {
            left,
            right,
            left_signature: Vec::new(),
            right_signature: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_signatures(mut self, left_signature: Vec<u8>, right_signature: Vec<u8>) -> Self {
        self.left_signature = left_signature;
        self.right_signature = right_signature;
        self
    }
}

/// Test helpers.
#[cfg(any(test, feature = "test-helpers"))]
impl Order {
    /// An open order exchanging `make` for `take`, with a random salt.
    pub fn between(maker: Address, make: Asset, take: Asset) -> Self {
        Self {
            maker,
            make_asset: make,
            taker: Address::ZERO,
            take_asset: take,
            salt: rand::random::<u64>().max(1),
            start: 0,
            end: 0,
            recipient: Address::ZERO,
        }
    }
}
