//! # swapmesh-validator
//!
//! Order validation for the SwapMesh exchange: signature verification with
//! dual signer dispatch, time-window checks, the zero-salt rule, and the
//! role/capability service with its optional fungible allow-list.
//!
//! Everything here is side-effect free with respect to settlement state —
//! the settlement engine calls [`OrderValidator::validate`] as a pure
//! precondition check before any fill arithmetic runs.

pub mod roles;
pub mod signer;
pub mod validator;

pub use roles::{Role, RoleService};
pub use signer::{DelegatedSigner, SignerRegistry};
pub use validator::OrderValidator;
