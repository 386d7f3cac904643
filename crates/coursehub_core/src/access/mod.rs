//! Role-based access policies.
//!
//! # Responsibility
//! - Map (caller role, read/write action) pairs to allow/deny decisions.
//! - Stay independent of any transport; HTTP derives `Action` from methods.
//!
//! # Invariants
//! - Anonymous callers are denied with `Unauthenticated`, authenticated
//!   callers with `Forbidden`, so transports can pick 401 vs 403.

pub mod policy;

pub use policy::{AccessError, AccessPolicy, Action, Principal};
