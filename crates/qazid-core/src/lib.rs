#![deny(missing_docs)]

//! # qazid-core — Domain Primitives for the QazID Registry
//!
//! This crate defines the types the rest of the workspace depends on. It has
//! no internal crate dependencies and no I/O — only `serde`, `thiserror`, and
//! `chrono` from the external ecosystem.
//!
//! ## Design Principles
//!
//! 1. **Newtype wrappers for domain primitives.** An [`Iin`] or a [`Phone`]
//!    is validated at construction time; holding one means the value passed
//!    every format rule. You cannot pass an arbitrary string where an
//!    identifier is expected.
//!
//! 2. **The IIN validator is a pure function.** [`iin::validate`] maps a
//!    string to a decoded [`IinInfo`] or a specific [`IinError`]. It touches
//!    no shared state and is safe to call from any number of concurrent
//!    tasks.
//!
//! 3. **Structured errors with `thiserror`.** No `Box<dyn Error>`, no
//!    `.unwrap()` outside tests. Each variant carries the context needed to
//!    produce a user-facing message without re-deriving the cause.

pub mod error;
pub mod iin;
pub mod phone;

// Re-export primary types at crate root for ergonomic imports.
pub use error::{IinError, ValidationError};
pub use iin::{validate, Iin, IinInfo, Sex};
pub use phone::Phone;
