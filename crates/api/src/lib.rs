//! Public API surface of the zecc accelerator library
//!
//! This crate carries the pieces every backend shares: the error taxonomy
//! with its C-compatible errno mapping, the in-memory EC key record, and the
//! runtime capability flags that steer backend selection.

pub mod caps;
pub mod error;
pub mod key;

pub use caps::{Capabilities, FipsPolicy};
pub use error::{Error, Result};
pub use key::EcKey;
