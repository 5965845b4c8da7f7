//! Hardware-accelerated elliptic-curve primitives for IBM Z
//!
//! Three primitives — EC key generation, ECDH shared-secret derivation and
//! ECDSA signing/verification — plus public-key derivation for the Edwards
//! and Montgomery curves. Each operation can run on two hardware backends:
//!
//! * the CPU instructions PCC and KDSA ([`cpacf`]), available with MSA 9,
//!   which consume fixed-layout 4 KiB parameter blocks, and
//! * a CCA coprocessor ([`card`]), reached through the zcrypt character
//!   device with nested CPRBX request/reply control blocks.
//!
//! [`ops::Accelerator`] picks a backend per call from the machine's
//! [`Capabilities`]: the CPU path is preferred, the coprocessor takes over
//! for curves the instructions do not implement (or when offload is forced),
//! and a missing card surfaces as `NoDevice`. A software rendition of the
//! Weierstrass operations lives in [`soft`] for machines with no
//! acceleration at all.
//!
//! On targets other than s390x the instruction layer binds to a software
//! model with the same parameter-block contract, so the full packing,
//! clamping and endianness logic runs — and is tested — anywhere.

pub mod card;
pub mod cpacf;
pub mod derive;
pub mod ops;
pub mod soft;

pub use api::{Capabilities, EcKey, Error, FipsPolicy, Result};
pub use common::SecretBytes;
pub use ops::Accelerator;
pub use params::CurveId;
