//! Curve catalog for the zecc accelerator library
//!
//! Every per-curve constant lives here: private-scalar lengths, parameter
//! block slot widths, coprocessor curve-type tags, base points, group orders
//! and the PCC/KDSA function codes. The rest of the workspace branches on
//! [`CurveId`] and reads everything else from this catalog instead of
//! hard-coding per-curve tables at each call site.

pub mod curves;
pub mod fc;

pub use curves::{CurveId, MAX_PRIVLEN};
