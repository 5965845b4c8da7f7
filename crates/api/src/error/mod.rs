//! Error handling for the accelerator library
//!
//! One error type covers every backend. The variants map onto the classic
//! errno contract of the C-facing layer (see [`Error::errno`]), but callers
//! inside the workspace match on the variants themselves; in particular the
//! operation dispatcher consumes [`Error::UnsupportedCurve`] to escalate from
//! the CPU-instruction path to the coprocessor and never lets it reach the
//! caller unless every backend refused the curve.

use params::CurveId;

/// Errno values of the C-compatible surface.
pub mod errno {
    pub const EIO: i32 = 5;
    pub const ENOMEM: i32 = 12;
    pub const EACCES: i32 = 13;
    pub const EFAULT: i32 = 14;
    pub const ENODEV: i32 = 19;
    pub const EINVAL: i32 = 22;
}

/// Primary error type for accelerator operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The selected backend cannot handle this curve. Consumed by the
    /// dispatcher to try the next backend.
    UnsupportedCurve {
        curve: CurveId,
        backend: &'static str,
    },

    /// A key record is missing the component the operation needs, or a
    /// supplied buffer has the wrong shape.
    InvalidKey { context: &'static str },

    /// The instruction, the ioctl or the card firmware reported failure.
    Hardware { context: &'static str },

    /// A coprocessor reply disagreed with the lengths the request implies.
    ReplyFormat {
        context: &'static str,
        expected: usize,
        actual: usize,
    },

    /// ECDSA verification rejected the signature.
    SignatureInvalid,

    /// No coprocessor is available for a curve the CPU path refused.
    NoDevice,

    /// The FIPS policy forbids the requested software operation.
    PolicyDenied { context: &'static str },

    /// Buffer reservation failed.
    Alloc { context: &'static str },

    /// The random number source failed.
    Random { context: &'static str },
}

/// Result type used across the workspace.
pub type Result<T> = core::result::Result<T, Error>;

impl Error {
    /// The errno value the C-compatible surface reports for this error.
    pub fn errno(&self) -> i32 {
        match self {
            Error::UnsupportedCurve { .. } | Error::InvalidKey { .. } => errno::EINVAL,
            Error::Hardware { .. } | Error::ReplyFormat { .. } | Error::Random { .. } => errno::EIO,
            Error::SignatureInvalid => errno::EFAULT,
            Error::NoDevice => errno::ENODEV,
            Error::PolicyDenied { .. } => errno::EACCES,
            Error::Alloc { .. } => errno::ENOMEM,
        }
    }
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::UnsupportedCurve { curve, backend } => {
                write!(f, "{} is not supported by the {} backend", curve, backend)
            }
            Error::InvalidKey { context } => write!(f, "invalid key: {}", context),
            Error::Hardware { context } => write!(f, "hardware failure: {}", context),
            Error::ReplyFormat {
                context,
                expected,
                actual,
            } => write!(
                f,
                "malformed reply: {} (expected {}, got {})",
                context, expected, actual
            ),
            Error::SignatureInvalid => write!(f, "signature verification failed"),
            Error::NoDevice => write!(f, "no coprocessor available"),
            Error::PolicyDenied { context } => write!(f, "denied by FIPS policy: {}", context),
            Error::Alloc { context } => write!(f, "allocation failure: {}", context),
            Error::Random { context } => write!(f, "random number generation failed: {}", context),
        }
    }
}

impl std::error::Error for Error {}
