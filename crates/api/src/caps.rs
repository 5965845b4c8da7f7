//! Runtime capability flags
//!
//! The surrounding library probes the machine once at initialization and
//! hands the result to every operation as a [`Capabilities`] value. The
//! flags are plain data and are never mutated after construction.

use crate::error::{Error, Result};

/// Which acceleration paths the running machine offers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Capabilities {
    /// MSA 9 is installed: the PCC/KDSA curve function codes are available.
    pub msa9: bool,
    /// At least one CCA coprocessor is online.
    pub online_card: bool,
    /// Route work to the coprocessor even where the CPU instructions could
    /// serve it. Key generation ignores this and tries the CPU first.
    pub ica_offload: bool,
}

impl Capabilities {
    /// CPU instructions only, no card.
    pub fn cpu_only() -> Self {
        Self {
            msa9: true,
            online_card: false,
            ica_offload: false,
        }
    }

    /// Card only, no MSA 9.
    pub fn card_only() -> Self {
        Self {
            msa9: false,
            online_card: true,
            ica_offload: false,
        }
    }
}

/// FIPS stance of the process, checked by the software fallback operations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FipsPolicy {
    /// The library was configured to require FIPS mode.
    pub required: bool,
    /// The underlying crypto provider is operating in FIPS mode.
    pub operational: bool,
}

impl FipsPolicy {
    /// Fails with a policy error when FIPS mode is demanded but the provider
    /// is not running in it.
    pub fn check(&self, context: &'static str) -> Result<()> {
        if self.required && !self.operational {
            return Err(Error::PolicyDenied { context });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fips_gate_only_trips_when_required_but_not_operational() {
        let open = FipsPolicy::default();
        assert!(open.check("op").is_ok());

        let satisfied = FipsPolicy {
            required: true,
            operational: true,
        };
        assert!(satisfied.check("op").is_ok());

        let violated = FipsPolicy {
            required: true,
            operational: false,
        };
        assert!(matches!(
            violated.check("op"),
            Err(Error::PolicyDenied { context: "op" })
        ));
    }
}
