//! Error types for the simulation bridge.

use thiserror::Error;

/// Errors surfaced by the simulation's creation and configuration
/// boundaries.
///
/// Runtime per-body operations never error; on a stale id or a disposed
/// engine they degrade to no-ops instead.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimError {
    /// The rigid-body world was never built or has been disposed.
    #[error("rigid-body engine unavailable (not initialized or disposed)")]
    EngineUnavailable,

    /// A configuration value failed validation at a creation boundary.
    #[error("invalid configuration: {field} = {value} ({reason})")]
    InvalidConfig {
        /// Which field was rejected.
        field: &'static str,
        /// The offending value.
        value: f64,
        /// Why it was rejected.
        reason: &'static str,
    },
}

/// Convenience alias for simulation results.
pub type SimResult<T> = Result<T, SimError>;

/// Faults detected while updating a single character.
///
/// These are quarantined by the orchestrator: the frame continues, the
/// character is removed on the next pass.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CharacterError {
    /// The character's rigid body is no longer in the world.
    #[error("rigid body missing from the world")]
    BodyMissing,

    /// A state quantity stopped being a finite number.
    #[error("non-finite {quantity} in character state")]
    NonFinite {
        /// Which quantity degenerated.
        quantity: &'static str,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_carry_context() {
        let err = SimError::InvalidConfig {
            field: "fixed_timestep_s",
            value: 0.0,
            reason: "must be positive",
        };
        let text = err.to_string();
        assert!(text.contains("fixed_timestep_s"));
        assert!(text.contains("must be positive"));
    }

    #[test]
    fn test_character_error_display() {
        let err = CharacterError::NonFinite { quantity: "position" };
        assert!(err.to_string().contains("position"));
    }
}
