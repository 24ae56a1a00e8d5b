//! Error types for STEWARD
//!
//! Two families of failure exist:
//!
//! - **Configuration errors** are detected by the scheduler itself and are
//!   returned from the offending call (`register_subsystems`,
//!   `set_default_command`, `submit`, config loading). The call has no effect.
//! - **Lifecycle errors** come out of user hooks (`Subsystem::periodic`,
//!   `Command::execute`, ...). The scheduler hands them back unchanged and
//!   abandons the rest of the phase that raised them.

use crate::core::{CommandId, SubsystemId};
use thiserror::Error;

/// Result alias used by every fallible STEWARD API and hook.
pub type StewardResult<T> = std::result::Result<T, StewardError>;

#[derive(Error, Debug)]
pub enum StewardError {
    /// Subsystems can only be registered while the scheduler is disabled.
    #[error("subsystems must be registered before the scheduler is enabled")]
    AlreadyEnabled,

    /// A default command was assigned to a subsystem the scheduler never saw.
    #[error("cannot set default command for unregistered subsystem {0}")]
    UnknownSubsystem(SubsystemId),

    /// A submitted (or defaulted) command requires an unregistered subsystem.
    #[error("command '{name}' ({command}) requires unregistered subsystem {subsystem}")]
    UnregisteredSubsystem {
        name: String,
        command: CommandId,
        subsystem: SubsystemId,
    },

    /// Invalid configuration value.
    #[error("configuration error: {0}")]
    Config(String),

    /// Failure raised from inside a subsystem or command hook.
    #[error(transparent)]
    Hook(#[from] anyhow::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl StewardError {
    /// Build a [`StewardError::Config`] from any message.
    pub fn config(msg: impl Into<String>) -> Self {
        StewardError::Config(msg.into())
    }

    /// Build a hook failure from a plain message.
    pub fn hook(msg: impl std::fmt::Display) -> Self {
        StewardError::Hook(anyhow::anyhow!("{}", msg))
    }

    /// True for errors the scheduler raised about its own configuration,
    /// as opposed to failures coming out of user hooks or I/O.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            StewardError::AlreadyEnabled
                | StewardError::UnknownSubsystem(_)
                | StewardError::UnregisteredSubsystem { .. }
                | StewardError::Config(_)
        )
    }
}
