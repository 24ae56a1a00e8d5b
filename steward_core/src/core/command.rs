use super::handle::SubsystemId;
use crate::error::StewardResult;
use std::collections::BTreeSet;
use std::fmt;

/// Set of subsystems a command needs exclusive use of.
pub type Requirements = BTreeSet<SubsystemId>;

/// A unit of work scheduled against a fixed set of subsystems.
///
/// ## Lifecycle
/// 1. **Pending** - submitted, waiting for its subsystems
/// 2. **Active** - `init()` ran, `execute()` is called every tick
/// 3. **Ended** - `end(interrupted)` ran, either because `is_finished()`
///    returned true, another command took a subsystem, or the scheduler
///    was disabled
///
/// `requirements()` must return the same set for the lifetime of the
/// command; the scheduler caches it.
pub trait Command: Send {
    /// Human readable name used in logs.
    fn name(&self) -> &str {
        "command"
    }

    /// Subsystems this command needs exclusive use of. May be empty.
    fn requirements(&self) -> Requirements;

    /// Runs once when the command is scheduled.
    fn init(&mut self) -> StewardResult<()> {
        Ok(())
    }

    /// Runs every tick while the command is active.
    fn execute(&mut self) -> StewardResult<()> {
        Ok(())
    }

    /// Runs once when the command stops. `interrupted` is true only when
    /// another command preempted it.
    fn end(&mut self, _interrupted: bool) -> StewardResult<()> {
        Ok(())
    }

    /// Checked once per tick before `execute()`. Default commands should
    /// never finish.
    fn is_finished(&mut self) -> bool {
        false
    }
}

/// Where a command currently sits in the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandState {
    /// Not known to the scheduler (never submitted, ended, or dropped).
    Idle,
    /// Submitted, waiting to be admitted.
    Pending { interruptible: bool },
    /// Running and owning its requirements.
    Active { interruptible: bool },
}

impl CommandState {
    pub fn is_active(&self) -> bool {
        matches!(self, CommandState::Active { .. })
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, CommandState::Pending { .. })
    }
}

impl fmt::Display for CommandState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandState::Idle => write!(f, "Idle"),
            CommandState::Pending { interruptible } => {
                write!(f, "Pending (interruptible: {})", interruptible)
            }
            CommandState::Active { interruptible } => {
                write!(f, "Active (interruptible: {})", interruptible)
            }
        }
    }
}
