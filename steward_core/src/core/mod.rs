//! # Core types and traits for the STEWARD framework
//!
//! - **Subsystem**: a piece of hardware commands compete for
//! - **Command**: a unit of work that needs exclusive use of some subsystems
//! - **Handles**: shared, identity-carrying references to both
//!
//! ## Command Lifecycle
//!
//! All commands follow the same lifecycle under the scheduler:
//! 1. **Submission** - queued as pending, interruptible or not
//! 2. **Initialization** - `init()` once its subsystems are free
//! 3. **Execution** - `execute()` every tick
//! 4. **End** - `end(interrupted)` when finished, preempted or disabled

pub mod command;
pub mod fn_command;
pub mod handle;
pub mod subsystem;

pub use command::{Command, CommandState, Requirements};
pub use fn_command::{FnCommand, FnCommandBuilder};
pub use handle::{CommandHandle, CommandId, CommandRef, SubsystemHandle, SubsystemId, SubsystemRef};
pub use subsystem::Subsystem;
