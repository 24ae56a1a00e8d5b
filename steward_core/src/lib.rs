//! # STEWARD Core
//!
//! The core runtime of the STEWARD command framework for robots.
//!
//! A fixed set of mutually exclusive **subsystems** (drivetrain, arm, intake)
//! is shared among **commands**, each of which declares up front which
//! subsystems it needs. Once per tick the [`Scheduler`] decides which pending
//! commands may start, which running commands must be interrupted, and drives
//! every active command's lifecycle.
//!
//! - **Core**: `Subsystem` and `Command` traits plus shared handles
//! - **Scheduling**: the scheduler, submit handles and an optional loop driver
//! - **Errors**: configuration vs lifecycle failures
//!
//! ## Quick Start
//!
//! ```rust
//! use steward_core::{Command, CommandHandle, Requirements, Scheduler, Subsystem, SubsystemHandle};
//! use steward_core::StewardResult;
//!
//! struct Drive {
//!     speed: f64,
//! }
//!
//! impl Subsystem for Drive {
//!     fn name(&self) -> &str { "drive" }
//! }
//!
//! struct Forward {
//!     drive: SubsystemHandle<Drive>,
//! }
//!
//! impl Command for Forward {
//!     fn name(&self) -> &str { "forward" }
//!
//!     fn requirements(&self) -> Requirements {
//!         [self.drive.id()].into_iter().collect()
//!     }
//!
//!     fn execute(&mut self) -> StewardResult<()> {
//!         self.drive.lock().speed = 0.5;
//!         Ok(())
//!     }
//! }
//!
//! # fn main() -> StewardResult<()> {
//! let drive = SubsystemHandle::new(Drive { speed: 0.0 });
//! let forward = CommandHandle::new(Forward { drive: drive.clone() }).erase();
//!
//! let mut scheduler = Scheduler::new();
//! scheduler.register_subsystems([drive.erase()])?;
//! scheduler.enable()?;
//! scheduler.submit(&forward, true)?;
//! scheduler.tick()?;
//!
//! assert_eq!(drive.lock().speed, 0.5);
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod error;
pub mod scheduling;

// Re-export commonly used types for easy access
pub use crate::core::{
    Command, CommandHandle, CommandId, CommandRef, CommandState, FnCommand, Requirements,
    Subsystem, SubsystemHandle, SubsystemId, SubsystemRef,
};
pub use error::{StewardError, StewardResult};
pub use scheduling::{Scheduler, SchedulerConfig, SchedulerMetrics, SubmitHandle, TickDriver};
