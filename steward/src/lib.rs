//! # STEWARD - command-based robot control
//!
//! STEWARD lets robot code be written as **subsystems** (the hardware) and
//! **commands** (what the hardware should be doing right now). A scheduler
//! ticked once per control loop decides which commands run, interrupts the
//! ones that lose their subsystems, and falls back to each subsystem's
//! default command when nothing else wants it.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use steward::prelude::*;
//!
//! struct Arm;
//! impl Subsystem for Arm {
//!     fn name(&self) -> &str { "arm" }
//! }
//!
//! fn main() -> Result<()> {
//!     let arm = SubsystemHandle::new(Arm);
//!     let hold = FnCommand::builder("hold_arm").requires(arm.id()).build();
//!
//!     let mut scheduler = Scheduler::with_config(SchedulerConfig::standard());
//!     scheduler.register_subsystems([arm.erase()])?;
//!     scheduler.set_default_command(arm.id(), CommandHandle::new(hold).erase())?;
//!
//!     let mut driver = TickDriver::new(scheduler);
//!     driver.install_ctrlc_handler();
//!     driver.run()
//! }
//! ```

// Re-export core components
pub use steward_core::{self, *};

/// The STEWARD prelude - everything you need to get started
pub mod prelude {
    // Core command types
    pub use steward_core::core::{
        Command, CommandHandle, CommandRef, CommandState, FnCommand, Requirements, Subsystem,
        SubsystemHandle, SubsystemRef,
    };

    // Scheduling
    pub use steward_core::scheduling::{
        DriverConfig, Scheduler, SchedulerConfig, SubmitHandle, TickDriver,
    };

    // Error types
    pub use steward_core::error::{StewardError, StewardResult};
    pub type Result<T> = StewardResult<T>;

    // Re-export anyhow for hook errors
    pub use anyhow::{anyhow, bail, ensure, Context, Result as AnyResult};
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get STEWARD version
pub fn version() -> &'static str {
    VERSION
}
