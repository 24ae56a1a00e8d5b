//! # STEWARD Scheduling System
//!
//! Tick-driven command scheduling with exclusive subsystem ownership:
//!
//! - **Scheduler**: admits, preempts, backfills and runs commands every tick
//! - **SubmitHandle**: queue commands from other threads or from hooks
//! - **TickDriver**: optional fixed-rate loop for applications without one
//!
//! ## Usage
//!
//! ```rust,ignore
//! use steward_core::Scheduler;
//!
//! let mut scheduler = Scheduler::new();
//! scheduler.register_subsystems([drive.erase(), arm.erase()])?;
//! scheduler.set_default_command(drive.id(), teleop)?;
//! scheduler.enable()?;
//! loop {
//!     scheduler.tick()?;
//! }
//! ```
//!
//! ## Priority
//!
//! There are no numeric priorities. A pending command takes subsystems from
//! interruptible owners and waits behind non-interruptible ones; pending
//! commands are considered in submission order.

pub mod config;
pub mod driver;
pub mod scheduler;
pub mod submit;

mod table;

pub use config::{DriverConfig, SchedulerConfig};
pub use driver::TickDriver;
pub use scheduler::{Scheduler, SchedulerMetrics};
pub use submit::SubmitHandle;
