use crate::error::StewardResult;

/// A mutually exclusive piece of robot hardware (drivetrain, arm, intake...)
/// that commands compete for.
///
/// Hooks are driven by the [`Scheduler`](crate::scheduling::Scheduler):
/// `init` once when it is enabled, `periodic` once per tick before any
/// command work, `stop` once when it is disabled.
pub trait Subsystem: Send {
    /// Human readable name used in logs.
    fn name(&self) -> &str {
        "subsystem"
    }

    /// Called once when the scheduler is enabled.
    fn init(&mut self) -> StewardResult<()> {
        Ok(())
    }

    /// Called every tick while the scheduler is enabled.
    fn periodic(&mut self) -> StewardResult<()> {
        Ok(())
    }

    /// Called once when the scheduler is disabled.
    fn stop(&mut self) -> StewardResult<()> {
        Ok(())
    }
}
