//! Minimal fixed-rate loop around a [`Scheduler`]
//!
//! Applications with their own control loop call [`Scheduler::tick`]
//! directly. `TickDriver` is for everything else:
//!
//! ```rust,ignore
//! let mut driver = TickDriver::new(scheduler);
//! driver.install_ctrlc_handler();
//! driver.run()?; // enable, tick at config.driver.rate_hz, disable
//! ```

use super::config::DriverConfig;
use super::scheduler::Scheduler;
use crate::error::{StewardError, StewardResult};
use colored::Colorize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

pub struct TickDriver {
    scheduler: Scheduler,
    config: DriverConfig,
    running: Arc<AtomicBool>,
}

impl TickDriver {
    /// Driver using the scheduler's own `driver` configuration section.
    pub fn new(scheduler: Scheduler) -> Self {
        let config = scheduler.config().driver.clone();
        Self::with_config(scheduler, config)
    }

    pub fn with_config(scheduler: Scheduler, config: DriverConfig) -> Self {
        Self {
            scheduler,
            config,
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut Scheduler {
        &mut self.scheduler
    }

    pub fn into_scheduler(self) -> Scheduler {
        self.scheduler
    }

    /// Flag the loop polls between ticks; store `false` to stop it.
    pub fn stop_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.running)
    }

    pub fn stop(&self) {
        self.running.store(false, Ordering::Release);
    }

    /// Stop the loop on Ctrl+C. Only one handler can exist per process.
    pub fn install_ctrlc_handler(&self) {
        let running = Arc::clone(&self.running);
        if let Err(e) = ctrlc::set_handler(move || {
            eprintln!("{}", "\nCtrl+C received! Shutting down STEWARD scheduler...".red());
            running.store(false, Ordering::Release);
        }) {
            log::warn!("failed to set signal handler: {}", e);
        }
    }

    /// Run until stopped or `max_ticks` is reached.
    pub fn run(&mut self) -> StewardResult<()> {
        self.run_loop(None)
    }

    /// Run for at most `duration`, then shut down.
    pub fn run_for(&mut self, duration: Duration) -> StewardResult<()> {
        self.run_loop(Some(duration))
    }

    fn run_loop(&mut self, duration: Option<Duration>) -> StewardResult<()> {
        let rate_hz = self.config.rate_hz;
        if !rate_hz.is_finite() || rate_hz <= 0.0 {
            return Err(StewardError::config(format!(
                "driver.rate_hz must be a positive number, got {}",
                rate_hz
            )));
        }
        let period = Duration::from_secs_f64(1.0 / rate_hz);
        let start = Instant::now();
        let mut ticks: u64 = 0;

        self.scheduler.enable()?;
        self.running.store(true, Ordering::Release);

        let mut result = Ok(());
        while self.running.load(Ordering::Acquire) {
            if duration.is_some_and(|max| start.elapsed() >= max) {
                log::info!("[{}] reached time limit of {:?}", self.scheduler.name(), duration);
                break;
            }
            if self.config.max_ticks.is_some_and(|max| ticks >= max) {
                break;
            }

            let tick_start = Instant::now();
            if let Err(e) = self.scheduler.tick() {
                log::error!("[{}] tick {} failed: {}", self.scheduler.name(), ticks, e);
                result = Err(e);
                break;
            }
            ticks += 1;

            if let Some(remaining) = period.checked_sub(tick_start.elapsed()) {
                std::thread::sleep(remaining);
            }
        }
        self.running.store(false, Ordering::Release);

        let shutdown = self.scheduler.disable();
        self.print_summary(ticks, start.elapsed());
        result.and(shutdown)
    }

    fn print_summary(&self, ticks: u64, elapsed: Duration) {
        let m = self.scheduler.metrics();
        println!(
            "{} {} ran {} ticks in {:.2?} (admitted: {}, preempted: {}, completed: {}, blocked: {})",
            "■".green(),
            self.scheduler.name().bold(),
            ticks,
            elapsed,
            m.admitted,
            m.preempted,
            m.completed,
            m.blocked
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduling::SchedulerConfig;

    #[test]
    fn test_max_ticks_bounds_run() {
        let mut config = SchedulerConfig::quiet();
        config.driver.rate_hz = 1000.0;
        config.driver.max_ticks = Some(5);

        let mut driver = TickDriver::new(Scheduler::with_config(config));
        driver.run().unwrap();

        assert_eq!(driver.scheduler().metrics().ticks, 5);
        assert!(!driver.scheduler().is_enabled());
    }

    #[test]
    fn test_zero_rate_rejected_before_enable() {
        let mut config = SchedulerConfig::quiet();
        config.driver.rate_hz = 0.0;

        let mut driver = TickDriver::new(Scheduler::with_config(config));
        let err = driver.run().unwrap_err();
        assert!(err.is_configuration());
        assert!(!driver.scheduler().is_enabled());
    }

    #[test]
    fn test_failed_enable_leaves_driver_stopped() {
        use crate::core::{Subsystem, SubsystemHandle};

        struct Dead;
        impl Subsystem for Dead {
            fn init(&mut self) -> StewardResult<()> {
                Err(StewardError::hook("encoder not found"))
            }
        }

        let mut driver = TickDriver::new(Scheduler::with_config(SchedulerConfig::quiet()));
        driver
            .scheduler_mut()
            .register_subsystems([SubsystemHandle::new(Dead).erase()])
            .unwrap();

        assert!(driver.run().is_err());
        assert!(!driver.stop_flag().load(Ordering::Acquire));
        assert_eq!(driver.scheduler().metrics().ticks, 0);
    }

    #[test]
    fn test_stop_flag_cleared_from_command() {
        use crate::core::{CommandHandle, FnCommand, Subsystem, SubsystemHandle};
        use std::sync::atomic::AtomicUsize;

        struct Lift;
        impl Subsystem for Lift {}

        let lift = SubsystemHandle::new(Lift).erase();
        let mut driver = TickDriver::new(Scheduler::with_config(SchedulerConfig::quiet()));
        let flag = driver.stop_flag();
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = calls.clone();
        let hold = FnCommand::builder("hold_lift")
            .requires(lift.id())
            .on_execute(move || {
                if seen.fetch_add(1, Ordering::SeqCst) + 1 == 3 {
                    flag.store(false, Ordering::Release);
                }
                Ok(())
            })
            .build();

        let sched = driver.scheduler_mut();
        sched.register_subsystems([lift.clone()]).unwrap();
        sched
            .set_default_command(lift.id(), CommandHandle::new(hold).erase())
            .unwrap();

        driver.run_for(Duration::from_secs(5)).unwrap();
        assert_eq!(driver.scheduler().metrics().ticks, 3);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }
}
