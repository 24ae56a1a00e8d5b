//! Drivetrain + arm demo: a teleop default command, an autonomous drive
//! routine that cannot be interrupted, and an arm move queued from inside a
//! command.
//!
//! Run with `RUST_LOG=debug cargo run --example drivetrain`.

use steward::prelude::*;
use tracing_subscriber::EnvFilter;

struct Drive {
    left: f64,
    right: f64,
}

impl Drive {
    fn tank(&mut self, left: f64, right: f64) {
        self.left = left;
        self.right = right;
    }
}

impl Subsystem for Drive {
    fn name(&self) -> &str {
        "drive"
    }

    fn periodic(&mut self) -> Result<()> {
        tracing::trace!(left = self.left, right = self.right, "drive output");
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        self.tank(0.0, 0.0);
        Ok(())
    }
}

struct Arm {
    angle_deg: f64,
}

impl Subsystem for Arm {
    fn name(&self) -> &str {
        "arm"
    }
}

/// Drives straight for a fixed number of ticks, then raises the arm.
struct DriveDistance {
    drive: SubsystemHandle<Drive>,
    remaining: u32,
    raise_arm: CommandRef,
    submit: SubmitHandle,
}

impl Command for DriveDistance {
    fn name(&self) -> &str {
        "drive_distance"
    }

    fn requirements(&self) -> Requirements {
        [self.drive.id()].into_iter().collect()
    }

    fn execute(&mut self) -> Result<()> {
        self.drive.lock().tank(0.6, 0.6);
        self.remaining = self.remaining.saturating_sub(1);
        Ok(())
    }

    fn end(&mut self, interrupted: bool) -> Result<()> {
        self.drive.lock().tank(0.0, 0.0);
        if !interrupted {
            self.submit.submit(&self.raise_arm, false)?;
        }
        Ok(())
    }

    fn is_finished(&mut self) -> bool {
        self.remaining == 0
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let drive = SubsystemHandle::new(Drive {
        left: 0.0,
        right: 0.0,
    });
    let arm = SubsystemHandle::new(Arm { angle_deg: 0.0 });

    let mut config = SchedulerConfig::standard();
    config.name = "demo".to_string();
    config.driver.max_ticks = Some(150);
    let mut scheduler = Scheduler::with_config(config);
    scheduler.register_subsystems([drive.erase(), arm.erase()])?;

    let teleop_drive = drive.clone();
    let teleop = FnCommand::builder("teleop")
        .requires(drive.id())
        .on_execute(move || {
            teleop_drive.lock().tank(0.2, 0.25);
            Ok(())
        })
        .build();
    scheduler.set_default_command(drive.id(), CommandHandle::new(teleop).erase())?;

    let arm_target = arm.clone();
    let raise_arm = FnCommand::builder("raise_arm")
        .requires(arm.id())
        .on_execute(move || {
            let mut arm = arm_target.lock();
            arm.angle_deg = (arm.angle_deg + 3.0).min(90.0);
            Ok(())
        })
        .finished_when({
            let arm = arm.clone();
            move || arm.lock().angle_deg >= 90.0
        })
        .build();

    let auto = CommandHandle::new(DriveDistance {
        drive: drive.clone(),
        remaining: 50,
        raise_arm: CommandHandle::new(raise_arm).erase(),
        submit: scheduler.submit_handle(),
    })
    .erase();

    let mut driver = TickDriver::new(scheduler);
    driver.install_ctrlc_handler();

    // Autonomous starts once the scheduler is enabled; the default teleop
    // command takes the drivetrain back when it finishes.
    let submit = driver.scheduler().submit_handle();
    let starter = std::thread::spawn(move || -> Result<()> {
        while !submit.is_enabled() {
            std::thread::sleep(std::time::Duration::from_millis(5));
        }
        std::thread::sleep(std::time::Duration::from_millis(200));
        submit.submit(&auto, false)?;
        Ok(())
    });

    driver.run()?;
    starter
        .join()
        .map_err(|_| anyhow!("starter thread panicked"))??;
    println!("arm finished at {:.0} degrees", arm.lock().angle_deg);
    Ok(())
}
