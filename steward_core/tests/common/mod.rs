// Shared recording fixtures for the scheduler integration tests
#![allow(dead_code)]

use parking_lot::Mutex;
use steward_core::{
    Command, CommandHandle, CommandRef, Requirements, StewardError, StewardResult, Subsystem,
    SubsystemHandle, SubsystemRef,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Ordered record of every hook call, shared by all fixtures in a test.
#[derive(Clone, Default)]
pub struct Journal(Arc<Mutex<Vec<String>>>);

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, entry: String) {
        self.0.lock().push(entry);
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().clone()
    }

    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.0.lock())
    }

    pub fn count(&self, entry: &str) -> usize {
        self.0.lock().iter().filter(|e| e.as_str() == entry).count()
    }

    pub fn position(&self, entry: &str) -> Option<usize> {
        self.0.lock().iter().position(|e| e == entry)
    }
}

pub struct TestSubsystem {
    name: String,
    journal: Journal,
    fail_periodic: bool,
}

impl Subsystem for TestSubsystem {
    fn name(&self) -> &str {
        &self.name
    }

    fn init(&mut self) -> StewardResult<()> {
        self.journal.push(format!("{}.init", self.name));
        Ok(())
    }

    fn periodic(&mut self) -> StewardResult<()> {
        self.journal.push(format!("{}.periodic", self.name));
        if self.fail_periodic {
            return Err(StewardError::hook(format!("{} sensor fault", self.name)));
        }
        Ok(())
    }

    fn stop(&mut self) -> StewardResult<()> {
        self.journal.push(format!("{}.stop", self.name));
        Ok(())
    }
}

pub fn subsystem(name: &str, journal: &Journal) -> SubsystemRef {
    SubsystemHandle::new(TestSubsystem {
        name: name.to_string(),
        journal: journal.clone(),
        fail_periodic: false,
    })
    .erase()
}

pub fn failing_subsystem(name: &str, journal: &Journal) -> SubsystemRef {
    SubsystemHandle::new(TestSubsystem {
        name: name.to_string(),
        journal: journal.clone(),
        fail_periodic: true,
    })
    .erase()
}

pub struct TestCommand {
    name: String,
    requirements: Requirements,
    journal: Journal,
    done: Arc<AtomicBool>,
}

impl Command for TestCommand {
    fn name(&self) -> &str {
        &self.name
    }

    fn requirements(&self) -> Requirements {
        self.requirements.clone()
    }

    fn init(&mut self) -> StewardResult<()> {
        self.journal.push(format!("{}.init", self.name));
        Ok(())
    }

    fn execute(&mut self) -> StewardResult<()> {
        self.journal.push(format!("{}.execute", self.name));
        Ok(())
    }

    fn end(&mut self, interrupted: bool) -> StewardResult<()> {
        self.journal.push(format!("{}.end({})", self.name, interrupted));
        Ok(())
    }

    fn is_finished(&mut self) -> bool {
        self.done.load(Ordering::SeqCst)
    }
}

/// A recording command plus the switch that makes it report finished.
pub struct Probe {
    pub command: CommandRef,
    done: Arc<AtomicBool>,
}

impl Probe {
    pub fn finish(&self) {
        self.done.store(true, Ordering::SeqCst);
    }

    pub fn id(&self) -> steward_core::CommandId {
        self.command.id()
    }
}

pub fn command(name: &str, requires: &[&SubsystemRef], journal: &Journal) -> Probe {
    let done = Arc::new(AtomicBool::new(false));
    let command = CommandHandle::new(TestCommand {
        name: name.to_string(),
        requirements: requires.iter().map(|s| s.id()).collect(),
        journal: journal.clone(),
        done: done.clone(),
    })
    .erase();
    Probe { command, done }
}
