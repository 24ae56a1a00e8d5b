//! Submitting commands from outside the scheduler's call stack
//!
//! A [`SubmitHandle`] can be cloned into other threads or into commands
//! themselves. Submissions are validated immediately and queued; the
//! scheduler applies them in order at the start of its next tick.

use super::scheduler::unregistered;
use crate::core::{CommandId, CommandRef, Requirements, SubsystemId};
use crate::error::StewardResult;
use crossbeam::channel::{Receiver, Sender};
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// State the scheduler shares with its submit handles.
#[derive(Debug, Default)]
pub(crate) struct SharedState {
    pub registered: RwLock<HashSet<SubsystemId>>,
    pub enabled: AtomicBool,
    /// Name and requirements of every command the scheduler may be running a
    /// hook on: pending, active, or being ended.
    pub tracked: RwLock<HashMap<CommandId, (String, Requirements)>>,
}

impl SharedState {
    fn describe(&self, command: &CommandRef) -> (String, Requirements) {
        if let Some(guard) = command.try_lock() {
            return (guard.name().to_string(), guard.requirements());
        }
        // Locked by one of its own hooks on the scheduler thread.
        if let Some(cached) = self.tracked.read().get(&command.id()) {
            return cached.clone();
        }
        let guard = command.lock();
        (guard.name().to_string(), guard.requirements())
    }
}

pub(crate) struct Submission {
    pub command: CommandRef,
    pub interruptible: bool,
}

/// Cloneable, thread-safe way to queue commands on a
/// [`Scheduler`](super::Scheduler).
#[derive(Clone)]
pub struct SubmitHandle {
    shared: Arc<SharedState>,
    tx: Sender<Submission>,
}

impl SubmitHandle {
    pub(crate) fn new(shared: Arc<SharedState>, tx: Sender<Submission>) -> Self {
        Self { shared, tx }
    }

    /// Queue `command` for the next tick.
    ///
    /// Safe to call from inside any hook, including one of `command`'s own.
    ///
    /// Fails with [`UnregisteredSubsystem`](crate::StewardError::UnregisteredSubsystem)
    /// if the command needs a subsystem the scheduler does not know. While the
    /// scheduler is disabled the command is dropped silently.
    pub fn submit(&self, command: &CommandRef, interruptible: bool) -> StewardResult<()> {
        let (name, requirements) = self.shared.describe(command);
        {
            let registered = self.shared.registered.read();
            if let Some(missing) = requirements.iter().find(|id| !registered.contains(id)) {
                return Err(unregistered(name, command.id(), *missing));
            }
        }

        if !self.shared.enabled.load(Ordering::Acquire) {
            return Ok(());
        }

        // The scheduler owns the receiver; a send only fails once it is gone.
        let _ = self.tx.send(Submission {
            command: command.clone(),
            interruptible,
        });
        Ok(())
    }

    pub fn is_enabled(&self) -> bool {
        self.shared.enabled.load(Ordering::Acquire)
    }
}

pub(crate) fn channel() -> (Sender<Submission>, Receiver<Submission>) {
    crossbeam::channel::unbounded()
}
