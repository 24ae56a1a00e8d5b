//! Shared handles and identities for subsystems and commands
//!
//! The scheduler never owns user objects outright. Application code keeps a
//! typed handle (`SubsystemHandle<Drive>`) for direct access while the
//! scheduler stores the type-erased form (`SubsystemRef`). Both share the same
//! identity, which is what equality and hashing are based on.

use super::command::Command;
use super::subsystem::Subsystem;
use parking_lot::{Mutex, MutexGuard};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

static NEXT_SUBSYSTEM_ID: AtomicU64 = AtomicU64::new(1);
static NEXT_COMMAND_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a subsystem, stable for the process lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubsystemId(u64);

impl SubsystemId {
    fn next() -> Self {
        SubsystemId(NEXT_SUBSYSTEM_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SubsystemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "subsystem#{}", self.0)
    }
}

/// Identity of a command instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CommandId(u64);

impl CommandId {
    fn next() -> Self {
        CommandId(NEXT_COMMAND_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for CommandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "command#{}", self.0)
    }
}

/// Shared, lockable handle to a subsystem.
pub struct SubsystemHandle<S: ?Sized = dyn Subsystem> {
    id: SubsystemId,
    cell: Arc<Mutex<S>>,
}

/// Type-erased subsystem handle as stored by the scheduler.
pub type SubsystemRef = SubsystemHandle<dyn Subsystem>;

impl<S: Subsystem + 'static> SubsystemHandle<S> {
    pub fn new(subsystem: S) -> Self {
        Self {
            id: SubsystemId::next(),
            cell: Arc::new(Mutex::new(subsystem)),
        }
    }

    /// Type-erased handle sharing this handle's identity.
    pub fn erase(&self) -> SubsystemRef {
        let cell: Arc<Mutex<dyn Subsystem>> = self.cell.clone();
        SubsystemHandle { id: self.id, cell }
    }
}

impl<S: ?Sized> SubsystemHandle<S> {
    pub fn id(&self) -> SubsystemId {
        self.id
    }

    /// Lock the subsystem for direct access.
    pub fn lock(&self) -> MutexGuard<'_, S> {
        self.cell.lock()
    }
}

impl<S: ?Sized> Clone for SubsystemHandle<S> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            cell: Arc::clone(&self.cell),
        }
    }
}

impl<S: ?Sized> PartialEq for SubsystemHandle<S> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<S: ?Sized> Eq for SubsystemHandle<S> {}

impl<S: ?Sized> Hash for SubsystemHandle<S> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl<S: ?Sized> fmt::Debug for SubsystemHandle<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SubsystemHandle").field(&self.id).finish()
    }
}

/// Shared, lockable handle to a command.
pub struct CommandHandle<C: ?Sized = dyn Command> {
    id: CommandId,
    cell: Arc<Mutex<C>>,
}

/// Type-erased command handle as stored by the scheduler.
pub type CommandRef = CommandHandle<dyn Command>;

impl<C: Command + 'static> CommandHandle<C> {
    pub fn new(command: C) -> Self {
        Self {
            id: CommandId::next(),
            cell: Arc::new(Mutex::new(command)),
        }
    }

    /// Type-erased handle sharing this handle's identity.
    pub fn erase(&self) -> CommandRef {
        let cell: Arc<Mutex<dyn Command>> = self.cell.clone();
        CommandHandle { id: self.id, cell }
    }
}

impl<C: ?Sized> CommandHandle<C> {
    pub fn id(&self) -> CommandId {
        self.id
    }

    /// Lock the command for direct access.
    ///
    /// Must not be held across a call into the scheduler that may run the
    /// command's hooks, or the scheduler will deadlock on it.
    pub fn lock(&self) -> MutexGuard<'_, C> {
        self.cell.lock()
    }

    /// Lock the command only if nobody else holds it.
    pub fn try_lock(&self) -> Option<MutexGuard<'_, C>> {
        self.cell.try_lock()
    }
}

impl<C: ?Sized> Clone for CommandHandle<C> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            cell: Arc::clone(&self.cell),
        }
    }
}

impl<C: ?Sized> PartialEq for CommandHandle<C> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<C: ?Sized> Eq for CommandHandle<C> {}

impl<C: ?Sized> Hash for CommandHandle<C> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl<C: ?Sized> fmt::Debug for CommandHandle<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CommandHandle").field(&self.id).finish()
    }
}
