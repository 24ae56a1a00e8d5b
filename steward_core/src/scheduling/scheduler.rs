use super::config::SchedulerConfig;
use super::submit::{self, SharedState, SubmitHandle, Submission};
use super::table::OrderedTable;
use crate::core::{CommandId, CommandRef, CommandState, Requirements, SubsystemId, SubsystemRef};
use crate::error::{StewardError, StewardResult};
use crossbeam::channel::{Receiver, Sender};
use std::collections::HashMap;
use std::sync::atomic::Ordering;
use std::sync::Arc;

macro_rules! transition {
    ($sched:expr, $($arg:tt)+) => {
        if $sched.config.log_transitions {
            log::debug!("[{}] {}", $sched.config.name, format_args!($($arg)+));
        }
    };
}

pub(crate) fn unregistered(name: String, command: CommandId, subsystem: SubsystemId) -> StewardError {
    StewardError::UnregisteredSubsystem {
        name,
        command,
        subsystem,
    }
}

struct RegisteredSubsystem {
    handle: SubsystemRef,
    name: String,
    default_command: Option<CommandRef>,
}

/// A pending or active command together with what the scheduler cached
/// about it at submission time.
struct ScheduledCommand {
    command: CommandRef,
    name: String,
    interruptible: bool,
    requirements: Requirements,
}

/// Cumulative counters, updated as the scheduler runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchedulerMetrics {
    pub ticks: u64,
    pub admitted: u64,
    pub preempted: u64,
    pub completed: u64,
    pub blocked: u64,
    pub defaults_scheduled: u64,
    pub force_stopped: u64,
}

/// Central orchestrator: owns the subsystem registry, the pending and active
/// command sets and the subsystem ownership table, and drives every
/// lifecycle hook once per [`tick`](Scheduler::tick).
///
/// Ownership invariant: every key in `owners` is a requirement of exactly the
/// active command it maps to, and every active command's requirements are all
/// keys mapping to it.
pub struct Scheduler {
    subsystems: Vec<RegisteredSubsystem>,
    pending: OrderedTable<CommandId, ScheduledCommand>,
    active: OrderedTable<CommandId, ScheduledCommand>,
    owners: HashMap<SubsystemId, CommandId>,
    shared: Arc<SharedState>,
    inbox_tx: Sender<Submission>,
    inbox_rx: Receiver<Submission>,
    metrics: SchedulerMetrics,
    config: SchedulerConfig,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler {
    /// Create an empty, disabled scheduler.
    pub fn new() -> Self {
        Self::with_config(SchedulerConfig::default())
    }

    pub fn with_config(config: SchedulerConfig) -> Self {
        let (inbox_tx, inbox_rx) = submit::channel();
        Self {
            subsystems: Vec::new(),
            pending: OrderedTable::new(),
            active: OrderedTable::new(),
            owners: HashMap::new(),
            shared: Arc::new(SharedState::default()),
            inbox_tx,
            inbox_rx,
            metrics: SchedulerMetrics::default(),
            config,
        }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    // ============================================================================
    // Configuration phase
    // ============================================================================

    /// Register one or more subsystems. Only allowed while disabled.
    ///
    /// Fails with [`StewardError::AlreadyEnabled`] once [`enable`](Self::enable)
    /// has run; nothing is registered in that case. Registering the same
    /// subsystem twice is ignored.
    pub fn register_subsystems<I>(&mut self, subsystems: I) -> StewardResult<()>
    where
        I: IntoIterator<Item = SubsystemRef>,
    {
        if self.is_enabled() {
            return Err(StewardError::AlreadyEnabled);
        }

        let mut registered = self.shared.registered.write();
        for handle in subsystems {
            if !registered.insert(handle.id()) {
                log::warn!("[{}] subsystem {} registered twice, ignoring", self.config.name, handle.id());
                continue;
            }
            let name = handle.lock().name().to_string();
            log::info!("[{}] registered subsystem '{}' ({})", self.config.name, name, handle.id());
            self.subsystems.push(RegisteredSubsystem {
                handle,
                name,
                default_command: None,
            });
        }
        Ok(())
    }

    /// Set or replace the command scheduled whenever `subsystem` has no owner.
    ///
    /// The default command should require exactly `subsystem`; this is not
    /// enforced. A replacement only affects future backfills, never a default
    /// command that is already running.
    pub fn set_default_command(&mut self, subsystem: SubsystemId, command: CommandRef) -> StewardResult<()> {
        let entry = self
            .subsystems
            .iter_mut()
            .find(|s| s.handle.id() == subsystem)
            .ok_or(StewardError::UnknownSubsystem(subsystem))?;

        let (name, requirements) = {
            let guard = command.lock();
            (guard.name().to_string(), guard.requirements())
        };
        if !requirements.contains(&subsystem) || requirements.len() > 1 {
            log::warn!(
                "[{}] default command '{}' for '{}' should require exactly that subsystem",
                self.config.name,
                name,
                entry.name
            );
        }
        log::info!("[{}] default command for '{}' is now '{}'", self.config.name, entry.name, name);
        entry.default_command = Some(command);
        Ok(())
    }

    /// Handle for queueing commands from other threads or from inside hooks.
    pub fn submit_handle(&self) -> SubmitHandle {
        SubmitHandle::new(Arc::clone(&self.shared), self.inbox_tx.clone())
    }

    // ============================================================================
    // Submission
    // ============================================================================

    /// Queue `command` for admission on the next tick.
    ///
    /// Fails with [`StewardError::UnregisteredSubsystem`] if any requirement is
    /// not registered; the pending queue is left untouched. While disabled the
    /// command is dropped silently. Resubmitting a command that is still
    /// pending overwrites its interruptible flag and keeps its queue position.
    pub fn submit(&mut self, command: &CommandRef, interruptible: bool) -> StewardResult<()> {
        let entry = self.prepare(command, interruptible)?;
        if !self.is_enabled() {
            transition!(self, "dropped '{}': scheduler disabled", entry.name);
            return Ok(());
        }
        transition!(self, "queued '{}' (interruptible: {})", entry.name, interruptible);
        self.enqueue(entry);
        Ok(())
    }

    fn enqueue(&mut self, entry: ScheduledCommand) {
        let id = entry.command.id();
        self.shared
            .tracked
            .write()
            .insert(id, (entry.name.clone(), entry.requirements.clone()));
        self.pending.insert(id, entry);
    }

    /// Drop the cached description of a command once it is neither pending
    /// nor active.
    fn forget(&self, id: CommandId) {
        if !self.pending.contains(&id) && !self.active.contains(&id) {
            self.shared.tracked.write().remove(&id);
        }
    }

    fn prepare(&self, command: &CommandRef, interruptible: bool) -> StewardResult<ScheduledCommand> {
        let (name, requirements) = {
            let guard = command.lock();
            (guard.name().to_string(), guard.requirements())
        };
        let registered = self.shared.registered.read();
        if let Some(missing) = requirements.iter().find(|id| !registered.contains(id)) {
            return Err(unregistered(name, command.id(), *missing));
        }
        Ok(ScheduledCommand {
            command: command.clone(),
            name,
            interruptible,
            requirements,
        })
    }

    // ============================================================================
    // Enable / disable
    // ============================================================================

    /// Run every subsystem's `init()` in registration order, then start
    /// scheduling. Calling it again re-runs the subsystem inits.
    pub fn enable(&mut self) -> StewardResult<()> {
        for subsystem in &self.subsystems {
            subsystem.handle.lock().init()?;
        }
        self.shared.enabled.store(true, Ordering::Release);
        log::info!(
            "[{}] enabled with {} subsystem(s)",
            self.config.name,
            self.subsystems.len()
        );
        Ok(())
    }

    /// Stop scheduling, end every active command with `end(false)`, drop
    /// pending commands without any callback, then `stop()` every subsystem in
    /// registration order.
    pub fn disable(&mut self) -> StewardResult<()> {
        self.shared.enabled.store(false, Ordering::Release);

        let dropped = self.pending.len() + self.inbox_rx.try_iter().count();
        self.pending.clear();

        let running: Vec<(String, CommandRef)> = self
            .active
            .values()
            .map(|e| (e.name.clone(), e.command.clone()))
            .collect();
        self.active.clear();
        self.owners.clear();

        let mut ended = Ok(());
        for (name, command) in running {
            transition!(self, "force stopping '{}'", name);
            self.metrics.force_stopped += 1;
            if let Err(e) = command.lock().end(false) {
                ended = Err(e);
                break;
            }
        }
        self.shared.tracked.write().clear();
        ended?;

        for subsystem in &self.subsystems {
            subsystem.handle.lock().stop()?;
        }
        log::info!(
            "[{}] disabled ({} pending command(s) dropped)",
            self.config.name,
            dropped
        );
        Ok(())
    }

    // ============================================================================
    // Tick
    // ============================================================================

    /// Run one scheduling cycle. No-op while disabled.
    ///
    /// 1. apply submissions queued through [`SubmitHandle`]s
    /// 2. `periodic()` on every subsystem
    /// 3. end and release every finished command
    /// 4. admit pending commands in submission order, preempting
    ///    interruptible owners
    /// 5. schedule default commands on subsystems left without an owner
    /// 6. `execute()` every active command
    ///
    /// A hook error aborts the tick and is returned as-is.
    pub fn tick(&mut self) -> StewardResult<()> {
        if !self.is_enabled() {
            return Ok(());
        }
        self.metrics.ticks += 1;

        self.drain_inbox()?;
        for subsystem in &self.subsystems {
            subsystem.handle.lock().periodic()?;
        }
        self.reap_finished()?;
        self.admit_pending()?;
        self.schedule_defaults()?;
        self.execute_active()
    }

    fn drain_inbox(&mut self) -> StewardResult<()> {
        let queued: Vec<Submission> = self.inbox_rx.try_iter().collect();
        for submission in queued {
            self.submit(&submission.command, submission.interruptible)?;
        }
        Ok(())
    }

    fn reap_finished(&mut self) -> StewardResult<()> {
        let finished: Vec<CommandId> = self
            .active
            .values()
            .filter(|e| e.command.lock().is_finished())
            .map(|e| e.command.id())
            .collect();

        for id in finished {
            if let Some(entry) = self.retire(id) {
                transition!(self, "'{}' finished", entry.name);
                self.metrics.completed += 1;
                let ended = entry.command.lock().end(false);
                self.forget(id);
                ended?;
            }
        }
        Ok(())
    }

    fn admit_pending(&mut self) -> StewardResult<()> {
        let candidates: Vec<CommandId> = self.pending.keys().collect();
        for id in candidates {
            self.try_admit(id)?;
        }
        Ok(())
    }

    fn schedule_defaults(&mut self) -> StewardResult<()> {
        for idx in 0..self.subsystems.len() {
            let subsystem = self.subsystems[idx].handle.id();
            if self.owners.contains_key(&subsystem) {
                continue;
            }
            let Some(default) = self.subsystems[idx].default_command.clone() else {
                continue;
            };
            // A default that does not require its own subsystem leaves it
            // unowned; do not restart it every tick.
            if self.active.contains(&default.id()) {
                continue;
            }
            // Already blocked once this tick by the admission pass.
            if self.pending.contains(&default.id()) {
                continue;
            }

            let entry = self.prepare(&default, true)?;
            transition!(self, "backfilling '{}' with default '{}'", self.subsystems[idx].name, entry.name);
            self.enqueue(entry);
            if self.try_admit(default.id())? {
                self.metrics.defaults_scheduled += 1;
            }
        }
        Ok(())
    }

    fn execute_active(&mut self) -> StewardResult<()> {
        let running: Vec<CommandRef> = self.active.values().map(|e| e.command.clone()).collect();
        for command in running {
            command.lock().execute()?;
        }
        Ok(())
    }

    /// Try to move one pending command to the active set.
    ///
    /// Every conflict is checked before anything is preempted: if any current
    /// owner is non-interruptible the candidate stays pending and no owner is
    /// touched. Otherwise all conflicting owners are ended with `end(true)`
    /// and the candidate takes their subsystems.
    fn try_admit(&mut self, id: CommandId) -> StewardResult<bool> {
        let Some(candidate) = self.pending.get(&id) else {
            return Ok(false);
        };

        let mut owners: Vec<CommandId> = candidate
            .requirements
            .iter()
            .filter_map(|s| self.owners.get(s).copied())
            .collect();
        // Resubmitted while still running: it conflicts with itself.
        if self.active.contains(&id) {
            owners.push(id);
        }

        let mut victims: Vec<CommandId> = Vec::new();
        for owner in owners {
            if victims.contains(&owner) {
                continue;
            }
            let interruptible = self.active.get(&owner).map_or(true, |e| e.interruptible);
            if !interruptible {
                let owner_name = self.active.get(&owner).map_or("?", |e| e.name.as_str());
                transition!(self, "'{}' blocked by '{}'", candidate.name, owner_name);
                self.metrics.blocked += 1;
                return Ok(false);
            }
            victims.push(owner);
        }

        for victim in victims {
            if let Some(entry) = self.retire(victim) {
                transition!(self, "'{}' interrupted", entry.name);
                self.metrics.preempted += 1;
                let ended = entry.command.lock().end(true);
                self.forget(victim);
                ended?;
            }
        }

        let Some(entry) = self.pending.remove(&id) else {
            return Ok(false);
        };
        for subsystem in &entry.requirements {
            self.owners.insert(*subsystem, id);
        }
        transition!(self, "'{}' started (interruptible: {})", entry.name, entry.interruptible);
        let command = entry.command.clone();
        self.active.insert(id, entry);
        self.metrics.admitted += 1;
        command.lock().init()?;
        Ok(true)
    }

    /// Remove an active command and release every subsystem it owns.
    fn retire(&mut self, id: CommandId) -> Option<ScheduledCommand> {
        let entry = self.active.remove(&id)?;
        for subsystem in &entry.requirements {
            if self.owners.get(subsystem) == Some(&id) {
                self.owners.remove(subsystem);
            }
        }
        Some(entry)
    }

    // ============================================================================
    // Inspection
    // ============================================================================

    pub fn is_enabled(&self) -> bool {
        self.shared.enabled.load(Ordering::Acquire)
    }

    pub fn is_registered(&self, subsystem: SubsystemId) -> bool {
        self.shared.registered.read().contains(&subsystem)
    }

    pub fn subsystem_count(&self) -> usize {
        self.subsystems.len()
    }

    pub fn state_of(&self, command: CommandId) -> CommandState {
        if let Some(entry) = self.active.get(&command) {
            CommandState::Active {
                interruptible: entry.interruptible,
            }
        } else if let Some(entry) = self.pending.get(&command) {
            CommandState::Pending {
                interruptible: entry.interruptible,
            }
        } else {
            CommandState::Idle
        }
    }

    /// Active command currently owning `subsystem`.
    pub fn owner_of(&self, subsystem: SubsystemId) -> Option<CommandRef> {
        let owner = self.owners.get(&subsystem)?;
        self.active.get(owner).map(|e| e.command.clone())
    }

    pub fn default_command(&self, subsystem: SubsystemId) -> Option<CommandRef> {
        self.subsystems
            .iter()
            .find(|s| s.handle.id() == subsystem)
            .and_then(|s| s.default_command.clone())
    }

    /// Active commands in admission order.
    pub fn active_commands(&self) -> Vec<CommandRef> {
        self.active.values().map(|e| e.command.clone()).collect()
    }

    /// Pending commands in submission order.
    pub fn pending_commands(&self) -> Vec<CommandRef> {
        self.pending.values().map(|e| e.command.clone()).collect()
    }

    pub fn active_len(&self) -> usize {
        self.active.len()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn metrics(&self) -> SchedulerMetrics {
        self.metrics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Command, CommandHandle, FnCommand, Subsystem, SubsystemHandle};

    struct Motor;
    impl Subsystem for Motor {}

    fn motor() -> SubsystemRef {
        SubsystemHandle::new(Motor).erase()
    }

    fn needs(name: &'static str, subsystems: &[&SubsystemRef]) -> CommandRef {
        let cmd = FnCommand::builder(name)
            .requires_all(subsystems.iter().map(|s| s.id()))
            .build();
        CommandHandle::new(cmd).erase()
    }

    fn ownership_is_consistent(sched: &Scheduler) -> bool {
        let owners_ok = sched.owners.iter().all(|(sub, owner)| {
            sched
                .active
                .get(owner)
                .is_some_and(|e| e.requirements.contains(sub))
        });
        let active_ok = sched.active.values().all(|e| {
            e.requirements
                .iter()
                .all(|s| sched.owners.get(s) == Some(&e.command.id()))
        });
        owners_ok && active_ok
    }

    #[test]
    fn test_blocked_candidate_preempts_nothing() {
        let (a, b) = (motor(), motor());
        let mut sched = Scheduler::with_config(SchedulerConfig::quiet());
        sched.register_subsystems([a.clone(), b.clone()]).unwrap();
        sched.enable().unwrap();

        let on_a = needs("on_a", &[&a]);
        let locked_b = needs("locked_b", &[&b]);
        sched.submit(&on_a, true).unwrap();
        sched.submit(&locked_b, false).unwrap();
        sched.tick().unwrap();

        let both = needs("both", &[&a, &b]);
        sched.submit(&both, true).unwrap();
        sched.tick().unwrap();

        // The interruptible owner of `a` must survive because `b` is locked.
        assert!(sched.state_of(on_a.id()).is_active());
        assert!(sched.state_of(both.id()).is_pending());
        assert!(ownership_is_consistent(&sched));
    }

    #[test]
    fn test_resubmitting_active_interruptible_restarts_it() {
        let a = motor();
        let mut sched = Scheduler::with_config(SchedulerConfig::quiet());
        sched.register_subsystems([a.clone()]).unwrap();
        sched.enable().unwrap();

        let cmd = needs("drive", &[&a]);
        sched.submit(&cmd, true).unwrap();
        sched.tick().unwrap();
        sched.submit(&cmd, false).unwrap();
        sched.tick().unwrap();

        assert_eq!(
            sched.state_of(cmd.id()),
            CommandState::Active {
                interruptible: false
            }
        );
        assert_eq!(sched.metrics().preempted, 1);
        assert_eq!(sched.active_len(), 1);
        assert!(ownership_is_consistent(&sched));
    }

    #[test]
    fn test_retire_releases_only_own_subsystems() {
        let (a, b) = (motor(), motor());
        let mut sched = Scheduler::with_config(SchedulerConfig::quiet());
        sched.register_subsystems([a.clone(), b.clone()]).unwrap();
        sched.enable().unwrap();

        let first = needs("first", &[&a]);
        let second = needs("second", &[&b]);
        sched.submit(&first, true).unwrap();
        sched.submit(&second, true).unwrap();
        sched.tick().unwrap();

        sched.retire(first.id());
        assert!(sched.owner_of(a.id()).is_none());
        assert_eq!(sched.owner_of(b.id()).map(|c| c.id()), Some(second.id()));
        assert!(ownership_is_consistent(&sched));
    }

    #[test]
    fn test_command_without_requirements_runs() {
        let mut sched = Scheduler::with_config(SchedulerConfig::quiet());
        sched.enable().unwrap();

        let cmd = needs("blink", &[]);
        sched.submit(&cmd, false).unwrap();
        sched.tick().unwrap();
        assert!(sched.state_of(cmd.id()).is_active());
        assert_eq!(cmd.lock().name(), "blink");
    }
}
