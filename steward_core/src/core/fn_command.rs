//! Closure-backed commands
//!
//! [`FnCommand`] assembles a [`Command`] from closures, for small one-off
//! behaviours that do not deserve their own type:
//!
//! ```rust
//! use steward_core::core::{Command, CommandHandle, FnCommand, Subsystem, SubsystemHandle};
//!
//! struct Intake;
//! impl Subsystem for Intake {}
//!
//! let intake = SubsystemHandle::new(Intake);
//! let spin = FnCommand::builder("spin_intake")
//!     .requires(intake.id())
//!     .on_execute(|| Ok(()))
//!     .build();
//! let spin = CommandHandle::new(spin).erase();
//! assert_eq!(spin.lock().name(), "spin_intake");
//! ```

use super::command::{Command, Requirements};
use super::handle::SubsystemId;
use crate::error::StewardResult;
use std::borrow::Cow;

type HookFn = Box<dyn FnMut() -> StewardResult<()> + Send>;
type EndFn = Box<dyn FnMut(bool) -> StewardResult<()> + Send>;
type FinishedFn = Box<dyn FnMut() -> bool + Send>;

/// Command built from closures. Missing closures behave like the
/// [`Command`] defaults.
pub struct FnCommand {
    name: Cow<'static, str>,
    requirements: Requirements,
    on_init: Option<HookFn>,
    on_execute: Option<HookFn>,
    on_end: Option<EndFn>,
    finished_when: Option<FinishedFn>,
}

impl FnCommand {
    pub fn builder(name: impl Into<Cow<'static, str>>) -> FnCommandBuilder {
        FnCommandBuilder {
            inner: FnCommand {
                name: name.into(),
                requirements: Requirements::new(),
                on_init: None,
                on_execute: None,
                on_end: None,
                finished_when: None,
            },
        }
    }

    /// Command that runs `f` once on init and finishes right away.
    pub fn instant<F>(
        name: impl Into<Cow<'static, str>>,
        requirements: Requirements,
        mut f: F,
    ) -> Self
    where
        F: FnMut() -> StewardResult<()> + Send + 'static,
    {
        Self::builder(name)
            .requires_all(requirements)
            .on_init(move || f())
            .finished_when(|| true)
            .build()
    }
}

impl Command for FnCommand {
    fn name(&self) -> &str {
        &self.name
    }

    fn requirements(&self) -> Requirements {
        self.requirements.clone()
    }

    fn init(&mut self) -> StewardResult<()> {
        match self.on_init.as_mut() {
            Some(f) => f(),
            None => Ok(()),
        }
    }

    fn execute(&mut self) -> StewardResult<()> {
        match self.on_execute.as_mut() {
            Some(f) => f(),
            None => Ok(()),
        }
    }

    fn end(&mut self, interrupted: bool) -> StewardResult<()> {
        match self.on_end.as_mut() {
            Some(f) => f(interrupted),
            None => Ok(()),
        }
    }

    fn is_finished(&mut self) -> bool {
        self.finished_when.as_mut().is_some_and(|f| f())
    }
}

/// Builder for [`FnCommand`].
pub struct FnCommandBuilder {
    inner: FnCommand,
}

impl FnCommandBuilder {
    pub fn requires(mut self, subsystem: SubsystemId) -> Self {
        self.inner.requirements.insert(subsystem);
        self
    }

    pub fn requires_all(mut self, subsystems: impl IntoIterator<Item = SubsystemId>) -> Self {
        self.inner.requirements.extend(subsystems);
        self
    }

    pub fn on_init<F>(mut self, f: F) -> Self
    where
        F: FnMut() -> StewardResult<()> + Send + 'static,
    {
        self.inner.on_init = Some(Box::new(f));
        self
    }

    pub fn on_execute<F>(mut self, f: F) -> Self
    where
        F: FnMut() -> StewardResult<()> + Send + 'static,
    {
        self.inner.on_execute = Some(Box::new(f));
        self
    }

    pub fn on_end<F>(mut self, f: F) -> Self
    where
        F: FnMut(bool) -> StewardResult<()> + Send + 'static,
    {
        self.inner.on_end = Some(Box::new(f));
        self
    }

    pub fn finished_when<F>(mut self, f: F) -> Self
    where
        F: FnMut() -> bool + Send + 'static,
    {
        self.inner.finished_when = Some(Box::new(f));
        self
    }

    pub fn build(self) -> FnCommand {
        self.inner
    }
}
