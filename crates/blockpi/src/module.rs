//! Harness module layer
//!
//! One [`RootModule`] exists per process. Every virtual user gets its own
//! [`ModuleInstance`], which exposes `sign` and counter construction to the
//! user's script. Counters may only be declared while the virtual user is
//! still in its init phase.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use blockpi_core::{CounterHandle, CounterRegistry, Error};
use tracing::debug;

use crate::error::Result;

/// Names the host binds for every module instance
///
/// Informational: the host calls [`ModuleInstance::sign`] and
/// [`ModuleInstance::new_counter`] directly, so nothing dispatches on these
/// strings. `"sign"` maps to the former and `"Counter"` to the latter.
pub const EXPORTS: &[&str] = &["sign", "Counter"];

/// Lifecycle phase of a virtual user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VuPhase {
    /// Script top-level code is running; persistent state may be declared
    Init,
    /// Iterations are running
    Running,
}

/// Handle to one virtual user
///
/// Clones share the phase, so a module instance sees the transition to
/// [`VuPhase::Running`] made by the driver.
#[derive(Debug, Clone)]
pub struct VirtualUser {
    id: u64,
    running: Arc<AtomicBool>,
}

impl VirtualUser {
    pub fn new(id: u64) -> Self {
        Self {
            id,
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn phase(&self) -> VuPhase {
        if self.running.load(Ordering::Acquire) {
            VuPhase::Running
        } else {
            VuPhase::Init
        }
    }

    /// Leave the init phase
    pub fn start(&self) {
        self.running.store(true, Ordering::Release);
    }
}

/// Process-wide module root
#[derive(Debug, Clone, Copy)]
pub struct RootModule<'r> {
    registry: &'r CounterRegistry,
}

impl RootModule<'static> {
    /// Root module backed by the process-wide counter registry
    pub fn new() -> Self {
        Self {
            registry: CounterRegistry::global(),
        }
    }
}

impl Default for RootModule<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'r> RootModule<'r> {
    /// Root module backed by a caller-owned registry
    pub fn with_registry(registry: &'r CounterRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &'r CounterRegistry {
        self.registry
    }

    /// Create the module instance for one virtual user
    pub fn new_module_instance(&self, vu: &VirtualUser) -> ModuleInstance<'r> {
        debug!(vu = vu.id(), "new module instance");
        ModuleInstance {
            vu: vu.clone(),
            registry: self.registry,
        }
    }
}

/// Per-virtual-user view of the module
#[derive(Debug, Clone)]
pub struct ModuleInstance<'r> {
    vu: VirtualUser,
    registry: &'r CounterRegistry,
}

impl<'r> ModuleInstance<'r> {
    pub fn exports(&self) -> &'static [&'static str] {
        EXPORTS
    }

    pub fn vu(&self) -> &VirtualUser {
        &self.vu
    }

    /// Sign `data` with a hex private key; see [`blockpi_core::sign`]
    pub fn sign(&self, private_key_hex: &str, data: &str) -> Result<String> {
        Ok(blockpi_core::sign(private_key_hex, data)?)
    }

    /// Declare (or look up) the counter `name`
    ///
    /// Fails with a context error once the virtual user has left its init
    /// phase.
    pub fn new_counter(&self, name: &str) -> Result<CounterHandle> {
        if self.vu.phase() != VuPhase::Init {
            return Err(Error::Context(format!(
                "counter {name:?} must be created in the init context (vu {})",
                self.vu.id()
            ))
            .into());
        }
        Ok(self.registry.get_or_create(name))
    }
}
