//! ResourceArc Wrappers
//!
//! Persistent state for live documents and their change monitors.

use crate::config::EngineConfig;
use crate::dom::Document;
use crate::highlight::Highlighter;
use crate::keywords::MemoryStore;
use crate::monitor::ChangeMonitor;
use crate::visibility::InlineStyleProbe;
use rustler::ResourceArc;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// A live document plus the options it was created with
pub struct DocumentResource {
    pub doc: Mutex<Document>,
    pub config: EngineConfig,
}

impl DocumentResource {
    pub fn new(doc: Document, config: EngineConfig) -> Self {
        DocumentResource {
            doc: Mutex::new(doc),
            config,
        }
    }

    /// Run `f` with exclusive access to the document.
    ///
    /// # Errors
    ///
    /// Returns `"mutex_poisoned"` if the document mutex is poisoned.
    pub fn with_doc<F, R>(&self, f: F) -> Result<R, &'static str>
    where
        F: FnOnce(&mut Document, &EngineConfig) -> R,
    {
        let mut guard = self.doc.lock().map_err(|_| "mutex_poisoned")?;
        Ok(f(&mut guard, &self.config))
    }
}

#[rustler::resource_impl]
impl rustler::Resource for DocumentResource {}

/// Type alias for document ResourceArc
pub type DocumentRef = ResourceArc<DocumentResource>;

/// Monitor driven by the host's keyword list and clock
pub type HostMonitor = ChangeMonitor<MemoryStore, InlineStyleProbe>;

pub struct MonitorResource {
    pub monitor: Mutex<HostMonitor>,
    /// `now_ms` values from the host are offsets from this instant
    epoch: Instant,
}

impl MonitorResource {
    pub fn new(config: EngineConfig) -> Self {
        let highlighter = Highlighter::new(config, MemoryStore::new(), InlineStyleProbe);
        MonitorResource {
            monitor: Mutex::new(ChangeMonitor::new(highlighter)),
            epoch: Instant::now(),
        }
    }

    /// Map a host timestamp onto the monitor's clock
    pub fn instant(&self, now_ms: u64) -> Instant {
        self.epoch + Duration::from_millis(now_ms)
    }

    /// # Errors
    ///
    /// Returns `"mutex_poisoned"` if the monitor mutex is poisoned.
    pub fn with_monitor<F, R>(&self, f: F) -> Result<R, &'static str>
    where
        F: FnOnce(&mut HostMonitor) -> R,
    {
        let mut guard = self.monitor.lock().map_err(|_| "mutex_poisoned")?;
        Ok(f(&mut guard))
    }
}

#[rustler::resource_impl]
impl rustler::Resource for MonitorResource {}

/// Type alias for monitor ResourceArc
pub type MonitorRef = ResourceArc<MonitorResource>;
