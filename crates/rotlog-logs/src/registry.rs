//! Process-wide table of rotating writers

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

use crate::clock::{Clock, SystemClock};
use crate::identity::WriterId;
use crate::writer::{RotatingWriter, WriterLimits};

static GLOBAL: Lazy<Arc<Registry>> = Lazy::new(|| Arc::new(Registry::new()));

/// At most one writer per physical file
///
/// Writers are never removed; they live as long as the registry.
pub struct Registry {
    writers: RwLock<HashMap<WriterId, Arc<RotatingWriter>>>,
    clock: Arc<dyn Clock>,
}

impl Registry {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Registry whose writers read time from `clock`
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            writers: RwLock::new(HashMap::new()),
            clock,
        }
    }

    /// Registry shared by the default logger
    pub fn global() -> Arc<Registry> {
        GLOBAL.clone()
    }

    pub fn get(&self, id: &WriterId) -> Option<Arc<RotatingWriter>> {
        self.writers.read().get(id).cloned()
    }

    /// Return the writer for `id`, creating it on first use
    ///
    /// The first caller decides `dir`, `filename` and `limits`; later callers
    /// get the existing writer unchanged.
    pub fn get_or_create(
        &self,
        id: &WriterId,
        dir: &Path,
        filename: &str,
        limits: WriterLimits,
    ) -> Arc<RotatingWriter> {
        if let Some(writer) = self.get(id) {
            return writer;
        }

        let mut writers = self.writers.write();
        writers
            .entry(id.clone())
            .or_insert_with(|| {
                debug!("Registering log writer {} for {}", id, dir.join(filename).display());
                Arc::new(RotatingWriter::open(
                    id.clone(),
                    dir,
                    filename,
                    limits,
                    self.clock.clone(),
                ))
            })
            .clone()
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    pub fn len(&self) -> usize {
        self.writers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.writers.read().is_empty()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("writers", &self.len())
            .finish()
    }
}
