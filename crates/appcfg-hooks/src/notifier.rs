//! Asset-change flag shared with a background watcher
//!
//! The watcher thread holds an [`AssetChangeHandle`] and reports changed
//! paths. The main thread takes the flag on its next tick.

use std::sync::{Arc, Mutex, PoisonError};

use appcfg_fs::{NormalizedPath, ProjectLayout};

#[derive(Debug)]
struct Shared {
    pending: Mutex<bool>,
    layout: ProjectLayout,
}

impl Shared {
    fn set(&self) {
        *self.pending.lock().unwrap_or_else(PoisonError::into_inner) = true;
    }
}

/// Main-thread side of the asset-change flag.
#[derive(Debug)]
pub struct AssetChangeNotifier {
    shared: Arc<Shared>,
}

impl AssetChangeNotifier {
    /// Notifier reacting to the layout's recognized config basenames.
    pub fn new(layout: &ProjectLayout) -> Self {
        Self {
            shared: Arc::new(Shared {
                pending: Mutex::new(false),
                layout: layout.clone(),
            }),
        }
    }

    /// A cloneable handle for the watcher thread.
    pub fn handle(&self) -> AssetChangeHandle {
        AssetChangeHandle {
            shared: Arc::clone(&self.shared),
        }
    }

    /// Read and clear the flag.
    pub fn take_pending(&self) -> bool {
        let mut pending = self
            .shared
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        std::mem::take(&mut *pending)
    }
}

/// Watcher side of the asset-change flag.
#[derive(Debug, Clone)]
pub struct AssetChangeHandle {
    shared: Arc<Shared>,
}

impl AssetChangeHandle {
    /// Report added, removed or moved paths.
    ///
    /// Only paths with a recognized config basename raise the flag. Returns
    /// whether it was raised.
    pub fn notify<I, P>(&self, paths: I) -> bool
    where
        I: IntoIterator<Item = P>,
        P: Into<NormalizedPath>,
    {
        let relevant = paths
            .into_iter()
            .map(Into::into)
            .any(|path: NormalizedPath| self.shared.layout.is_candidate(&path));
        if relevant {
            tracing::debug!("Config file change detected");
            self.shared.set();
        }
        relevant
    }
}
