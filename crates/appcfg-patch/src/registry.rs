//! Feature-keyed patch callback registry

use std::any::Any;
use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::feature::{FeatureId, FeatureSettings};
use crate::settings::{SettingsStore, load_into};

type Callback<P, T> = Box<dyn Fn(&mut P, &T) -> Result<()>>;

/// A failure recorded while running one feature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureFailure {
    pub feature: FeatureId,
    pub message: String,
}

/// Outcome of [`PatchRegistry::run_all`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Features whose settings loaded, in run order
    pub ran: Vec<FeatureId>,
    pub failures: Vec<FeatureFailure>,
}

impl RunReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

trait FeatureSlot<P> {
    fn run(&self, target: &mut P, store: &dyn SettingsStore, report: &mut RunReport);
    fn len(&self) -> usize;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

struct TypedSlot<P, T> {
    callbacks: Vec<Callback<P, T>>,
}

impl<P: 'static, T: FeatureSettings> FeatureSlot<P> for TypedSlot<P, T> {
    fn run(&self, target: &mut P, store: &dyn SettingsStore, report: &mut RunReport) {
        let feature = T::FEATURE;
        let mut settings = T::default();
        if let Err(e) = load_into(store, &mut settings) {
            tracing::error!(%feature, error = %e, "Failed to load feature settings, skipping");
            report.failures.push(FeatureFailure {
                feature,
                message: e.to_string(),
            });
            return;
        }

        report.ran.push(feature);
        for callback in &self.callbacks {
            if let Err(e) = callback(target, &settings) {
                tracing::error!(%feature, error = %e, "Patch callback failed");
                report.failures.push(FeatureFailure {
                    feature,
                    message: e.to_string(),
                });
            }
        }
    }

    fn len(&self) -> usize {
        self.callbacks.len()
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Callbacks contributed by feature modules for one kind of patch target.
///
/// Registrations are permanent for the life of the registry.
pub struct PatchRegistry<P> {
    slots: BTreeMap<FeatureId, Box<dyn FeatureSlot<P>>>,
}

impl<P: 'static> PatchRegistry<P> {
    pub fn new() -> Self {
        Self {
            slots: BTreeMap::new(),
        }
    }

    /// Append a callback for the feature owning settings type `T`.
    ///
    /// Fails if the feature id was first registered with another type.
    pub fn register<T, F>(&mut self, callback: F) -> Result<()>
    where
        T: FeatureSettings,
        F: Fn(&mut P, &T) -> Result<()> + 'static,
    {
        let slot = self
            .slots
            .entry(T::FEATURE)
            .or_insert_with(|| {
                Box::new(TypedSlot::<P, T> {
                    callbacks: Vec::new(),
                }) as Box<dyn FeatureSlot<P>>
            });
        let typed = slot
            .as_any_mut()
            .downcast_mut::<TypedSlot<P, T>>()
            .ok_or(Error::FeatureTypeMismatch {
                feature: T::FEATURE,
            })?;
        typed.callbacks.push(Box::new(callback));
        Ok(())
    }

    /// Run every feature's callbacks against `target`.
    ///
    /// Each feature gets one freshly loaded settings instance. Failures are
    /// recorded and never stop later callbacks or features.
    pub fn run_all(&self, target: &mut P, store: &dyn SettingsStore) -> RunReport {
        let mut report = RunReport::default();
        for slot in self.slots.values() {
            slot.run(target, store, &mut report);
        }
        report
    }

    /// Registered features in run order.
    pub fn features(&self) -> Vec<FeatureId> {
        self.slots.keys().copied().collect()
    }

    pub fn callback_count(&self, feature: FeatureId) -> usize {
        self.slots.get(&feature).map_or(0, |slot| slot.len())
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl<P: 'static> Default for PatchRegistry<P> {
    fn default() -> Self {
        Self::new()
    }
}
