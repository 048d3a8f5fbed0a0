//! Per-session filter state: which effects are on, in what order, with which
//! parameter overrides.
//!
//! The store never caches catalog knowledge. Every public operation first
//! reconciles its instances against the live registry, so effects that were
//! registered or unregistered since the last call are picked up without any
//! subscription mechanism.

use crate::compositor::request::CompositeRequest;
use crate::core::effect::EffectDescriptor;
use crate::core::error::StateError;
use crate::core::types::{merge_parameters, ParameterMap, SessionId};
use crate::filters::registry::SharedRegistry;
use crate::state::settings::{FilterSettings, ImportSummary};
use image::DynamicImage;
use log::debug;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;

/// Shared store handle; the mutex enforces the single-writer rule when a
/// session is reachable from more than one thread.
pub type SharedFilterState = Arc<Mutex<FilterStateStore>>;

/// Session-scoped record of one effect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectInstance {
    /// Id of a live descriptor.
    pub id: String,
    /// Whether the effect takes part in rendering.
    pub enabled: bool,
    /// Position in the stack; the store keeps these a permutation of `0..N`.
    pub order_index: usize,
    /// Overrides merged over the descriptor defaults.
    pub parameters: ParameterMap,
}

impl EffectInstance {
    fn new(id: impl Into<String>, enabled: bool) -> Self {
        Self {
            id: id.into(),
            enabled,
            order_index: 0,
            parameters: ParameterMap::new(),
        }
    }
}

/// An instance together with its catalog metadata, for building UI lists.
#[derive(Debug, Clone, PartialEq)]
pub struct InstanceView {
    pub instance: EffectInstance,
    pub descriptor: EffectDescriptor,
}

/// Filter state for one editing session.
pub struct FilterStateStore {
    session_id: SessionId,
    registry: SharedRegistry,
    /// Kept sorted so that `instances[i].order_index == i`.
    instances: Vec<EffectInstance>,
}

impl std::fmt::Debug for FilterStateStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterStateStore")
            .field("session_id", &self.session_id)
            .field("instances", &self.instances)
            .finish()
    }
}

impl FilterStateStore {
    /// Create a store seeded from the registry's defaults.
    pub fn new(registry: SharedRegistry) -> Self {
        let mut store = Self {
            session_id: SessionId::new(),
            registry,
            instances: Vec::new(),
        };
        store.reconcile();
        store
    }

    /// Wrap into a shared handle.
    pub fn into_shared(self) -> SharedFilterState {
        Arc::new(Mutex::new(self))
    }

    /// This session's id.
    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    /// The catalog this store follows.
    pub fn registry(&self) -> &SharedRegistry {
        &self.registry
    }

    // ========================================================================
    // Reconciliation
    // ========================================================================

    /// Bring the instance set in line with the registry.
    ///
    /// Instances whose descriptor disappeared are pruned; new descriptors get an
    /// instance appended at the end (in the registry's default order) with
    /// `enabled = default_enabled`. Survivors keep their relative order, then
    /// order indices are renumbered contiguously.
    fn reconcile(&mut self) {
        let registry = self.registry.read();

        let in_sync = self.instances.len() == registry.len()
            && self.instances.iter().all(|i| registry.contains(&i.id));
        if in_sync {
            return;
        }

        let before = self.instances.len();
        self.instances.retain(|i| registry.contains(&i.id));
        let pruned = before - self.instances.len();

        let known: HashSet<String> = self.instances.iter().map(|i| i.id.clone()).collect();
        let mut added = 0;
        for id in registry.default_order() {
            if known.contains(&id) {
                continue;
            }
            let enabled = registry.get(&id).map(|d| d.default_enabled).unwrap_or(false);
            self.instances.push(EffectInstance::new(id, enabled));
            added += 1;
        }
        drop(registry);

        self.renumber();
        debug!(
            "Session {}: reconciled catalog (+{} / -{}), {} instances",
            self.session_id,
            added,
            pruned,
            self.instances.len()
        );
    }

    fn renumber(&mut self) {
        for (index, instance) in self.instances.iter_mut().enumerate() {
            instance.order_index = index;
        }
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.instances.iter().position(|i| i.id == id)
    }

    fn find_mut(&mut self, id: &str) -> Option<&mut EffectInstance> {
        self.instances.iter_mut().find(|i| i.id == id)
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Flip an effect on or off. Returns the new state, or `None` if unknown.
    pub fn toggle(&mut self, id: &str) -> Option<bool> {
        self.reconcile();
        let instance = self.find_mut(id)?;
        instance.enabled = !instance.enabled;
        Some(instance.enabled)
    }

    /// Set an effect's enabled flag. Returns false if unknown.
    pub fn set_enabled(&mut self, id: &str, enabled: bool) -> bool {
        self.reconcile();
        match self.find_mut(id) {
            Some(instance) => {
                instance.enabled = enabled;
                true
            }
            None => false,
        }
    }

    /// Disable every effect.
    pub fn disable_all(&mut self) {
        self.reconcile();
        for instance in &mut self.instances {
            instance.enabled = false;
        }
    }

    /// Replace the stack order.
    ///
    /// The sequence is auto-completed rather than rejected: unknown ids are
    /// dropped, repeated ids keep their first position, and ids the caller left
    /// out are appended in their current relative order.
    pub fn set_order<S: AsRef<str>>(&mut self, order: &[S]) {
        self.reconcile();

        let mut placed: HashSet<&str> = HashSet::with_capacity(self.instances.len());
        let mut taken = vec![false; self.instances.len()];
        let mut reordered = Vec::with_capacity(self.instances.len());

        for id in order {
            let id = id.as_ref();
            if !placed.insert(id) {
                continue;
            }
            match self.instances.iter().position(|i| i.id == id) {
                Some(pos) => {
                    taken[pos] = true;
                    reordered.push(pos);
                }
                None => debug!("Session {}: ignoring unknown id '{}' in order", self.session_id, id),
            }
        }

        let missing = taken.iter().filter(|t| !**t).count();
        if missing > 0 {
            debug!(
                "Session {}: order omitted {} id(s); appending them",
                self.session_id, missing
            );
        }
        reordered.extend((0..self.instances.len()).filter(|pos| !taken[*pos]));

        let mut old: Vec<Option<EffectInstance>> =
            std::mem::take(&mut self.instances).into_iter().map(Some).collect();
        self.instances = reordered
            .into_iter()
            .filter_map(|pos| old[pos].take())
            .collect();
        self.renumber();
    }

    /// Swap an effect with the one before it. No-op at the top or if unknown.
    pub fn move_up(&mut self, id: &str) -> bool {
        self.reconcile();
        match self.position(id) {
            Some(pos) if pos > 0 => {
                self.swap(pos, pos - 1);
                true
            }
            _ => false,
        }
    }

    /// Swap an effect with the one after it. No-op at the bottom or if unknown.
    pub fn move_down(&mut self, id: &str) -> bool {
        self.reconcile();
        match self.position(id) {
            Some(pos) if pos + 1 < self.instances.len() => {
                self.swap(pos, pos + 1);
                true
            }
            _ => false,
        }
    }

    fn swap(&mut self, a: usize, b: usize) {
        self.instances.swap(a, b);
        self.instances[a].order_index = a;
        self.instances[b].order_index = b;
    }

    /// Shallow-merge parameter overrides into an effect. Returns false if unknown.
    pub fn set_parameters(&mut self, id: &str, partial: ParameterMap) -> bool {
        self.reconcile();
        match self.find_mut(id) {
            Some(instance) => {
                for (key, value) in partial {
                    instance.parameters.insert(key, value);
                }
                true
            }
            None => false,
        }
    }

    /// Drop an effect's overrides, falling back to its defaults.
    pub fn reset_parameters(&mut self, id: &str) -> bool {
        self.reconcile();
        match self.find_mut(id) {
            Some(instance) => {
                instance.parameters.clear();
                true
            }
            None => false,
        }
    }

    /// Return the whole session to registry defaults: default order,
    /// default enabled flags, no overrides.
    pub fn reset(&mut self) {
        self.instances.clear();
        self.reconcile();
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Every instance, sorted by order index.
    pub fn ordered_instances(&mut self) -> Vec<EffectInstance> {
        self.reconcile();
        self.instances.clone()
    }

    /// Enabled instances, in stack order.
    pub fn active_instances(&mut self) -> Vec<EffectInstance> {
        self.reconcile();
        self.instances.iter().filter(|i| i.enabled).cloned().collect()
    }

    /// Number of enabled instances.
    pub fn active_count(&mut self) -> usize {
        self.reconcile();
        self.instances.iter().filter(|i| i.enabled).count()
    }

    /// One instance by id.
    pub fn instance(&mut self, id: &str) -> Option<EffectInstance> {
        self.reconcile();
        self.instances.iter().find(|i| i.id == id).cloned()
    }

    /// Whether an effect is enabled (false if unknown).
    pub fn is_enabled(&mut self, id: &str) -> bool {
        self.instance(id).map(|i| i.enabled).unwrap_or(false)
    }

    /// Descriptor defaults merged with this session's overrides.
    pub fn resolved_parameters(&mut self, id: &str) -> Option<ParameterMap> {
        self.reconcile();
        let instance = self.instances.iter().find(|i| i.id == id)?;
        let registry = self.registry.read();
        let descriptor = registry.get(id)?;
        Some(merge_parameters(&descriptor.default_parameters, &instance.parameters))
    }

    /// Instances with their descriptors, in stack order, for display.
    pub fn views(&mut self) -> Vec<InstanceView> {
        self.reconcile();
        let registry = self.registry.read();
        self.instances
            .iter()
            .filter_map(|instance| {
                registry.get(&instance.id).map(|descriptor| InstanceView {
                    instance: instance.clone(),
                    descriptor: descriptor.clone(),
                })
            })
            .collect()
    }

    /// Human-readable list of the applied effects, e.g. "Vivid → Glow".
    pub fn summary(&mut self) -> String {
        let names: Vec<String> = self
            .views()
            .into_iter()
            .filter(|v| v.instance.enabled)
            .map(|v| v.descriptor.display_name)
            .collect();
        if names.is_empty() {
            "No filters".to_string()
        } else {
            names.join(" → ")
        }
    }

    /// Snapshot the active stack into an immutable render request.
    pub fn composite_request(
        &mut self,
        source: impl Into<Arc<DynamicImage>>,
        width: u32,
        height: u32,
    ) -> CompositeRequest {
        CompositeRequest::new(source, width, height, self.active_instances())
    }

    // ========================================================================
    // Settings
    // ========================================================================

    /// Export the session as a flat settings blob.
    pub fn export_settings(&mut self) -> FilterSettings {
        self.reconcile();
        let mut settings = FilterSettings::default();
        for instance in &self.instances {
            settings.states.insert(instance.id.clone(), instance.enabled);
            settings.order.push(instance.id.clone());
            if !instance.parameters.is_empty() {
                settings
                    .options
                    .insert(instance.id.clone(), instance.parameters.clone());
            }
        }
        settings
    }

    /// Replay a settings blob: enabled flags, then order, then parameters.
    ///
    /// Ids the catalog doesn't know are skipped and reported.
    pub fn import_settings(&mut self, settings: &FilterSettings) -> ImportSummary {
        self.reconcile();
        let mut summary = ImportSummary::default();
        fn note(applied: bool, id: &str, summary: &mut ImportSummary) {
            if applied {
                summary.applied += 1;
            } else if !summary.ignored.iter().any(|i| i == id) {
                summary.ignored.push(id.to_string());
            }
        }

        for (id, enabled) in &settings.states {
            let applied = self.set_enabled(id, *enabled);
            note(applied, id, &mut summary);
        }

        if !settings.order.is_empty() {
            self.set_order(settings.order.as_slice());
            for id in &settings.order {
                let known = self.position(id).is_some();
                note(known, id, &mut summary);
            }
        }

        for (id, params) in &settings.options {
            let applied = self.set_parameters(id, params.clone());
            note(applied, id, &mut summary);
        }

        debug!(
            "Session {}: imported settings ({} applied, {} ignored)",
            self.session_id,
            summary.applied,
            summary.ignored.len()
        );
        summary
    }

    /// Import settings from JSON text.
    pub fn import_json(&mut self, json: &str) -> Result<ImportSummary, StateError> {
        let settings = FilterSettings::from_json(json)?;
        Ok(self.import_settings(&settings))
    }
}
