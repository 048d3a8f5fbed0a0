//! Effect registry: the catalog of available effects.

use crate::core::effect::{Effect, EffectCategory, EffectDescriptor};
use crate::core::error::{RegistryError, RegistryResult};
use indexmap::IndexMap;
use log::debug;
use parking_lot::RwLock;
use std::collections::HashSet;
use std::sync::Arc;

/// Shared, injectable handle to one catalog.
///
/// The application root owns the catalog; the state store and compositor
/// each hold a clone of this handle.
pub type SharedRegistry = Arc<RwLock<EffectRegistry>>;

/// Registry entry containing metadata and the render procedure.
#[derive(Clone)]
pub struct RegistryEntry {
    /// Cached descriptor (avoids calling into the effect just to get metadata).
    pub descriptor: EffectDescriptor,
    /// The effect itself.
    pub effect: Arc<dyn Effect>,
}

impl std::fmt::Debug for RegistryEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistryEntry")
            .field("descriptor", &self.descriptor)
            .field("effect", &"<effect>")
            .finish()
    }
}

/// Registry for all available effects.
///
/// Holds at most one entry per id. Iteration follows registration order,
/// which is also the tail order of [`default_order`](Self::default_order).
#[derive(Debug, Default)]
pub struct EffectRegistry {
    /// Effects indexed by their unique ID.
    effects: IndexMap<String, RegistryEntry>,
    /// Ids placed first, in this order, by `default_order`.
    preferred_order: Vec<String>,
}

impl EffectRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry pre-populated with built-in effects and their preferred order.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        crate::filters::builtin::register_all(&mut registry);
        registry.preferred_order = crate::filters::builtin::PREFERRED_ORDER
            .iter()
            .map(|s| s.to_string())
            .collect();
        registry
    }

    /// Wrap into a shared handle.
    pub fn into_shared(self) -> SharedRegistry {
        Arc::new(RwLock::new(self))
    }

    /// Register an effect, replacing any previous entry with the same id.
    ///
    /// Fails only on an empty id.
    pub fn register<E>(&mut self, effect: E) -> RegistryResult<()>
    where
        E: Effect + 'static,
    {
        self.register_arc(Arc::new(effect))
    }

    /// Register an already shared effect, replacing any previous entry.
    pub fn register_arc(&mut self, effect: Arc<dyn Effect>) -> RegistryResult<()> {
        let descriptor = effect.descriptor();
        if descriptor.id.trim().is_empty() {
            return Err(RegistryError::EmptyId);
        }

        let id = descriptor.id.clone();
        let replaced = self
            .effects
            .insert(id.clone(), RegistryEntry { descriptor, effect })
            .is_some();

        if replaced {
            debug!("Replaced effect '{}'", id);
        } else {
            debug!("Registered effect '{}'", id);
        }
        Ok(())
    }

    /// Register an effect, refusing to replace an existing id.
    pub fn try_register<E>(&mut self, effect: E) -> RegistryResult<()>
    where
        E: Effect + 'static,
    {
        let id = effect.descriptor().id;
        if self.effects.contains_key(&id) {
            return Err(RegistryError::AlreadyRegistered { id });
        }
        self.register(effect)
    }

    /// Unregister an effect. Returns whether it was present; absent ids are a no-op.
    pub fn unregister(&mut self, id: &str) -> bool {
        let removed = self.effects.shift_remove(id).is_some();
        if removed {
            debug!("Unregistered effect '{}'", id);
        }
        removed
    }

    /// Get a descriptor by id.
    pub fn get(&self, id: &str) -> Option<&EffectDescriptor> {
        self.effects.get(id).map(|e| &e.descriptor)
    }

    /// Get a descriptor by id, failing with [`RegistryError::NotFound`].
    pub fn require(&self, id: &str) -> RegistryResult<&EffectDescriptor> {
        self.get(id).ok_or_else(|| RegistryError::NotFound { id: id.to_string() })
    }

    /// Get a registry entry.
    pub fn get_entry(&self, id: &str) -> Option<&RegistryEntry> {
        self.effects.get(id)
    }

    /// Get the render procedure for an id.
    pub fn effect(&self, id: &str) -> Option<Arc<dyn Effect>> {
        self.effects.get(id).map(|e| Arc::clone(&e.effect))
    }

    /// Check if an effect is registered.
    pub fn contains(&self, id: &str) -> bool {
        self.effects.contains_key(id)
    }

    /// All descriptors, in registration order.
    pub fn all(&self) -> impl Iterator<Item = &EffectDescriptor> {
        self.effects.values().map(|e| &e.descriptor)
    }

    /// All registered ids, in registration order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.effects.keys().map(|s| s.as_str())
    }

    /// Get the total number of registered effects.
    pub fn len(&self) -> usize {
        self.effects.len()
    }

    /// Check if registry is empty.
    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    /// The preferred-first id list.
    pub fn preferred_order(&self) -> &[String] {
        &self.preferred_order
    }

    /// Replace the preferred-first id list.
    pub fn set_preferred_order(&mut self, order: impl IntoIterator<Item = impl Into<String>>) {
        self.preferred_order = order.into_iter().map(Into::into).collect();
    }

    /// Builder-style variant of [`set_preferred_order`](Self::set_preferred_order).
    pub fn with_preferred_order(
        mut self,
        order: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.set_preferred_order(order);
        self
    }

    /// Total deterministic order over exactly the current catalog.
    ///
    /// Registered ids from the preferred list come first, in that list's order;
    /// every other registered id follows in registration order. Unregistered
    /// preferred ids and duplicates are ignored.
    pub fn default_order(&self) -> Vec<String> {
        let mut seen = HashSet::with_capacity(self.effects.len());
        let mut order = Vec::with_capacity(self.effects.len());

        for id in &self.preferred_order {
            if self.effects.contains_key(id) && seen.insert(id.as_str()) {
                order.push(id.clone());
            }
        }
        for id in self.effects.keys() {
            if seen.insert(id.as_str()) {
                order.push(id.clone());
            }
        }
        order
    }

    /// Get effect ids by category, in registration order.
    pub fn by_category(&self, category: EffectCategory) -> Vec<&str> {
        self.effects
            .values()
            .filter(|e| e.descriptor.category == category)
            .map(|e| e.descriptor.id.as_str())
            .collect()
    }

    /// Search effects by id, name, description or tag.
    pub fn search(&self, query: &str) -> Vec<&str> {
        let query = query.to_lowercase();

        self.effects
            .iter()
            .filter(|(_, entry)| {
                let d = &entry.descriptor;
                d.id.to_lowercase().contains(&query)
                    || d.display_name.to_lowercase().contains(&query)
                    || d.description.to_lowercase().contains(&query)
                    || d.tags.iter().any(|t| t.to_lowercase().contains(&query))
            })
            .map(|(id, _)| id.as_str())
            .collect()
    }

    /// Get descriptors grouped by category for UI display.
    pub fn grouped_by_category(&self) -> IndexMap<EffectCategory, Vec<&EffectDescriptor>> {
        let mut grouped: IndexMap<EffectCategory, Vec<&EffectDescriptor>> = IndexMap::new();

        for category in EffectCategory::all() {
            let members: Vec<_> = self.all().filter(|d| d.category == *category).collect();
            if !members.is_empty() {
                grouped.insert(*category, members);
            }
        }

        // Sort each category by name
        for descriptors in grouped.values_mut() {
            descriptors.sort_by(|a, b| a.display_name.cmp(&b.display_name));
        }

        grouped
    }
}

/// Builder for creating a customized registry.
pub struct RegistryBuilder {
    registry: EffectRegistry,
    include_builtins: bool,
    preferred_order: Option<Vec<String>>,
}

impl RegistryBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            registry: EffectRegistry::new(),
            include_builtins: true,
            preferred_order: None,
        }
    }

    /// Include or exclude built-in effects.
    pub fn with_builtins(mut self, include: bool) -> Self {
        self.include_builtins = include;
        self
    }

    /// Override the preferred-first order.
    pub fn preferred_order(mut self, order: Vec<String>) -> Self {
        self.preferred_order = Some(order);
        self
    }

    /// Register a custom effect.
    pub fn register<E>(mut self, effect: E) -> RegistryResult<Self>
    where
        E: Effect + 'static,
    {
        self.registry.register(effect)?;
        Ok(self)
    }

    /// Build the registry.
    pub fn build(self) -> EffectRegistry {
        let mut registry = if self.include_builtins {
            let mut builtins = EffectRegistry::with_builtins();
            for entry in self.registry.effects.into_values() {
                // Custom effects registered on the builder win over built-ins.
                builtins.effects.insert(entry.descriptor.id.clone(), entry);
            }
            builtins
        } else {
            self.registry
        };
        if let Some(order) = self.preferred_order {
            registry.preferred_order = order;
        }
        registry
    }
}

impl Default for RegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::effect::FnEffect;

    fn effect(id: &str, category: EffectCategory) -> FnEffect {
        let descriptor = EffectDescriptor::builder(id, id.to_uppercase())
            .category(category)
            .description(format!("{} effect", id))
            .build();
        FnEffect::new(descriptor, |_| Vec::new())
    }

    #[test]
    fn test_register_and_get() {
        let mut registry = EffectRegistry::new();
        registry.register(effect("a", EffectCategory::Effect)).unwrap();

        assert!(registry.contains("a"));
        assert_eq!(registry.get("a").unwrap().display_name, "A");
        assert!(registry.effect("a").is_some());
        assert!(registry.get("b").is_none());
    }

    #[test]
    fn test_empty_id_rejected() {
        let mut registry = EffectRegistry::new();
        assert_eq!(
            registry.register(effect("", EffectCategory::Effect)),
            Err(RegistryError::EmptyId)
        );
        assert_eq!(
            registry.register(effect("   ", EffectCategory::Effect)),
            Err(RegistryError::EmptyId)
        );
        assert!(registry.is_empty());
    }

    #[test]
    fn test_register_replaces_in_place() {
        let mut registry = EffectRegistry::new();
        registry.register(effect("a", EffectCategory::Effect)).unwrap();
        registry.register(effect("b", EffectCategory::Effect)).unwrap();
        registry.register(effect("a", EffectCategory::Artistic)).unwrap();

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get("a").unwrap().category, EffectCategory::Artistic);
        assert_eq!(registry.ids().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn test_try_register_rejects_duplicates() {
        let mut registry = EffectRegistry::new();
        registry.try_register(effect("a", EffectCategory::Effect)).unwrap();
        assert_eq!(
            registry.try_register(effect("a", EffectCategory::Effect)),
            Err(RegistryError::AlreadyRegistered { id: "a".into() })
        );
    }

    #[test]
    fn test_unregister_is_idempotent() {
        let mut registry = EffectRegistry::new();
        registry.register(effect("a", EffectCategory::Effect)).unwrap();

        assert!(registry.unregister("a"));
        assert!(!registry.unregister("a"));
        assert!(!registry.contains("a"));
    }

    #[test]
    fn test_require_reports_missing_id() {
        let mut registry = EffectRegistry::new();
        registry.register(effect("a", EffectCategory::Effect)).unwrap();

        assert_eq!(registry.require("a").unwrap().id, "a");
        assert_eq!(
            registry.require("b").unwrap_err(),
            RegistryError::NotFound { id: "b".into() }
        );
    }

    #[test]
    fn test_default_order() {
        let mut registry = EffectRegistry::new()
            .with_preferred_order(["c", "missing", "a", "c"]);
        for id in ["a", "b", "c", "d"] {
            registry.register(effect(id, EffectCategory::Effect)).unwrap();
        }

        assert_eq!(registry.default_order(), vec!["c", "a", "b", "d"]);

        registry.unregister("c");
        assert_eq!(registry.default_order(), vec!["a", "b", "d"]);
    }

    #[test]
    fn test_category_grouping() {
        let mut registry = EffectRegistry::new();
        registry.register(effect("zeta", EffectCategory::Artistic)).unwrap();
        registry.register(effect("alpha", EffectCategory::Artistic)).unwrap();
        registry.register(effect("boost", EffectCategory::Enhancement)).unwrap();

        assert_eq!(registry.by_category(EffectCategory::Artistic), vec!["zeta", "alpha"]);

        let grouped = registry.grouped_by_category();
        let categories: Vec<_> = grouped.keys().copied().collect();
        assert_eq!(categories, vec![EffectCategory::Enhancement, EffectCategory::Artistic]);
        let names: Vec<_> = grouped[&EffectCategory::Artistic]
            .iter()
            .map(|d| d.id.as_str())
            .collect();
        assert_eq!(names, vec!["alpha", "zeta"]);
    }

    #[test]
    fn test_search() {
        let mut registry = EffectRegistry::new();
        registry.register(effect("glow", EffectCategory::Effect)).unwrap();

        assert_eq!(registry.search("GLO"), vec!["glow"]);
        assert!(registry.search("nonexistent").is_empty());
    }

    #[test]
    fn test_builder_custom_wins() {
        let registry = RegistryBuilder::new()
            .register(effect("sepia", EffectCategory::Effect))
            .unwrap()
            .build();

        assert_eq!(registry.get("sepia").unwrap().category, EffectCategory::Effect);
        assert!(registry.contains("vivid"));
        assert!(!registry.preferred_order().is_empty());

        let bare = RegistryBuilder::new()
            .with_builtins(false)
            .preferred_order(vec!["x".into()])
            .build();
        assert!(bare.is_empty());
        assert_eq!(bare.preferred_order(), ["x".to_string()]);
    }
}
