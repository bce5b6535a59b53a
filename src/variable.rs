//! # Variables and Variable Sets
//!
//! Expressions read external state through named variables grouped into
//! namespaces ([`VariableSet`]). A variable is either *static* (its accessor
//! runs on every read) or *dynamic* ([`DynamicVariable`]: the accessor runs
//! at most once per tick and the result is memoized until the next
//! [`DynamicVariable::reset`]).
//!
//! A set is a plain data registry populated at construction; the variables in
//! a namespace never change after registration.

use std::collections::HashMap;
use std::fmt;
use std::sync::Mutex;

use crate::value::Variant;

/// A zero-argument accessor supplying the live value of a variable.
pub type Producer = Box<dyn Fn() -> Variant + Send + Sync>;

/// A lazily computed, tick-cached variable.
///
/// Two states: *stale* (empty slot, the next read invokes the producer) and
/// *fresh* (slot holds the memoized value). `reset` makes it stale again.
/// The producer is invoked at most once between resets no matter how many
/// expressions read the variable.
pub struct DynamicVariable {
    producer: Producer,
    cached: Mutex<Option<Variant>>,
}

impl DynamicVariable {
    pub fn new(producer: impl Fn() -> Variant + Send + Sync + 'static) -> Self {
        Self {
            producer: Box::new(producer),
            cached: Mutex::new(None),
        }
    }

    /// Wraps a number-producing accessor.
    pub fn number(producer: impl Fn() -> f64 + Send + Sync + 'static) -> Self {
        Self::new(move || Variant::Number(producer()))
    }

    /// Wraps a string-producing accessor.
    pub fn string(producer: impl Fn() -> String + Send + Sync + 'static) -> Self {
        Self::new(move || Variant::String(producer()))
    }

    /// Wraps a boolean-producing accessor.
    pub fn boolean(producer: impl Fn() -> bool + Send + Sync + 'static) -> Self {
        Self::new(move || Variant::Boolean(producer()))
    }

    /// Fresh -> Stale. Called once per tick, before any evaluation.
    pub fn reset(&self) {
        *self.slot() = None;
    }

    /// Current value, computing and memoizing it if stale.
    pub fn get(&self) -> Variant {
        let mut slot = self.slot();
        if let Some(value) = slot.as_ref() {
            return value.clone();
        }
        let value = (self.producer)();
        *slot = Some(value.clone());
        value
    }

    fn slot(&self) -> std::sync::MutexGuard<'_, Option<Variant>> {
        // A poisoned lock only means a producer panicked mid-write; the slot
        // is still a valid Option and the next read recomputes.
        self.cached.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl fmt::Debug for DynamicVariable {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("DynamicVariable")
            .field("cached", &*self.slot())
            .finish()
    }
}

/// A named variable slot inside a set.
pub enum Variable {
    /// Recomputes on every read.
    Static(Producer),
    /// Memoized until the next tick.
    Dynamic(DynamicVariable),
}

impl Variable {
    pub fn get(&self) -> Variant {
        match self {
            Variable::Static(producer) => producer(),
            Variable::Dynamic(dynamic) => dynamic.get(),
        }
    }

    fn reset(&self) {
        if let Variable::Dynamic(dynamic) = self {
            dynamic.reset();
        }
    }
}

/// A namespace of variables, addressed externally as `namespace.identifier`.
///
/// Built once at context setup and immutable afterwards:
///
/// ```
/// use tickscript::variable::VariableSet;
///
/// let weather = VariableSet::new("weather")
///     .with_boolean("isRaining", || false)
///     .with_number("temperature", || 0.3);
/// ```
pub struct VariableSet {
    name: String,
    variables: HashMap<String, Variable>,
}

impl VariableSet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            variables: HashMap::new(),
        }
    }

    /// Registers a dynamic (tick-cached) variable.
    pub fn with_dynamic(
        mut self,
        name: impl Into<String>,
        producer: impl Fn() -> Variant + Send + Sync + 'static,
    ) -> Self {
        self.variables
            .insert(name.into(), Variable::Dynamic(DynamicVariable::new(producer)));
        self
    }

    /// Registers a dynamic number variable.
    pub fn with_number(
        mut self,
        name: impl Into<String>,
        producer: impl Fn() -> f64 + Send + Sync + 'static,
    ) -> Self {
        self.variables
            .insert(name.into(), Variable::Dynamic(DynamicVariable::number(producer)));
        self
    }

    /// Registers a dynamic string variable.
    pub fn with_string(
        mut self,
        name: impl Into<String>,
        producer: impl Fn() -> String + Send + Sync + 'static,
    ) -> Self {
        self.variables
            .insert(name.into(), Variable::Dynamic(DynamicVariable::string(producer)));
        self
    }

    /// Registers a dynamic boolean variable.
    pub fn with_boolean(
        mut self,
        name: impl Into<String>,
        producer: impl Fn() -> bool + Send + Sync + 'static,
    ) -> Self {
        self.variables
            .insert(name.into(), Variable::Dynamic(DynamicVariable::boolean(producer)));
        self
    }

    /// Registers a static variable whose accessor runs on every read.
    pub fn with_static(
        mut self,
        name: impl Into<String>,
        producer: impl Fn() -> Variant + Send + Sync + 'static,
    ) -> Self {
        self.variables
            .insert(name.into(), Variable::Static(Box::new(producer)));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current value of `identifier`, or None if not registered. Lookup is
    /// exact and case-sensitive.
    pub fn get(&self, identifier: &str) -> Option<Variant> {
        self.variables.get(identifier).map(Variable::get)
    }

    /// Marks every dynamic variable in the set stale.
    pub fn update(&self) {
        for variable in self.variables.values() {
            variable.reset();
        }
    }
}

impl fmt::Debug for VariableSet {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("VariableSet")
            .field("name", &self.name)
            .field("variables", &self.variables.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// The ordered collection of sets owned by an execution context.
///
/// Registration order matters only for update order; lookup is by namespace
/// name. Sets are few, so resolution is a linear scan (mirrors the original
/// flat array).
#[derive(Debug, Default)]
pub struct VariableRegistry {
    sets: Vec<VariableSet>,
}

impl VariableRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// True if a set with this namespace is already registered.
    pub fn contains(&self, namespace: &str) -> bool {
        self.sets.iter().any(|s| s.name() == namespace)
    }

    pub fn add(&mut self, set: VariableSet) {
        self.sets.push(set);
    }

    /// Resolves `namespace.identifier` to its current value.
    pub fn resolve(&self, namespace: &str, identifier: &str) -> Option<Variant> {
        self.sets
            .iter()
            .find(|s| s.name() == namespace)
            .and_then(|s| s.get(identifier))
    }

    /// Resets every dynamic variable in every set, in registration order.
    pub fn update(&self) {
        for set in &self.sets {
            set.update();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_dynamic_memoizes_until_reset() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let variable = DynamicVariable::number(move || {
            counter.fetch_add(1, Ordering::SeqCst) as f64
        });

        assert_eq!(variable.get(), Variant::Number(0.0));
        assert_eq!(variable.get(), Variant::Number(0.0));
        assert_eq!(variable.get(), Variant::Number(0.0));
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        variable.reset();
        assert_eq!(variable.get(), Variant::Number(1.0));
        assert_eq!(variable.get(), Variant::Number(1.0));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_static_recomputes_every_read() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let variable = Variable::Static(Box::new(move || {
            Variant::Number(counter.fetch_add(1, Ordering::SeqCst) as f64)
        }));

        assert_eq!(variable.get(), Variant::Number(0.0));
        assert_eq!(variable.get(), Variant::Number(1.0));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_set_lookup_is_case_sensitive() {
        let set = VariableSet::new("state").with_boolean("isUnderground", || true);
        assert_eq!(set.get("isUnderground"), Some(Variant::Boolean(true)));
        assert_eq!(set.get("isunderground"), None);
        assert_eq!(set.get("missing"), None);
    }

    #[test]
    fn test_registry_resolution() {
        let mut registry = VariableRegistry::new();
        registry.add(VariableSet::new("weather").with_boolean("isRaining", || false));

        assert_eq!(
            registry.resolve("weather", "isRaining"),
            Some(Variant::Boolean(false))
        );
        assert_eq!(registry.resolve("Weather", "isRaining"), None);
        assert_eq!(registry.resolve("weather", "isSnowing"), None);
        assert!(registry.contains("weather"));
        assert!(!registry.contains("biome"));
    }

    #[test]
    fn test_registry_update_resets_all_sets() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();

        let mut registry = VariableRegistry::new();
        registry.add(VariableSet::new("diurnal").with_number("celestialAngle", move || {
            counter.fetch_add(1, Ordering::SeqCst) as f64
        }));

        registry.resolve("diurnal", "celestialAngle");
        registry.resolve("diurnal", "celestialAngle");
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        registry.update();
        registry.resolve("diurnal", "celestialAngle");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
