//! Processor plugins.
//!
//! Processors run inside the front-end and may generate sources. They are
//! named in the request and resolved through a [`ProcessorLoader`] that the
//! caller injects into the driver.

use std::collections::BTreeMap;
use std::fmt;

use capsule_common::error::{CapsuleError, Result};

/// A processor taking part in a front-end run.
pub trait Processor: fmt::Debug {
    /// Qualified name the processor was loaded under.
    fn name(&self) -> &str;
}

/// Resolves processor names to implementations.
pub trait ProcessorLoader {
    /// Loads the processor `name` from `processorpath`.
    ///
    /// # Errors
    ///
    /// Returns an error if no implementation is available.
    fn load(&self, processorpath: &[String], name: &str) -> Result<Box<dyn Processor>>;
}

/// Processor known only by its name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedProcessor {
    name: String,
}

impl NamedProcessor {
    /// Creates a processor named `name`.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Processor for NamedProcessor {
    fn name(&self) -> &str {
        &self.name
    }
}

type Factory = Box<dyn Fn() -> Box<dyn Processor>>;

/// Loader backed by factories registered up front.
#[derive(Default)]
pub struct ProcessorRegistry {
    factories: BTreeMap<String, Factory>,
}

impl fmt::Debug for ProcessorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessorRegistry")
            .field("processors", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl ProcessorRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry that knows every name in `names` as a
    /// [`NamedProcessor`].
    #[must_use]
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut registry = Self::new();
        for name in names {
            let name = name.into();
            let owned = name.clone();
            registry.register(name, move || Box::new(NamedProcessor::new(owned.clone())));
        }
        registry
    }

    /// Registers a factory under `name`, replacing any previous one.
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn() -> Box<dyn Processor> + 'static,
    {
        let _ = self.factories.insert(name.into(), Box::new(factory));
    }

    /// Returns whether `name` is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }
}

impl ProcessorLoader for ProcessorRegistry {
    fn load(&self, _processorpath: &[String], name: &str) -> Result<Box<dyn Processor>> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| CapsuleError::NotFound {
                kind: "processor",
                id: name.to_string(),
            })?;
        tracing::debug!(processor = name, "processor loaded");
        Ok(factory())
    }
}

/// Returns whether `name` is a dotted sequence of identifiers.
#[must_use]
pub fn is_qualified_name(name: &str) -> bool {
    !name.is_empty()
        && name.split('.').all(|segment| {
            let mut chars = segment.chars();
            chars
                .next()
                .is_some_and(|c| c.is_alphabetic() || c == '_' || c == '$')
                && chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_loads_registered_processor() {
        let registry = ProcessorRegistry::from_names(["com.acme.AutoValue"]);
        assert!(registry.contains("com.acme.AutoValue"));
        let processor = registry.load(&[], "com.acme.AutoValue").expect("load");
        assert_eq!(processor.name(), "com.acme.AutoValue");
    }

    #[test]
    fn registry_rejects_unknown_processor() {
        let registry = ProcessorRegistry::new();
        let err = registry.load(&[], "com.acme.Missing").unwrap_err();
        assert!(matches!(err, CapsuleError::NotFound { kind: "processor", .. }));
    }

    #[test]
    fn register_accepts_custom_factory() {
        let mut registry = ProcessorRegistry::new();
        registry.register("x.Y", || Box::new(NamedProcessor::new("x.Y")));
        assert!(format!("{registry:?}").contains("x.Y"));
    }

    #[test]
    fn qualified_names() {
        assert!(is_qualified_name("com.acme.Proc"));
        assert!(is_qualified_name("Proc$Inner"));
        assert!(!is_qualified_name(""));
        assert!(!is_qualified_name("com..Proc"));
        assert!(!is_qualified_name("com.1acme"));
        assert!(!is_qualified_name("com/acme/Proc"));
    }
}
