//! Demangler registry and qualified-name plumbing.
//!
//! Demangling backends are external: this module defines the [`Demangler`]
//! trait they implement, the [`DemanglerRegistry`] a host constructs at
//! startup and hands to whoever needs name resolution, and the
//! [`QualifiedName`] / [`DemangledName`] result types. Name simplification
//! (template stripping) lives in [`simplify`].
//!
//! Dispatch is first-recognizer-wins: [`DemanglerRegistry::demangle`] asks
//! each registered backend in registration order whether it recognizes the
//! string and returns the first successful result. A `None` result means
//! "not mangled or refused" — nothing changed, nothing to report.
//!
//! # Examples
//!
//! ```rust
//! use binscope::demangle::{DemangledName, Demangler, DemanglerRegistry, QualifiedName};
//! use std::sync::Arc;
//!
//! struct Underscore;
//!
//! impl Demangler for Underscore {
//!     fn name(&self) -> &str {
//!         "underscore"
//!     }
//!     fn is_mangled_string(&self, name: &str) -> bool {
//!         name.starts_with('_')
//!     }
//!     fn demangle(&self, name: &str, _simplify: bool) -> Option<DemangledName> {
//!         let stripped = name.strip_prefix('_')?;
//!         Some(DemangledName::variable(QualifiedName::from(vec![
//!             stripped.to_string(),
//!         ])))
//!     }
//! }
//!
//! let registry = DemanglerRegistry::new();
//! registry.register(Arc::new(Underscore))?;
//! let result = registry.demangle("_start", true).unwrap();
//! assert_eq!(result.name.to_string(), "start");
//! # Ok::<(), binscope::Error>(())
//! ```

pub mod simplify;

use std::{fmt, sync::Arc};

use crate::{Error, Result};

/// A name split into its nesting components, displayed with `::` separators.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct QualifiedName {
    components: Vec<String>,
}

impl QualifiedName {
    /// An empty qualified name.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a component.
    pub fn push(&mut self, component: String) {
        self.components.push(component);
    }

    /// The name components, outermost first.
    pub fn components(&self) -> &[String] {
        &self.components
    }

    /// Number of components.
    #[must_use]
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Whether the name has no components.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// The final (innermost) component, if any.
    pub fn leaf(&self) -> Option<&str> {
        self.components.last().map(String::as_str)
    }
}

impl From<Vec<String>> for QualifiedName {
    fn from(components: Vec<String>) -> Self {
        Self { components }
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.components.join("::"))
    }
}

/// Successful demangling result: the variable name and, when the backend
/// could reconstruct one, a display rendering of its type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemangledName {
    /// Demangled variable name.
    pub name: QualifiedName,
    /// Display rendering of the reconstructed type, if any.
    pub type_repr: Option<String>,
}

impl DemangledName {
    /// A result with a name and no reconstructed type.
    #[must_use]
    pub fn variable(name: QualifiedName) -> Self {
        Self {
            name,
            type_repr: None,
        }
    }

    /// A result carrying both a name and a type rendering.
    #[must_use]
    pub fn typed(name: QualifiedName, type_repr: &str) -> Self {
        Self {
            name,
            type_repr: Some(type_repr.to_string()),
        }
    }
}

/// A demangling backend.
///
/// Implementations are registered with a [`DemanglerRegistry`] and asked in
/// registration order. `demangle` returning `None` is a refusal, not an
/// error.
pub trait Demangler: Send + Sync {
    /// Registration name of the backend.
    fn name(&self) -> &str;

    /// Quick check whether `name` looks like something this backend can
    /// demangle.
    fn is_mangled_string(&self, name: &str) -> bool;

    /// Demangle `name`. With `simplify`, backends strip template noise the
    /// way [`simplify::to_qualified_name`] does.
    fn demangle(&self, name: &str, simplify: bool) -> Option<DemangledName>;
}

/// Ordered collection of demangling backends.
///
/// The registry is an explicit value with no process-wide state: hosts
/// construct one during startup, register backends, and pass it to whoever
/// resolves names. Registration from concurrent plugin initializers is safe.
pub struct DemanglerRegistry {
    entries: boxcar::Vec<Arc<dyn Demangler>>,
}

impl DemanglerRegistry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: boxcar::Vec::new(),
        }
    }

    /// Register a backend.
    ///
    /// # Errors
    /// Fails with [`Error::DuplicateName`] when a backend with the same name
    /// is already registered.
    pub fn register(&self, demangler: Arc<dyn Demangler>) -> Result<()> {
        if self.by_name(demangler.name()).is_some() {
            return Err(Error::DuplicateName(demangler.name().to_string()));
        }
        self.entries.push(demangler);
        Ok(())
    }

    /// Registered backends, in registration order.
    pub fn list(&self) -> Vec<Arc<dyn Demangler>> {
        self.entries.iter().map(|(_, entry)| entry.clone()).collect()
    }

    /// Look up a backend by registration name.
    pub fn by_name(&self, name: &str) -> Option<Arc<dyn Demangler>> {
        self.entries
            .iter()
            .map(|(_, entry)| entry)
            .find(|entry| entry.name() == name)
            .cloned()
    }

    /// Demangle `name` with the first backend that recognizes it.
    ///
    /// Returns `None` when no backend recognizes the string or the
    /// recognizing backend refuses it.
    pub fn demangle(&self, name: &str, simplify: bool) -> Option<DemangledName> {
        for (_, entry) in self.entries.iter() {
            if entry.is_mangled_string(name) {
                if let Some(result) = entry.demangle(name, simplify) {
                    return Some(result);
                }
            }
        }
        None
    }
}

impl Default for DemanglerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for DemanglerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.entries.iter().map(|(_, e)| e.name()).collect();
        f.debug_struct("DemanglerRegistry")
            .field("entries", &names)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed {
        name: &'static str,
        prefix: &'static str,
    }

    impl Demangler for Fixed {
        fn name(&self) -> &str {
            self.name
        }
        fn is_mangled_string(&self, name: &str) -> bool {
            name.starts_with(self.prefix)
        }
        fn demangle(&self, name: &str, _simplify: bool) -> Option<DemangledName> {
            let stripped = name.strip_prefix(self.prefix)?;
            Some(DemangledName::variable(QualifiedName::from(vec![
                self.name.to_string(),
                stripped.to_string(),
            ])))
        }
    }

    #[test]
    fn duplicate_registration_is_refused() {
        let registry = DemanglerRegistry::new();
        registry
            .register(Arc::new(Fixed {
                name: "itanium",
                prefix: "_Z",
            }))
            .unwrap();
        let err = registry.register(Arc::new(Fixed {
            name: "itanium",
            prefix: "_Z",
        }));
        assert!(matches!(err, Err(Error::DuplicateName(_))));
        assert_eq!(registry.list().len(), 1);
    }

    #[test]
    fn dispatch_is_first_recognizer_wins() {
        let registry = DemanglerRegistry::new();
        registry
            .register(Arc::new(Fixed {
                name: "first",
                prefix: "_",
            }))
            .unwrap();
        registry
            .register(Arc::new(Fixed {
                name: "second",
                prefix: "_Z",
            }))
            .unwrap();

        // Both recognize "_Zfoo"; registration order decides.
        let result = registry.demangle("_Zfoo", true).unwrap();
        assert_eq!(result.name.components()[0], "first");

        assert!(registry.demangle("plain", true).is_none());
    }

    #[test]
    fn lookup_by_name() {
        let registry = DemanglerRegistry::new();
        registry
            .register(Arc::new(Fixed {
                name: "msvc",
                prefix: "?",
            }))
            .unwrap();
        assert!(registry.by_name("msvc").is_some());
        assert!(registry.by_name("gnu3").is_none());
    }

    #[test]
    fn qualified_name_display() {
        let mut name = QualifiedName::new();
        assert!(name.is_empty());
        name.push("std".to_string());
        name.push("vector".to_string());
        assert_eq!(name.to_string(), "std::vector");
        assert_eq!(name.leaf(), Some("vector"));
        assert_eq!(name.len(), 2);
    }
}
