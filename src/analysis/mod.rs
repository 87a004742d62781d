//! Analysis view: functions, data variables and the component system.
//!
//! An [`AnalysisView`] anchors the analysis-facing entities of one binary:
//! the function and data-variable tables produced by analysis, and the
//! [`Component`] tree grouping functions under named hierarchical containers.
//! This layer holds no analysis logic of its own — records arrive fully
//! formed and the view only organizes them.
//!
//! # Key Types
//!
//! - [`AnalysisView`] - per-binary anchor and component table
//! - [`Function`] - immutable function record (address, name, references)
//! - [`DataVariable`] - immutable data variable record
//! - [`Component`] - named grouping of functions with child components
//!
//! # Examples
//!
//! ```rust
//! use binscope::analysis::{AnalysisView, Function};
//!
//! let view = AnalysisView::new("helloworld");
//! let entry = view.add_function(Function::new(0x1000, "_start"));
//!
//! let component = view.create_component(Some("startup"));
//! assert!(component.add_function(&entry));
//! assert!(!component.add_function(&entry)); // already present, refused
//! assert!(view.add_root_component(&component));
//! ```

mod component;
mod workflow;

pub use component::Component;
pub use workflow::{Activity, AnalysisContext, BasicBlock, InformArg};

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc, Mutex,
};

use crossbeam_skiplist::SkipMap;
use dashmap::DashMap;

use component::ComponentRecord;

/// An analyzed function, as recorded by the analysis that produced it.
///
/// Records are immutable; the referenced type names and data-variable
/// addresses are what component reference queries aggregate over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Function {
    /// Start address of the function body.
    pub start: u64,
    /// Symbol or display name.
    pub name: String,
    /// Names of the types the function body references.
    pub referenced_types: Vec<String>,
    /// Addresses of the data variables the function body references.
    pub data_refs: Vec<u64>,
}

impl Function {
    /// A function record with no recorded references.
    #[must_use]
    pub fn new(start: u64, name: &str) -> Self {
        Self {
            start,
            name: name.to_string(),
            referenced_types: Vec::new(),
            data_refs: Vec::new(),
        }
    }

    /// Attach referenced type names to the record.
    #[must_use]
    pub fn with_referenced_types(mut self, types: &[&str]) -> Self {
        self.referenced_types = types.iter().map(|t| (*t).to_string()).collect();
        self
    }

    /// Attach referenced data-variable addresses to the record.
    #[must_use]
    pub fn with_data_refs(mut self, refs: &[u64]) -> Self {
        self.data_refs = refs.to_vec();
        self
    }
}

/// A data variable discovered or declared at an address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataVariable {
    /// Address of the variable.
    pub address: u64,
    /// Display name of the variable's type.
    pub type_name: String,
    /// Whether analysis discovered the variable (as opposed to a user
    /// declaring it).
    pub auto_discovered: bool,
}

/// Shared view state behind [`AnalysisView`] and every [`Component`] wrapper.
pub(crate) struct ViewData {
    pub(crate) name: String,
    /// Functions keyed by start address.
    pub(crate) functions: SkipMap<u64, Arc<Function>>,
    /// Data variables keyed by address.
    pub(crate) data_variables: SkipMap<u64, Arc<DataVariable>>,
    /// Component records keyed by guid.
    pub(crate) components: DashMap<String, Arc<ComponentRecord>>,
    /// Guids of root components, in attach order.
    pub(crate) roots: Mutex<Vec<String>>,
    next_serial: AtomicU64,
}

impl ViewData {
    pub(crate) fn mint_guid(&self) -> (u64, String) {
        let serial = self.next_serial.fetch_add(1, Ordering::Relaxed);
        (
            serial,
            crate::utils::mint_guid(self.name.as_bytes(), serial),
        )
    }
}

/// Anchor for the analysis-facing entities of one binary.
///
/// The view is a shared handle; clones refer to the same tables. Function
/// and data-variable tables are append-oriented (records are immutable),
/// component structure is fully mutable through [`Component`] operations.
pub struct AnalysisView {
    pub(crate) data: Arc<ViewData>,
}

impl AnalysisView {
    /// Create an empty view for the binary `name`.
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            data: Arc::new(ViewData {
                name: name.to_string(),
                functions: SkipMap::new(),
                data_variables: SkipMap::new(),
                components: DashMap::new(),
                roots: Mutex::new(Vec::new()),
                next_serial: AtomicU64::new(1),
            }),
        }
    }

    /// Name of the binary this view describes.
    pub fn name(&self) -> &str {
        &self.data.name
    }

    /// Record a function, replacing any previous record at the same address.
    pub fn add_function(&self, function: Function) -> Arc<Function> {
        let record = Arc::new(function);
        self.data.functions.insert(record.start, record.clone());
        record
    }

    /// Function record at `start`, if any.
    pub fn function_at(&self, start: u64) -> Option<Arc<Function>> {
        self.data
            .functions
            .get(&start)
            .map(|entry| entry.value().clone())
    }

    /// All function records, ordered by address.
    pub fn functions(&self) -> Vec<Arc<Function>> {
        self.data
            .functions
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }

    /// Record a data variable, replacing any previous record at the same
    /// address.
    pub fn add_data_variable(&self, variable: DataVariable) -> Arc<DataVariable> {
        let record = Arc::new(variable);
        self.data
            .data_variables
            .insert(record.address, record.clone());
        record
    }

    /// Data variable record at `address`, if any.
    pub fn data_variable_at(&self, address: u64) -> Option<Arc<DataVariable>> {
        self.data
            .data_variables
            .get(&address)
            .map(|entry| entry.value().clone())
    }

    /// Create a fresh detached component.
    ///
    /// With no `name`, the component gets a serial-numbered default name.
    /// The component is resolvable by guid immediately but is not part of
    /// the root list until [`AnalysisView::add_root_component`] attaches it
    /// (or another component adopts it).
    pub fn create_component(&self, name: Option<&str>) -> Component {
        let (serial, guid) = self.data.mint_guid();
        let name = match name {
            Some(name) => name.to_string(),
            None => format!("Component {serial}"),
        };

        let record = Arc::new(ComponentRecord::new(guid.clone(), name));
        self.data.components.insert(guid, record.clone());
        Component::new(self.data.clone(), record)
    }

    /// Look up a component by guid.
    ///
    /// Returns `None` once a component has been removed, even while wrappers
    /// for it are still alive.
    pub fn component_by_guid(&self, guid: &str) -> Option<Component> {
        self.data
            .components
            .get(guid)
            .map(|record| Component::new(self.data.clone(), record.value().clone()))
    }

    /// Root components in attach order.
    pub fn root_components(&self) -> Vec<Component> {
        let roots = lock!(self.data.roots).clone();
        roots
            .iter()
            .filter_map(|guid| self.component_by_guid(guid))
            .collect()
    }

    /// Attach a component to the root list.
    ///
    /// A component that currently lives under a parent is detached from it
    /// first. Returns `false` — changing nothing — when the component is
    /// already a root or is no longer part of this view.
    pub fn add_root_component(&self, component: &Component) -> bool {
        component::add_root(&self.data, component)
    }

    /// Detach a root component and destroy it together with its children.
    ///
    /// Returns `false` when the component is not currently a root.
    pub fn remove_root_component(&self, component: &Component) -> bool {
        component::remove_root(&self.data, component.guid())
    }

    /// [`AnalysisView::remove_root_component`] addressed by guid.
    pub fn remove_root_component_by_guid(&self, guid: &str) -> bool {
        component::remove_root(&self.data, guid)
    }
}

impl Clone for AnalysisView {
    fn clone(&self) -> Self {
        Self {
            data: self.data.clone(),
        }
    }
}

impl std::fmt::Debug for AnalysisView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalysisView")
            .field("name", &self.data.name)
            .field("functions", &self.data.functions.len())
            .field("data_variables", &self.data.data_variables.len())
            .field("components", &self.data.components.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn function_table_is_address_ordered() {
        let view = AnalysisView::new("bin");
        view.add_function(Function::new(0x2000, "second"));
        view.add_function(Function::new(0x1000, "first"));

        let names: Vec<String> = view.functions().iter().map(|f| f.name.clone()).collect();
        assert_eq!(names, ["first", "second"]);
        assert_eq!(view.function_at(0x1000).unwrap().name, "first");
        assert!(view.function_at(0x3000).is_none());
    }

    #[test]
    fn component_guids_resolve_until_removed() {
        let view = AnalysisView::new("bin");
        let component = view.create_component(Some("init"));
        let guid = component.guid().to_string();

        assert_eq!(view.component_by_guid(&guid).unwrap(), component);
        assert!(view.add_root_component(&component));
        assert!(view.remove_root_component(&component));
        assert!(view.component_by_guid(&guid).is_none());
    }

    #[test]
    fn default_component_names_are_serial_numbered() {
        let view = AnalysisView::new("bin");
        let first = view.create_component(None);
        let second = view.create_component(None);
        assert_ne!(first.name(), second.name());
        assert!(first.name().starts_with("Component "));
    }
}
