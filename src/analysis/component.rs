//! Named hierarchical grouping of functions attached to an analysis view.

use std::{
    collections::BTreeSet,
    sync::{Arc, RwLock},
};

use tracing::warn;

use crate::analysis::{DataVariable, Function, ViewData};

/// Interior state of one component.
pub(crate) struct ComponentRecord {
    pub(crate) guid: String,
    pub(crate) name: RwLock<String>,
    pub(crate) parent: RwLock<Option<String>>,
    /// Start addresses of contained functions.
    pub(crate) functions: RwLock<BTreeSet<u64>>,
    /// Guids of child components, in adoption order.
    pub(crate) children: RwLock<Vec<String>>,
}

impl ComponentRecord {
    pub(crate) fn new(guid: String, name: String) -> Self {
        Self {
            guid,
            name: RwLock::new(name),
            parent: RwLock::new(None),
            functions: RwLock::new(BTreeSet::new()),
            children: RwLock::new(Vec::new()),
        }
    }
}

/// A named grouping of functions, with child components, attached to an
/// [`AnalysisView`](crate::analysis::AnalysisView).
///
/// Components compare equal by underlying identity (same view, same guid).
/// Containment edits return a success flag and refuse — changing nothing —
/// whenever the edit is already in effect, the operand left the view, or the
/// edit would create a containment cycle.
///
/// # Examples
///
/// ```rust
/// use binscope::analysis::{AnalysisView, Function};
///
/// let view = AnalysisView::new("helloworld");
/// let main = view.add_function(Function::new(0x1000, "main"));
///
/// let outer = view.create_component(Some("app"));
/// let inner = view.create_component(Some("startup"));
/// assert!(outer.add_component(&inner));
/// assert!(inner.add_function(&main));
/// assert_eq!(inner.parent(), Some(outer.clone()));
/// assert!(!inner.add_component(&outer)); // would be a cycle, refused
/// ```
pub struct Component {
    pub(crate) data: Arc<ViewData>,
    pub(crate) record: Arc<ComponentRecord>,
}

impl Component {
    pub(crate) fn new(data: Arc<ViewData>, record: Arc<ComponentRecord>) -> Self {
        Self { data, record }
    }

    /// Stable GUID of this component.
    pub fn guid(&self) -> &str {
        &self.record.guid
    }

    /// Display name.
    pub fn name(&self) -> String {
        read_lock!(self.record.name).clone()
    }

    /// Set the display name.
    pub fn set_name(&self, name: &str) {
        *write_lock!(self.record.name) = name.to_string();
    }

    /// The component containing this one, if any.
    pub fn parent(&self) -> Option<Component> {
        let parent_guid = read_lock!(self.record.parent).clone()?;
        let record = self.data.components.get(&parent_guid)?.value().clone();
        Some(Component::new(self.data.clone(), record))
    }

    /// Add a function reference.
    ///
    /// Returns `false` when the function is already contained or is not part
    /// of this component's view.
    pub fn add_function(&self, function: &Function) -> bool {
        if self.data.functions.get(&function.start).is_none() {
            return false;
        }
        write_lock!(self.record.functions).insert(function.start)
    }

    /// Remove a function reference.
    ///
    /// Returns `false` — leaving the container unchanged — when the function
    /// was not contained.
    pub fn remove_function(&self, function: &Function) -> bool {
        write_lock!(self.record.functions).remove(&function.start)
    }

    /// Whether the function is directly contained.
    pub fn contains_function(&self, function: &Function) -> bool {
        read_lock!(self.record.functions).contains(&function.start)
    }

    /// Contained function records, ordered by address.
    ///
    /// References whose function has been replaced out of the view are
    /// skipped.
    pub fn functions(&self) -> Vec<Arc<Function>> {
        let starts = read_lock!(self.record.functions).clone();
        starts
            .iter()
            .filter_map(|start| self.data.functions.get(start).map(|e| e.value().clone()))
            .collect()
    }

    /// Adopt `child` as a sub-component, detaching it from its current
    /// parent or the root list.
    ///
    /// Returns `false` — changing nothing — when `child` is already a direct
    /// child, belongs to a different view, has left the view, or the
    /// adoption would create a containment cycle.
    pub fn add_component(&self, child: &Component) -> bool {
        if !Arc::ptr_eq(&self.data, &child.data) || child.record.guid == self.record.guid {
            return false;
        }
        if self.data.components.get(&self.record.guid).is_none()
            || self.data.components.get(&child.record.guid).is_none()
        {
            return false;
        }
        if is_in_parent_chain(&self.data, &self.record, &child.record.guid) {
            return false;
        }
        if read_lock!(self.record.children)
            .iter()
            .any(|guid| guid == &child.record.guid)
        {
            return false;
        }

        detach(&self.data, &child.record);
        write_lock!(self.record.children).push(child.record.guid.clone());
        *write_lock!(child.record.parent) = Some(self.record.guid.clone());
        true
    }

    /// Remove a direct child and destroy it together with its descendants.
    ///
    /// Returns `false` when `child` is not a direct child of this component.
    pub fn remove_component(&self, child: &Component) -> bool {
        if !Arc::ptr_eq(&self.data, &child.data) {
            return false;
        }
        let removed = {
            let mut children = write_lock!(self.record.children);
            match children.iter().position(|guid| guid == &child.record.guid) {
                Some(index) => {
                    children.remove(index);
                    true
                }
                None => false,
            }
        };
        if removed {
            destroy_subtree(&self.data, &child.record.guid);
        }
        removed
    }

    /// Whether `child` is a direct child of this component.
    pub fn contains_component(&self, child: &Component) -> bool {
        Arc::ptr_eq(&self.data, &child.data)
            && read_lock!(self.record.children)
                .iter()
                .any(|guid| guid == &child.record.guid)
    }

    /// Direct child components, in adoption order.
    pub fn components(&self) -> Vec<Component> {
        let children = read_lock!(self.record.children).clone();
        children
            .iter()
            .filter_map(|guid| {
                self.data
                    .components
                    .get(guid)
                    .map(|record| Component::new(self.data.clone(), record.value().clone()))
            })
            .collect()
    }

    /// Names of the types referenced by contained functions, de-duplicated
    /// and sorted. With `recursive`, child components contribute too.
    pub fn referenced_types(&self, recursive: bool) -> Vec<String> {
        let mut names = BTreeSet::new();
        self.collect_types(recursive, &mut names);
        names.into_iter().collect()
    }

    fn collect_types(&self, recursive: bool, into: &mut BTreeSet<String>) {
        for function in self.functions() {
            into.extend(function.referenced_types.iter().cloned());
        }
        if recursive {
            for child in self.components() {
                child.collect_types(true, into);
            }
        }
    }

    /// Data variables referenced by contained functions, de-duplicated and
    /// ordered by address. With `recursive`, child components contribute too.
    ///
    /// References whose variable is no longer recorded in the view are
    /// skipped with a log line.
    pub fn referenced_data_variables(&self, recursive: bool) -> Vec<Arc<DataVariable>> {
        let mut addresses = BTreeSet::new();
        self.collect_data_refs(recursive, &mut addresses);

        let mut variables = Vec::with_capacity(addresses.len());
        for address in addresses {
            match self.data.data_variables.get(&address) {
                Some(entry) => variables.push(entry.value().clone()),
                None => {
                    warn!(address, "referenced data variable is not recorded in the view");
                }
            }
        }
        variables
    }

    fn collect_data_refs(&self, recursive: bool, into: &mut BTreeSet<u64>) {
        for function in self.functions() {
            into.extend(function.data_refs.iter().copied());
        }
        if recursive {
            for child in self.components() {
                child.collect_data_refs(true, into);
            }
        }
    }

    /// Indented tree dump of this component: functions, their references and
    /// child components, for diagnostics.
    pub fn sprawl(&self) -> String {
        let mut out = String::new();
        self.sprawl_into(0, &mut out);
        out
    }

    fn sprawl_into(&self, depth: usize, out: &mut String) {
        let indent = "  ".repeat(depth);
        out.push_str(&format!(
            "{indent}<Component \"{}\" ({}...)>\n",
            self.name(),
            &self.record.guid[..8.min(self.record.guid.len())]
        ));
        for function in self.functions() {
            out.push_str(&format!(
                "{indent}  <Function \"{}\" @ {:#x}>\n",
                function.name, function.start
            ));
        }
        for variable in self.referenced_data_variables(false) {
            out.push_str(&format!(
                "{indent}  <DataVariable {:#x}: {}>\n",
                variable.address, variable.type_name
            ));
        }
        for type_name in self.referenced_types(false) {
            out.push_str(&format!("{indent}  <Type {type_name}>\n"));
        }
        for child in self.components() {
            child.sprawl_into(depth + 1, out);
        }
    }
}

impl Clone for Component {
    fn clone(&self) -> Self {
        Self {
            data: self.data.clone(),
            record: self.record.clone(),
        }
    }
}

impl PartialEq for Component {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.data, &other.data) && self.record.guid == other.record.guid
    }
}

impl Eq for Component {}

impl std::fmt::Debug for Component {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Component")
            .field("guid", &self.record.guid)
            .field("name", &self.name())
            .field("parent", &*read_lock!(self.record.parent))
            .finish()
    }
}

/// Whether `guid` appears in the parent chain of `record` (inclusive walk
/// from the record's parent upward).
fn is_in_parent_chain(data: &ViewData, record: &ComponentRecord, guid: &str) -> bool {
    let limit = data.components.len();
    let mut steps = 0usize;
    let mut cursor = read_lock!(record.parent).clone();
    while let Some(current) = cursor {
        if current == guid {
            return true;
        }
        let Some(parent) = data.components.get(&current).map(|r| r.value().clone()) else {
            return false;
        };
        steps += 1;
        if steps > limit {
            return false;
        }
        cursor = read_lock!(parent.parent).clone();
    }
    false
}

/// Detach `record` from its current parent's child list or the root list.
fn detach(data: &ViewData, record: &ComponentRecord) {
    let old_parent = read_lock!(record.parent).clone();
    match old_parent {
        Some(parent_guid) => {
            if let Some(parent) = data.components.get(&parent_guid).map(|r| r.value().clone()) {
                write_lock!(parent.children).retain(|guid| guid != &record.guid);
            }
        }
        None => {
            lock!(data.roots).retain(|guid| guid != &record.guid);
        }
    }
    *write_lock!(record.parent) = None;
}

/// Remove `guid` and every descendant record from the component table.
fn destroy_subtree(data: &ViewData, guid: &str) {
    let mut doomed = vec![guid.to_string()];
    let mut cursor = 0;
    while cursor < doomed.len() {
        let record = data
            .components
            .get(&doomed[cursor])
            .map(|r| r.value().clone());
        if let Some(record) = record {
            doomed.extend(read_lock!(record.children).iter().cloned());
        }
        cursor += 1;
    }
    for guid in doomed {
        data.components.remove(&guid);
    }
}

/// Attach `component` to the root list; see
/// [`AnalysisView::add_root_component`](crate::analysis::AnalysisView::add_root_component).
pub(crate) fn add_root(data: &Arc<ViewData>, component: &Component) -> bool {
    if !Arc::ptr_eq(data, &component.data) {
        return false;
    }
    if data.components.get(&component.record.guid).is_none() {
        return false;
    }
    if lock!(data.roots)
        .iter()
        .any(|guid| guid == &component.record.guid)
    {
        return false;
    }

    detach(data, &component.record);
    lock!(data.roots).push(component.record.guid.clone());
    true
}

/// Detach a root component and destroy its subtree; see
/// [`AnalysisView::remove_root_component`](crate::analysis::AnalysisView::remove_root_component).
pub(crate) fn remove_root(data: &Arc<ViewData>, guid: &str) -> bool {
    let removed = {
        let mut roots = lock!(data.roots);
        match roots.iter().position(|root| root == guid) {
            Some(index) => {
                roots.remove(index);
                true
            }
            None => false,
        }
    };
    if removed {
        destroy_subtree(data, guid);
    }
    removed
}
