//! Selection model of the debug-info import dialog.
//!
//! The dialog lists the debug objects found in an external debug-info file,
//! lets the user pick one from a combo box and open per-view settings tabs,
//! then reads the typed getters on accept.

/// One importable debug object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebugInfoObject {
    /// Display name of the object.
    pub name: String,
    /// Object kind (for example `pdb`, `dwarf`).
    pub kind: String,
    /// Load address the object's information applies to.
    pub address: u64,
    /// Size of the described region in bytes.
    pub length: u64,
    /// Where the object came from.
    pub source: String,
}

/// Import dialog state: object list, combo selection and settings tabs.
#[derive(Debug, Clone, Default)]
pub struct DebugInfoImportState {
    objects: Vec<DebugInfoObject>,
    selected: Option<usize>,
    settings_views: Vec<String>,
}

impl DebugInfoImportState {
    /// A dialog over `objects`, with the first object preselected.
    #[must_use]
    pub fn new(objects: Vec<DebugInfoObject>) -> Self {
        let selected = if objects.is_empty() { None } else { Some(0) };
        Self {
            objects,
            selected,
            settings_views: Vec::new(),
        }
    }

    /// The listed objects, in discovery order.
    pub fn objects(&self) -> &[DebugInfoObject] {
        &self.objects
    }

    /// Index of the selected object, if any.
    #[must_use]
    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    /// Select the object at `index`.
    ///
    /// Returns `false` — keeping the current selection — when `index` is out
    /// of range.
    pub fn set_selected(&mut self, index: usize) -> bool {
        if index < self.objects.len() {
            self.selected = Some(index);
            true
        } else {
            false
        }
    }

    /// The selected object; this is what an accepted dialog imports.
    pub fn selected_object(&self) -> Option<&DebugInfoObject> {
        self.objects.get(self.selected?)
    }

    /// Open a settings tab for a view type.
    ///
    /// Returns `false` when a tab for that view type is already open.
    pub fn add_settings_view(&mut self, view_type: &str) -> bool {
        if self.settings_views.iter().any(|v| v == view_type) {
            return false;
        }
        self.settings_views.push(view_type.to_string());
        true
    }

    /// Close the settings tab at `index`.
    ///
    /// Returns `false` when `index` is out of range.
    pub fn close_settings_view(&mut self, index: usize) -> bool {
        if index < self.settings_views.len() {
            self.settings_views.remove(index);
            true
        } else {
            false
        }
    }

    /// Open settings tabs, in open order.
    pub fn settings_views(&self) -> &[String] {
        &self.settings_views
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn objects() -> Vec<DebugInfoObject> {
        vec![
            DebugInfoObject {
                name: "app.pdb".to_string(),
                kind: "pdb".to_string(),
                address: 0x0040_0000,
                length: 0x1_0000,
                source: "symbol server".to_string(),
            },
            DebugInfoObject {
                name: "app.debug".to_string(),
                kind: "dwarf".to_string(),
                address: 0x0040_0000,
                length: 0x2_0000,
                source: "build output".to_string(),
            },
        ]
    }

    #[test]
    fn first_object_is_preselected() {
        let state = DebugInfoImportState::new(objects());
        assert_eq!(state.selected(), Some(0));
        assert_eq!(state.selected_object().unwrap().name, "app.pdb");

        let empty = DebugInfoImportState::new(Vec::new());
        assert_eq!(empty.selected(), None);
        assert!(empty.selected_object().is_none());
    }

    #[test]
    fn selection_is_bounds_checked() {
        let mut state = DebugInfoImportState::new(objects());
        assert!(state.set_selected(1));
        assert_eq!(state.selected_object().unwrap().kind, "dwarf");
        assert!(!state.set_selected(5));
        assert_eq!(state.selected(), Some(1));
    }

    #[test]
    fn settings_tabs_are_unique_and_closeable() {
        let mut state = DebugInfoImportState::new(objects());
        assert!(state.add_settings_view("ELF"));
        assert!(state.add_settings_view("Mach-O"));
        assert!(!state.add_settings_view("ELF"));
        assert_eq!(state.settings_views(), ["ELF", "Mach-O"]);

        assert!(state.close_settings_view(0));
        assert_eq!(state.settings_views(), ["Mach-O"]);
        assert!(!state.close_settings_view(7));
    }
}
