//! Custom launch-tab item registry.
//!
//! The launch tab is assembled from named built-in items; plugins extend it
//! by registering `(display name, factory)` pairs after one of those
//! anchors. The registry is an explicit value owned by the UI context — no
//! process-wide statics — and safe for concurrent registration from plugin
//! initializers.
//!
//! The factory type is generic: a real frontend instantiates widgets, tests
//! and headless hosts can register anything cloneable.
//!
//! # Examples
//!
//! ```rust
//! use binscope::ui::tabs::{TabRegistry, TOP_RIGHT_WIDGET};
//! use std::sync::Arc;
//!
//! type Factory = Arc<dyn Fn() -> String + Send + Sync>;
//!
//! let registry: TabRegistry<Factory> = TabRegistry::new();
//! registry.register_after(
//!     TOP_RIGHT_WIDGET,
//!     "MyCustomTabItem",
//!     Arc::new(|| "recent binaries".to_string()),
//! );
//!
//! let items = registry.items_after(TOP_RIGHT_WIDGET);
//! assert_eq!(items.len(), 1);
//! assert_eq!(items[0].0, "MyCustomTabItem");
//! assert_eq!((items[0].1)(), "recent binaries");
//! ```

use std::{collections::HashMap, sync::Mutex};

/// Left-column anchor: the widget above the recent file list.
pub const TOP_LEFT_WIDGET: &str = "TopLeftWidget";
/// Left-column anchor: the recent file list.
pub const RECENT_FILE_LIST: &str = "RecentFileList";
/// Left-column anchor: the open/new buttons row.
pub const OPEN_BUTTONS: &str = "OpenButtons";
/// Left-column anchor: the release notes panel.
pub const RELEASE_NOTES: &str = "ReleaseNotes";
/// Right-column anchor: the widget above the news feed.
pub const TOP_RIGHT_WIDGET: &str = "TopRightWidget";
/// Right-column anchor: the news feed.
pub const NEWS: &str = "News";

/// Registry of custom tab items keyed by the anchor they follow.
///
/// Items for one anchor keep their registration order; that order is the
/// display order.
pub struct TabRegistry<F> {
    items: Mutex<HashMap<String, Vec<(String, F)>>>,
}

impl<F: Clone> TabRegistry<F> {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            items: Mutex::new(HashMap::new()),
        }
    }

    /// Register an item to be displayed after `anchor`.
    pub fn register_after(&self, anchor: &str, display_name: &str, factory: F) {
        lock!(self.items)
            .entry(anchor.to_string())
            .or_default()
            .push((display_name.to_string(), factory));
    }

    /// Items registered after `anchor`, in registration order.
    pub fn items_after(&self, anchor: &str) -> Vec<(String, F)> {
        lock!(self.items)
            .get(anchor)
            .cloned()
            .unwrap_or_default()
    }

    /// Anchors that have at least one registered item, sorted by name.
    pub fn anchors(&self) -> Vec<String> {
        let mut anchors: Vec<String> = lock!(self.items).keys().cloned().collect();
        anchors.sort();
        anchors
    }
}

impl<F: Clone> Default for TabRegistry<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F> std::fmt::Debug for TabRegistry<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let items = lock!(self.items);
        let mut counts: Vec<(String, usize)> = items
            .iter()
            .map(|(anchor, list)| (anchor.clone(), list.len()))
            .collect();
        counts.sort();
        f.debug_struct("TabRegistry").field("items", &counts).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    type Factory = Arc<dyn Fn() -> &'static str + Send + Sync>;

    #[test]
    fn registration_order_is_display_order() {
        let registry: TabRegistry<Factory> = TabRegistry::new();
        registry.register_after(TOP_RIGHT_WIDGET, "first", Arc::new(|| "a"));
        registry.register_after(TOP_RIGHT_WIDGET, "second", Arc::new(|| "b"));
        registry.register_after(NEWS, "elsewhere", Arc::new(|| "c"));

        let names: Vec<String> = registry
            .items_after(TOP_RIGHT_WIDGET)
            .into_iter()
            .map(|(name, _)| name)
            .collect();
        assert_eq!(names, ["first", "second"]);
        assert!(registry.items_after(TOP_LEFT_WIDGET).is_empty());
        assert_eq!(
            registry.anchors(),
            [NEWS.to_string(), TOP_RIGHT_WIDGET.to_string()]
        );
    }

    #[test]
    fn concurrent_registration_is_safe() {
        let registry: Arc<TabRegistry<Factory>> = Arc::new(TabRegistry::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let registry = registry.clone();
                std::thread::spawn(move || {
                    registry.register_after(
                        TOP_LEFT_WIDGET,
                        &format!("plugin-{i}"),
                        Arc::new(|| "w"),
                    );
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(registry.items_after(TOP_LEFT_WIDGET).len(), 8);
    }
}
