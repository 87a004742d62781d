//! Toolkit-agnostic UI models.
//!
//! The desktop frontend owns widgets, layout and the event loop; this module
//! owns the state those widgets bind to: the custom tab-item registry
//! plugins extend during startup, and dialog models whose validation runs
//! synchronously on each input edit.
//!
//! - [`tabs`] - custom launch-tab item registry and anchor names
//! - [`create_array`] - create-array dialog state and validation
//! - [`debug_info`] - debug-info import selection state

pub mod create_array;
pub mod debug_info;
pub mod tabs;

pub use create_array::{ArrayFillMode, CreateArrayState};
pub use debug_info::{DebugInfoImportState, DebugInfoObject};
pub use tabs::TabRegistry;
