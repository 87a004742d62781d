//! # binscope Prelude
//!
//! This module provides a convenient prelude for the most commonly used
//! types from the binscope library. Import this module to get quick access
//! to the essential types for project and analysis organization.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all binscope operations
pub use crate::Error;

/// The result type used throughout binscope
pub use crate::Result;

// ================================================================================================
// Projects
// ================================================================================================

/// On-disk project container
pub use crate::project::Project;

/// Record wrappers for folders and imported files
pub use crate::project::{ProjectFile, ProjectFolder};

/// Bulk directory import options and report
pub use crate::project::{ImportFlags, ImportReport};

// ================================================================================================
// Analysis
// ================================================================================================

/// Per-binary anchor for functions, data variables and components
pub use crate::analysis::AnalysisView;

/// Named hierarchical grouping of functions
pub use crate::analysis::Component;

/// Immutable analysis records
pub use crate::analysis::{DataVariable, Function};

/// Workflow extension points
pub use crate::analysis::{Activity, AnalysisContext};

// ================================================================================================
// Demangling
// ================================================================================================

/// Demangler trait and registry
pub use crate::demangle::{DemangledName, Demangler, DemanglerRegistry, QualifiedName};

// ================================================================================================
// UI Models
// ================================================================================================

/// Dialog and registry state models
pub use crate::ui::{ArrayFillMode, CreateArrayState, DebugInfoImportState, TabRegistry};
