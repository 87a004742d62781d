// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![allow(dead_code)]

//! # binscope
//!
//! The workspace layer of a binary analysis toolchain: on-disk projects with
//! a folder tree of imported binaries, the component system grouping
//! analyzed functions, a demangler registry, workflow activities, and the
//! toolkit-agnostic state models the desktop UI binds to. Built in pure
//! Rust; analysis itself (disassembly, lifting, symbol resolution) is the
//! business of other layers — this crate organizes its inputs and outputs.
//!
//! ## Features
//!
//! - **📦 On-disk projects** - imported files with SHA-1 content identity, a
//!   cycle-checked folder forest, XML manifest persistence and parallel
//!   directory import
//! - **🧩 Components** - named hierarchical groupings of functions with
//!   derived type and data-variable reference queries
//! - **🔤 Demangler registry** - pluggable backends, first-recognizer-wins
//!   dispatch, template-aware name simplification
//! - **⚙️ Workflow activities** - named actions over an analysis context
//!   with a JSON request journal
//! - **🖥️ UI models** - custom tab registry and dialog state with
//!   synchronous validation, no toolkit dependency
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use binscope::prelude::*;
//!
//! let project = Project::create("/tmp/router.bsproj", "router teardown")?;
//! let firmware = project.add_folder(None, "firmware")?;
//! project.add_file("/captures/boot.bin", Some(&firmware), "boot.bin")?;
//! project.save()?;
//!
//! for folder in project.sorted_folders()? {
//!     println!("{} {}", folder.id(), folder.name());
//! }
//! # Ok::<(), binscope::Error>(())
//! ```
//!
//! ## Architecture
//!
//! `binscope` is organized into several key modules:
//!
//! - [`project`] - on-disk project container, folders, files, import and
//!   persistence
//! - [`analysis`] - analysis view, function/data records, components and
//!   workflow activities
//! - [`demangle`] - demangler trait, registry and name simplification
//! - [`ui`] - tab registry and dialog state models
//! - [`Error`] and [`Result`] - error handling used throughout
//!
//! Records live in concurrent tables behind shared stores; public wrapper
//! types hold strong references and compare by identity. There are no
//! process-wide registries or hidden statics — hosts construct what they
//! need at startup and pass it down.
//!
//! ## Error Handling
//!
//! Operations that can be meaningfully refused (adding a function reference
//! twice, removing an absent child) return `bool` and change nothing on
//! refusal. Operations that can fail return [`Result<T, Error>`](Result):
//!
//! ```rust,no_run
//! use binscope::{project::Project, Error};
//!
//! match Project::open("/tmp/router.bsproj") {
//!     Ok(project) => println!("{} files", project.files().len()),
//!     Err(Error::Malformed { message, .. }) => eprintln!("bad manifest: {message}"),
//!     Err(e) => eprintln!("error: {e}"),
//! }
//! ```

#[macro_use]
pub(crate) mod macros;

#[macro_use]
pub(crate) mod error;
pub(crate) mod utils;

/// Shared functionality which is used in unit- and integration-tests
#[cfg(test)]
pub(crate) mod test;

/// Convenient re-exports of the most commonly used types and traits.
///
/// # Example
///
/// ```rust,no_run
/// use binscope::prelude::*;
///
/// let project = Project::create("/tmp/demo.bsproj", "demo")?;
/// assert_eq!(project.folders().len(), 0);
/// # Ok::<(), binscope::Error>(())
/// ```
pub mod prelude;

/// On-disk project container: imported files organized in a folder tree.
///
/// # Key Types
///
/// - [`project::Project`] - the project itself
/// - [`project::ProjectFolder`] / [`project::ProjectFile`] - record wrappers
/// - [`project::ImportFlags`] / [`project::ImportReport`] - bulk import
pub mod project;

/// Analysis view, function and data-variable records, components and
/// workflow activities.
///
/// # Key Types
///
/// - [`analysis::AnalysisView`] - per-binary anchor
/// - [`analysis::Component`] - named function grouping
/// - [`analysis::Activity`] / [`analysis::AnalysisContext`] - workflow hooks
pub mod analysis;

/// Demangler trait, registry and template-aware name simplification.
pub mod demangle;

/// Toolkit-agnostic UI models: tab registry and dialog state.
pub mod ui;

/// `binscope` Result type
///
/// A type alias for [`std::result::Result<T, Error>`] where the error type
/// is always [`Error`]. This is used consistently throughout the crate for
/// all fallible operations.
pub type Result<T> = std::result::Result<T, Error>;

/// `binscope` Error type
///
/// The main error type for all operations in this crate; the variant
/// documentation on [`Error`] describes the categories.
pub use error::Error;
