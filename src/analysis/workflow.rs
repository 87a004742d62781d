//! Workflow activities and the per-run analysis context.
//!
//! An [`Activity`] is a named unit of work a workflow runs against an
//! [`AnalysisContext`]. The context carries the function under analysis,
//! lets the activity publish replacement basic blocks, and accepts JSON
//! requests through [`AnalysisContext::inform`] — an append-only journal the
//! surrounding orchestration drains.

use std::sync::{Arc, RwLock};

use serde_json::Value;
use tracing::warn;

use crate::analysis::Function;

/// One basic block span published by an activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BasicBlock {
    /// Start address of the block.
    pub start: u64,
    /// End address of the block (exclusive).
    pub end: u64,
}

/// Argument to [`AnalysisContext::inform_args`].
///
/// Requests are JSON arrays; each argument maps to one array element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InformArg {
    /// A plain string element.
    Str(String),
    /// An unsigned integer element.
    U64(u64),
    /// An architecture, serialized by name.
    Arch(String),
}

/// Per-run context handed to workflow activities.
///
/// All setters are usable from the activity callback; the request journal is
/// append-only and drained by whoever drives the workflow.
pub struct AnalysisContext {
    function: RwLock<Option<Arc<Function>>>,
    basic_blocks: RwLock<Option<Vec<BasicBlock>>>,
    requests: boxcar::Vec<Value>,
}

impl AnalysisContext {
    /// A context with no function attached yet.
    #[must_use]
    pub fn new() -> Self {
        Self {
            function: RwLock::new(None),
            basic_blocks: RwLock::new(None),
            requests: boxcar::Vec::new(),
        }
    }

    /// The function this run is analyzing, if one is attached.
    pub fn function(&self) -> Option<Arc<Function>> {
        read_lock!(self.function).clone()
    }

    /// Attach the function this run analyzes.
    pub fn set_function(&self, function: Arc<Function>) {
        *write_lock!(self.function) = Some(function);
    }

    /// Replacement basic blocks published by the activity, if any.
    pub fn basic_blocks(&self) -> Option<Vec<BasicBlock>> {
        read_lock!(self.basic_blocks).clone()
    }

    /// Publish a replacement basic-block list.
    pub fn set_basic_blocks(&self, blocks: Vec<BasicBlock>) {
        *write_lock!(self.basic_blocks) = Some(blocks);
    }

    /// Submit a raw JSON request.
    ///
    /// Returns `false` — recording nothing — when `request` is not valid
    /// JSON.
    pub fn inform(&self, request: &str) -> bool {
        match serde_json::from_str::<Value>(request) {
            Ok(value) => {
                self.requests.push(value);
                true
            }
            Err(err) => {
                warn!(%err, "discarding unparseable analysis request");
                false
            }
        }
    }

    /// Build and submit a JSON array request from typed arguments.
    pub fn inform_args(&self, args: &[InformArg]) -> bool {
        let request = Value::Array(
            args.iter()
                .map(|arg| match arg {
                    InformArg::Str(text) => Value::String(text.clone()),
                    InformArg::U64(value) => Value::from(*value),
                    InformArg::Arch(name) => Value::String(name.clone()),
                })
                .collect(),
        );
        self.requests.push(request);
        true
    }

    /// Snapshot of the submitted requests, in submission order.
    pub fn requests(&self) -> Vec<Value> {
        self.requests.iter().map(|(_, value)| value.clone()).collect()
    }
}

impl Default for AnalysisContext {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for AnalysisContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalysisContext")
            .field("function", &self.function().map(|func| func.name.clone()))
            .field("requests", &self.requests.count())
            .finish()
    }
}

/// Callback type run by an [`Activity`].
pub type ActivityAction = Box<dyn Fn(&AnalysisContext) + Send + Sync>;

/// A named unit of workflow work.
///
/// # Examples
///
/// ```rust
/// use binscope::analysis::{Activity, AnalysisContext};
///
/// let activity = Activity::new("core.function.rewriteBlocks", |ctx| {
///     ctx.inform(r#"["rewriteBlocks", "begin"]"#);
/// });
/// let context = AnalysisContext::new();
/// activity.run(&context);
/// assert_eq!(activity.name(), "core.function.rewriteBlocks");
/// assert_eq!(context.requests().len(), 1);
/// ```
pub struct Activity {
    name: String,
    action: ActivityAction,
}

impl Activity {
    /// Create an activity with the given registration name and action.
    pub fn new<F>(name: &str, action: F) -> Self
    where
        F: Fn(&AnalysisContext) + Send + Sync + 'static,
    {
        Self {
            name: name.to_string(),
            action: Box::new(action),
        }
    }

    /// Registration name of the activity.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Run the activity against `context`.
    pub fn run(&self, context: &AnalysisContext) {
        (self.action)(context);
    }
}

impl std::fmt::Debug for Activity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Activity").field("name", &self.name).finish()
    }
}
