use std::path::Path;
use std::sync::Arc;

use crate::analysis::{AnalysisView, DataVariable, Function};
use crate::project::Project;

// Helper function to create a project in a scratch directory
pub fn scratch_project(dir: &Path) -> Project {
    Project::create(dir.join("scratch.bsproj"), "scratch").unwrap()
}

// Helper function to create a view with one function referencing one data
// variable, the smallest interesting component fixture
pub fn sample_view() -> (AnalysisView, Arc<Function>) {
    let view = AnalysisView::new("helloworld");
    view.add_data_variable(DataVariable {
        address: 0x4000,
        type_name: "char const*".to_string(),
        auto_discovered: true,
    });
    let main = view.add_function(
        Function::new(0x1000, "main")
            .with_referenced_types(&["int32_t", "char const*"])
            .with_data_refs(&[0x4000]),
    );
    (view, main)
}

// Helper function to populate a project with a deep parent chain, returning
// the folder ids root-first
pub fn deep_folder_chain(project: &Project, depth: usize) -> Vec<String> {
    let mut ids = Vec::with_capacity(depth);
    let mut parent = None;
    for level in 0..depth {
        let folder = project
            .add_folder(parent.as_ref(), &format!("level-{level}"))
            .unwrap();
        ids.push(folder.id().to_string());
        parent = Some(folder);
    }
    ids
}
