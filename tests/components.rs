//! Component grouping scenario exercised end to end, following the classic
//! add/remove/contains sequence over a small analyzed binary.

use binscope::analysis::{AnalysisView, DataVariable, Function};

fn analyzed_view() -> AnalysisView {
    let view = AnalysisView::new("helloworld");
    view.add_data_variable(DataVariable {
        address: 0x0804_a000,
        type_name: "char const*".to_string(),
        auto_discovered: true,
    });
    view.add_function(
        Function::new(0x0804_8400, "_start")
            .with_referenced_types(&["void"])
            .with_data_refs(&[]),
    );
    view.add_function(
        Function::new(0x0804_8500, "main")
            .with_referenced_types(&["int32_t", "char const*"])
            .with_data_refs(&[0x0804_a000]),
    );
    view
}

#[test]
fn component_scenario() {
    let view = analyzed_view();
    let entry = view.function_at(0x0804_8400).unwrap();

    let component = view.create_component(None);

    let functions = view_function_names(&component.functions());
    assert!(!functions.contains(&"_start".to_string()));
    assert!(component.add_function(&entry));
    let functions = view_function_names(&component.functions());
    assert!(functions.contains(&"_start".to_string()));

    assert!(component.remove_function(&entry));
    assert!(component.functions().is_empty());
    assert!(component.referenced_types(false).is_empty());
    assert!(component.referenced_data_variables(false).is_empty());

    let child = view.create_component(None);
    assert!(!component.contains_component(&child));
    assert!(component.add_component(&child));
    assert!(component.contains_component(&child));

    assert_eq!(
        view.component_by_guid(child.guid()).unwrap().guid(),
        child.guid()
    );

    assert!(component.remove_component(&child));
    assert!(!component.contains_component(&child));
    assert!(component.components().is_empty());

    component.set_name("TestName1");
    assert_eq!(component.name(), "TestName1");

    assert!(view.add_root_component(&component));
    assert!(view.component_by_guid(component.guid()).is_some());

    assert!(view.remove_root_component(&component));
    assert!(view.component_by_guid(component.guid()).is_none());
    assert!(view.root_components().is_empty());
}

#[test]
fn component_references_and_hierarchy() {
    let view = analyzed_view();
    let main = view.function_at(0x0804_8500).unwrap();

    let component = view.create_component(None);
    component.set_name("ACoolName");
    assert_eq!(component.name(), "ACoolName");

    assert!(!component.remove_function(&main), "remove before add refuses");
    assert!(component.add_function(&main));

    assert!(!component.referenced_data_variables(false).is_empty());
    assert!(!component.referenced_types(false).is_empty());
    assert!(component.contains_function(&main));

    assert!(component.remove_function(&main));
    assert!(component.referenced_data_variables(false).is_empty());
    assert!(component.referenced_types(false).is_empty());
    assert!(!component.contains_function(&main));

    component.add_function(&main);

    let parent = view.create_component(None);
    parent.add_component(&component);
    assert!(parent.contains_component(&component));

    let grandparent = view.create_component(None);
    grandparent.add_function(&main);
    grandparent.add_component(&parent);
    assert_eq!(parent.parent(), Some(grandparent.clone()));
    assert_ne!(parent.parent(), Some(component.clone()));

    assert_eq!(
        view.component_by_guid(parent.guid()).unwrap(),
        parent
    );

    let dump = grandparent.sprawl();
    assert!(dump.contains("main"));

    parent.remove_component(&component);
    assert!(!parent.contains_component(&component));
}

fn view_function_names(functions: &[std::sync::Arc<Function>]) -> Vec<String> {
    functions.iter().map(|f| f.name.clone()).collect()
}
