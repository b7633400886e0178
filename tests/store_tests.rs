use definject::{DefineOptions, DefinitionStore, Shape, Value, View};
use pretty_assertions::assert_eq;

fn inactive() -> DefineOptions {
    DefineOptions { activate: false }
}

#[test]
fn get_returns_the_defined_value() {
    let mut store = DefinitionStore::new();
    store.define("Object.subset.x", "test");
    assert_eq!(
        store.get("Object.subset.x", View::All),
        Some(&Value::from("test"))
    );
}

#[test]
fn redefining_keeps_the_latest_value() {
    let mut store = DefinitionStore::new();
    store.define("Object.subset.x", "test");
    store.define("Object.subset.x", "dog");
    assert_eq!(
        store.get("Object.subset.x", View::All),
        Some(&Value::from("dog"))
    );
}

#[test]
fn has_is_true_after_define() {
    let mut store = DefinitionStore::new();
    store.define("Object.subset.x", "test");
    assert!(store.has("Object.subset.x", View::All));
}

#[test]
fn undefine_removes_value_and_membership() {
    let mut store = DefinitionStore::new();
    store.define("Object.subset.x", "test");
    store.undefine("Object.subset.x");
    assert_eq!(store.get("Object.subset.x", View::All), None);
    assert!(!store.has("Object.subset.x", View::All));
}

#[test]
fn undefine_prunes_namespaces_left_without_values() {
    let mut store = DefinitionStore::new();
    store.define("Object.subset.x", "test");
    store.undefine("Object.subset.x");
    assert!(!store.has("Object.subset", View::All));
    assert!(!store.has("Object", View::All));
}

#[test]
fn undefine_keeps_namespaces_with_surviving_values() {
    let mut store = DefinitionStore::new();
    store.define("Object.subset.x", "test");
    store.define("Object.other", "kept");
    store.undefine("Object.subset.x");
    assert!(!store.has("Object.subset", View::All));
    assert!(store.has("Object", View::All));
    assert_eq!(store.get("Object.other", View::All), Some(&Value::from("kept")));
}

#[test]
fn undefine_removes_whole_subtrees() {
    let mut store = DefinitionStore::new();
    store.define("Object.subset.x", "test");
    store.undefine("Object.subset");
    assert!(!store.has("Object.subset.x", View::All));
}

#[test]
fn repeated_undefine_is_a_no_op() {
    let mut store = DefinitionStore::new();
    store.define("Object.subset.x", "test");
    store.undefine("Object.subset.x");
    store.undefine("Object.subset.x");
    assert!(!store.has("Object.subset.x", View::All));
}

#[test]
fn define_activates_by_default() {
    let mut store = DefinitionStore::new();
    store.define("Object.subset.x", "test");
    assert_eq!(
        store.get("Object.subset.x", View::Active),
        Some(&Value::from("test"))
    );
    assert_eq!(store.get("Object.subset.x", View::Inactive), None);
}

#[test]
fn define_with_activate_false_lands_in_the_inactive_view() {
    let mut store = DefinitionStore::new();
    store.define_with("Object.subset.x", "test", inactive());
    assert_eq!(store.get("Object.subset.x", View::Active), None);
    assert_eq!(
        store.get("Object.subset.x", View::Inactive),
        Some(&Value::from("test"))
    );
}

#[test]
fn namespaces_aggregate_their_members_views() {
    let mut store = DefinitionStore::new();
    store.define("ns.on", "1");
    store.define_with("ns.off", "2", inactive());
    // A namespace with members in both states shows up in both views.
    assert!(store.has("ns", View::Active));
    assert!(store.has("ns", View::Inactive));
}

#[test]
fn deactivation_bubbles_up_when_nothing_active_remains() {
    let mut store = DefinitionStore::new();
    store.define("Object.subset.x", "test");
    store.deactivate("Object.subset.x");
    assert!(!store.has("Object.subset", View::Active));
    assert!(!store.has("Object", View::Active));
    assert!(store.has("Object", View::Inactive));
}

#[test]
fn deactivation_respects_active_siblings() {
    let mut store = DefinitionStore::new();
    store.define("Object.a", "1");
    store.define("Object.b", "2");
    store.deactivate("Object.a");
    assert!(store.has("Object", View::Active));
    assert!(store.has("Object.a", View::Inactive));
    assert!(store.has("Object.b", View::Active));
}

#[test]
fn activate_marks_the_whole_path() {
    let mut store = DefinitionStore::new();
    store.define_with("Object.subset.x", "test", inactive());
    store.activate("Object.subset.x");
    assert!(store.has("Object", View::Active));
    assert!(store.has("Object.subset", View::Active));
    assert_eq!(
        store.get("Object.subset.x", View::Active),
        Some(&Value::from("test"))
    );
}

#[test]
fn activate_on_a_missing_path_creates_nothing() {
    let mut store = DefinitionStore::new();
    store.activate("nope.x");
    assert!(!store.has("nope", View::All));
}

#[test]
fn activate_all_and_deactivate_all_flip_every_definition() {
    let mut store = DefinitionStore::new();
    store.define("a.b", "1");
    store.define_with("a.c", "2", inactive());

    store.activate_all();
    assert!(store.has("a.c", View::Active));

    store.deactivate_all();
    assert!(!store.has("a.b", View::Active));
    assert!(store.has("a.b", View::Inactive));
}

#[test]
fn undefine_all_can_target_one_view() {
    let mut store = DefinitionStore::new();
    store.define("a.on", "1");
    store.define_with("a.off", "2", inactive());
    store.define_with("b.off", "3", inactive());

    store.undefine_all(View::Inactive);
    assert!(store.has("a.on", View::All));
    assert!(!store.has("a.off", View::All));
    // `b` held only inactive members, so the namespace goes with them.
    assert!(!store.has("b", View::All));

    store.undefine_all(View::All);
    assert!(!store.has("a", View::All));
}

#[test]
fn get_on_a_namespace_returns_no_value() {
    let mut store = DefinitionStore::new();
    store.define("Object.subset.x", "test");
    assert_eq!(store.get("Object.subset", View::All), None);
    assert!(store.has("Object.subset", View::All));
}

#[test]
fn segment_list_paths_are_accepted() {
    let mut store = DefinitionStore::new();
    store.define(["Object", "subset", "x"].as_slice(), "test");
    assert_eq!(
        store.get("Object.subset.x", View::All),
        Some(&Value::from("test"))
    );
}

#[test]
fn invalid_paths_are_ignored() {
    let mut store = DefinitionStore::new();
    store.define("", "test");
    store.define("...", "test");
    assert_eq!(store.get("", View::All), None);
    assert!(!store.has("...", View::All));
    assert!(store.get_all(View::All, Shape::Full).as_full().is_some());
}

#[test]
fn clones_are_independent() {
    let mut store = DefinitionStore::new();
    store.define("Object.subset.x", "test");
    let copy = store.clone();

    store.undefine("Object.subset");
    assert!(!store.has("Object.subset.x", View::All));
    assert!(copy.has("Object.subset.x", View::All));
}

#[test]
fn from_definitions_seeds_and_activates() {
    let store = DefinitionStore::from_definitions([
        ("Object.subset.x", "test"),
        ("Array.component.a", "component_a"),
    ]);
    assert!(store.has("Object.subset.x", View::Active));
    assert!(store.has("Array.component.a", View::Active));
}

#[test]
fn full_export_filters_by_view() {
    let mut store = DefinitionStore::new();
    store.define("ns.on", "1");
    store.define_with("ns.off", "2", inactive());

    let active = store.get_all(View::Active, Shape::Full);
    let ns = &active.as_full().unwrap().children["ns"];
    assert!(ns.children.contains_key("on"));
    assert!(!ns.children.contains_key("off"));
}

#[test]
fn condensed_export_collapses_to_values() {
    let mut store = DefinitionStore::new();
    store.define("Array.component.a", "component_a");

    let export = store.get_all(View::All, Shape::Condensed);
    let condensed = export.as_condensed().unwrap();
    let leaf = condensed
        .get("Array")
        .and_then(|c| c.get("component"))
        .and_then(|c| c.get("a"))
        .unwrap();
    assert_eq!(leaf.value(), Some(&Value::from("component_a")));
}

#[test]
fn non_string_values_round_trip() {
    let mut store = DefinitionStore::new();
    store.define("Number.constant.e", 2.4);
    store.define("Flag.debug", true);
    assert_eq!(
        store.get("Number.constant.e", View::All),
        Some(&Value::from(2.4))
    );
    assert_eq!(store.get("Flag.debug", View::All), Some(&Value::from(true)));
}
