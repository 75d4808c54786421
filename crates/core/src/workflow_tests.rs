// SPDX-License-Identifier: MIT

use super::*;

fn node(id: &str, deps: &[&str]) -> WorkflowNode {
    WorkflowNode {
        id: id.into(),
        project_id: 1,
        task_id: id.into(),
        depends_on: deps.iter().map(|s| s.to_string()).collect(),
    }
}

fn diamond() -> Workflow {
    Workflow {
        id: WorkflowId::new(),
        name: "diamond".into(),
        nodes: vec![
            node("a", &[]),
            node("b", &["a"]),
            node("c", &["a"]),
            node("d", &["b", "c"]),
        ],
    }
}

#[test]
fn diamond_has_one_root_and_one_leaf() {
    let wf = diamond();
    assert_eq!(wf.roots().count(), 1);
    assert_eq!(wf.roots().next().unwrap().id, "a");
    assert_eq!(wf.leaves().count(), 1);
    assert_eq!(wf.leaves().next().unwrap().id, "d");
}

#[test]
fn topological_order_respects_dependencies() {
    let wf = diamond();
    let order = wf.topological_order().expect("acyclic");
    let pos = |id: &str| order.iter().position(|n| n.id == id).unwrap();
    assert!(pos("a") < pos("b"));
    assert!(pos("a") < pos("c"));
    assert!(pos("b") < pos("d"));
    assert!(pos("c") < pos("d"));
}

#[test]
fn detects_cycles() {
    let wf = Workflow {
        id: WorkflowId::new(),
        name: "cycle".into(),
        nodes: vec![node("a", &["b"]), node("b", &["a"])],
    };
    assert_eq!(wf.topological_order(), Err(WorkflowDefinitionError::Cyclic));
}

#[test]
fn detects_unknown_dependency() {
    let wf = Workflow { id: WorkflowId::new(), name: "bad".into(), nodes: vec![node("a", &["x"])] };
    assert_eq!(
        wf.topological_order(),
        Err(WorkflowDefinitionError::UnknownDependency("a".into(), "x".into()))
    );
}

#[test]
fn detects_duplicate_node_ids() {
    let wf = Workflow {
        id: WorkflowId::new(),
        name: "dup".into(),
        nodes: vec![node("a", &[]), node("a", &[])],
    };
    assert_eq!(wf.topological_order(), Err(WorkflowDefinitionError::DuplicateNode("a".into())));
}

#[test]
fn rejects_empty_workflow() {
    let wf = Workflow { id: WorkflowId::new(), name: "empty".into(), nodes: vec![] };
    assert_eq!(wf.topological_order(), Err(WorkflowDefinitionError::Empty));
}

#[test]
fn dependents_of_finds_direct_children_only() {
    let wf = diamond();
    let deps: BTreeSet<&str> = wf.dependents_of("a").map(|n| n.id.as_str()).collect();
    assert_eq!(deps, BTreeSet::from(["b", "c"]));
}
