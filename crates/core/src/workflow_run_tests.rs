// SPDX-License-Identifier: MIT

use super::*;

#[test]
fn admit_starts_every_node_pending() {
    let run = WorkflowRun::admit(WorkflowId::new(), ["a".into(), "b".into()], 0);
    assert_eq!(run.node_state("a"), Some(NodeState::Pending));
    assert_eq!(run.node_state("b"), Some(NodeState::Pending));
    assert!(matches!(run.state, RunState::Running));
}

#[test]
fn transition_rejects_decreasing_state() {
    let mut run = WorkflowRun::admit(WorkflowId::new(), ["a".into()], 0);
    assert!(run.transition("a", NodeState::Running));
    assert!(!run.transition("a", NodeState::Pending));
    assert_eq!(run.node_state("a"), Some(NodeState::Running));
}

#[test]
fn transition_rejects_leaving_a_terminal_state() {
    let mut run = WorkflowRun::admit(WorkflowId::new(), ["a".into()], 0);
    assert!(run.transition("a", NodeState::Succeeded));
    assert!(!run.transition("a", NodeState::Failed));
    assert_eq!(run.node_state("a"), Some(NodeState::Succeeded));
}

#[test]
fn transition_on_unknown_node_is_a_noop() {
    let mut run = WorkflowRun::admit(WorkflowId::new(), ["a".into()], 0);
    assert!(!run.transition("z", NodeState::Running));
}

#[test]
fn every_node_terminal_detects_completion() {
    let mut run = WorkflowRun::admit(WorkflowId::new(), ["a".into(), "b".into()], 0);
    assert!(!run.is_every_node_terminal());
    run.transition("a", NodeState::Succeeded);
    assert!(!run.is_every_node_terminal());
    run.transition("b", NodeState::Skipped);
    assert!(run.is_every_node_terminal());
}
