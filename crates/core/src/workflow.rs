// SPDX-License-Identifier: MIT

//! A workflow definition: a DAG of task nodes.

use crate::id::WorkflowId;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use thiserror::Error;

/// One node in a workflow DAG. References an existing [`crate::task::Task`]
/// by `(project_id, task_id)` and declares its dependency node ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowNode {
    pub id: String,
    pub project_id: i64,
    pub task_id: String,
    #[serde(default)]
    pub depends_on: BTreeSet<String>,
}

/// A workflow definition: a DAG of [`WorkflowNode`]s.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workflow {
    pub id: WorkflowId,
    pub name: String,
    pub nodes: Vec<WorkflowNode>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WorkflowDefinitionError {
    #[error("workflow has no nodes")]
    Empty,
    #[error("node {0:?} depends on unknown node {1:?}")]
    UnknownDependency(String, String),
    #[error("node id {0:?} is declared more than once")]
    DuplicateNode(String),
    #[error("workflow contains a cycle")]
    Cyclic,
}

impl Workflow {
    /// Validate acyclicity via Kahn's algorithm (iterative — DAGs here are
    /// not depth-bounded, so a recursive walk is the wrong tool). Returns
    /// nodes in a valid topological order on success.
    pub fn topological_order(&self) -> Result<Vec<&WorkflowNode>, WorkflowDefinitionError> {
        if self.nodes.is_empty() {
            return Err(WorkflowDefinitionError::Empty);
        }

        let mut by_id: BTreeMap<&str, &WorkflowNode> = BTreeMap::new();
        for node in &self.nodes {
            if by_id.insert(&node.id, node).is_some() {
                return Err(WorkflowDefinitionError::DuplicateNode(node.id.clone()));
            }
        }
        for node in &self.nodes {
            for dep in &node.depends_on {
                if !by_id.contains_key(dep.as_str()) {
                    return Err(WorkflowDefinitionError::UnknownDependency(
                        node.id.clone(),
                        dep.clone(),
                    ));
                }
            }
        }

        let mut indegree: BTreeMap<&str, usize> =
            self.nodes.iter().map(|n| (n.id.as_str(), n.depends_on.len())).collect();
        let mut dependents: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        for node in &self.nodes {
            for dep in &node.depends_on {
                dependents.entry(dep.as_str()).or_default().push(&node.id);
            }
        }

        let mut frontier: VecDeque<&str> = indegree
            .iter()
            .filter(|(_, &deg)| deg == 0)
            .map(|(id, _)| *id)
            .collect();
        let mut order = Vec::with_capacity(self.nodes.len());
        while let Some(id) = frontier.pop_front() {
            order.push(by_id[id]);
            if let Some(deps) = dependents.get(id) {
                for &dependent in deps {
                    if let Some(deg) = indegree.get_mut(dependent) {
                        *deg -= 1;
                        if *deg == 0 {
                            frontier.push_back(dependent);
                        }
                    }
                }
            }
        }

        if order.len() != self.nodes.len() {
            return Err(WorkflowDefinitionError::Cyclic);
        }
        Ok(order)
    }

    /// Nodes with no dependencies — the virtual start.
    pub fn roots(&self) -> impl Iterator<Item = &WorkflowNode> {
        self.nodes.iter().filter(|n| n.depends_on.is_empty())
    }

    /// Nodes with no dependents — the virtual end.
    pub fn leaves(&self) -> impl Iterator<Item = &WorkflowNode> {
        let depended_on: BTreeSet<&str> =
            self.nodes.iter().flat_map(|n| n.depends_on.iter().map(String::as_str)).collect();
        self.nodes.iter().filter(move |n| !depended_on.contains(n.id.as_str()))
    }

    pub fn node(&self, id: &str) -> Option<&WorkflowNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Nodes that directly depend on `id`.
    pub fn dependents_of<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a WorkflowNode> {
        self.nodes.iter().filter(move |n| n.depends_on.contains(id))
    }
}

#[cfg(test)]
#[path = "workflow_tests.rs"]
mod tests;
