// SPDX-License-Identifier: MIT

//! Projects partition tasks and agents.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A project: the unit that tasks, agents, and permissions are scoped to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: i64,
    pub title: String,
    pub remark: String,
    pub owner_user_id: i64,
    pub members: BTreeSet<i64>,
}

impl Project {
    pub fn new(id: i64, title: impl Into<String>, owner_user_id: i64) -> Self {
        Self {
            id,
            title: title.into(),
            remark: String::new(),
            owner_user_id,
            members: BTreeSet::from([owner_user_id]),
        }
    }

    pub fn is_member(&self, user_id: i64) -> bool {
        self.owner_user_id == user_id || self.members.contains(&user_id)
    }
}

#[cfg(test)]
#[path = "project_tests.rs"]
mod tests;
