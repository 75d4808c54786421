// SPDX-License-Identifier: MIT

use super::*;

#[test]
fn owner_is_always_a_member() {
    let p = Project::new(1, "payments", 42);
    assert!(p.is_member(42));
    assert!(!p.is_member(7));
}

#[test]
fn explicit_members_are_recognized() {
    let mut p = Project::new(1, "payments", 42);
    p.members.insert(7);
    assert!(p.is_member(7));
}
