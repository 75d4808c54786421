// SPDX-License-Identifier: MIT

use super::*;

fn descriptor(region: &str, weight: u32) -> AgentDescriptor {
    AgentDescriptor {
        endpoint: "10.0.0.1:7000".into(),
        organization: "acme".into(),
        region: region.into(),
        project_ids: BTreeSet::from([1, 2]),
        weight,
        version: "0.2.0".into(),
        registered_at_unix_seconds: 0,
    }
}

#[test]
fn zero_weight_is_draining() {
    assert!(descriptor("us-east", 0).is_draining());
    assert!(!descriptor("us-east", 1).is_draining());
}

#[test]
fn empty_or_star_region_hint_matches_any_region() {
    let a = descriptor("us-east", 1);
    assert!(a.matches_region(""));
    assert!(a.matches_region("*"));
    assert!(a.matches_region("us-east"));
    assert!(!a.matches_region("eu-west"));
}

#[test]
fn serves_project_checks_membership() {
    let a = descriptor("us-east", 1);
    assert!(a.serves_project(1));
    assert!(!a.serves_project(99));
}
