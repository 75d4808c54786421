// SPDX-License-Identifier: MIT

use super::*;
use cronmesh_core::test_support::AgentDescriptorBuilder;

fn descriptor() -> cronmesh_core::AgentDescriptor {
    AgentDescriptorBuilder::new("10.0.0.1:9000").region("us-east").project(1).build()
}

#[test]
fn matches_exact_region() {
    let mut d = descriptor();
    d.organization = "acme".into();
    let filter = LookupFilter::new("acme", "us-east", 1);
    assert!(filter.matches(&d));
}

#[test]
fn empty_or_star_region_matches_any() {
    let mut d = descriptor();
    d.organization = "acme".into();
    assert!(LookupFilter::new("acme", "", 1).matches(&d));
    assert!(LookupFilter::new("acme", "*", 1).matches(&d));
}

#[test]
fn mismatched_region_or_project_does_not_match() {
    let mut d = descriptor();
    d.organization = "acme".into();
    assert!(!LookupFilter::new("acme", "eu-west", 1).matches(&d));
    assert!(!LookupFilter::new("acme", "us-east", 2).matches(&d));
    assert!(!LookupFilter::new("other-org", "us-east", 1).matches(&d));
}
