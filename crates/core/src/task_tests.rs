// SPDX-License-Identifier: MIT

use super::*;

fn sample(cron: &str) -> Task {
    Task {
        project_id: 1,
        task_id: "hello".into(),
        name: "Hello".into(),
        command: "echo hi".into(),
        cron: cron.into(),
        timeout: 0,
        noseize: false,
        remark: String::new(),
    }
}

#[test]
fn scheduler_key_is_project_and_task_id() {
    let t = sample("");
    assert_eq!(t.scheduler_key().as_str(), "1:hello");
}

#[test]
fn empty_cron_is_not_periodic() {
    assert!(!sample("").is_periodic());
    assert!(!sample("   ").is_periodic());
    assert!(sample("*/5 * * * *").is_periodic());
}

#[test]
fn fingerprint_is_stable_for_identical_definitions() {
    let a = sample("* * * * *");
    let b = sample("* * * * *");
    assert_eq!(a.definition_fingerprint(), b.definition_fingerprint());
}

#[test]
fn validate_rejects_empty_task_id() {
    let mut t = sample("");
    t.task_id = "  ".into();
    assert_eq!(t.validate(), Err(crate::errors::CoreError::EmptyTaskId));
}

#[test]
fn validate_rejects_non_positive_project_id() {
    let mut t = sample("");
    t.project_id = 0;
    assert_eq!(t.validate(), Err(crate::errors::CoreError::NonPositiveProjectId));
}

#[test]
fn validate_accepts_well_formed_task() {
    assert!(sample("").validate().is_ok());
}

#[test]
fn fingerprint_changes_with_command() {
    let a = sample("* * * * *");
    let mut b = sample("* * * * *");
    b.command = "echo bye".into();
    assert_ne!(a.definition_fingerprint(), b.definition_fingerprint());
}
