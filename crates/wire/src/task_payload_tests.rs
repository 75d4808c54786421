// SPDX-License-Identifier: MIT

use super::*;

#[test]
fn decodes_a_well_formed_payload() {
    let json = br#"{"project_id":1,"task_id":"hello","name":"Hello","command":"echo hi"}"#;
    let task = TaskPayload::decode(json).expect("decodes");
    assert_eq!(task.project_id, 1);
    assert_eq!(task.task_id, "hello");
    assert_eq!(task.command, "echo hi");
    assert_eq!(task.timeout, 0);
}

#[test]
fn ignores_unknown_fields() {
    let json =
        br#"{"project_id":1,"task_id":"hello","name":"Hello","command":"echo hi","bogus":42}"#;
    assert!(TaskPayload::decode(json).is_ok());
}

#[test]
fn missing_required_field_is_rejected() {
    let json = br#"{"task_id":"hello","name":"Hello","command":"echo hi"}"#;
    assert!(matches!(TaskPayload::decode(json), Err(PayloadError::Unmarshal(_))));
}

#[test]
fn round_trips_through_encode_decode() {
    let task = Task {
        project_id: 1,
        task_id: "hello".into(),
        name: "Hello".into(),
        command: "echo hi".into(),
        cron: "* * * * *".into(),
        timeout: 30,
        noseize: true,
        remark: "test".into(),
    };
    let bytes = TaskPayload::encode(&task);
    let back = TaskPayload::decode(&bytes).expect("decodes");
    assert_eq!(task, back);
}
