// SPDX-License-Identifier: MIT

use super::*;

#[test]
fn ids_carry_a_type_prefix() {
    let run = RunId::new();
    assert!(run.as_str().starts_with("run-"));
    let tmp = TmpId::new();
    assert!(tmp.as_str().starts_with("tmp-"));
}

#[test]
fn from_string_roundtrips() {
    let run = RunId::from_string("run-abc123");
    assert_eq!(run.as_str(), "run-abc123");
    assert_eq!(run, RunId::from("run-abc123".to_string()));
}

#[test]
fn short_truncates_without_panicking_on_short_input() {
    assert_eq!(short("hello", 3), "hel");
    assert_eq!(short("hi", 10), "hi");
}
