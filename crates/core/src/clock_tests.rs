// SPDX-License-Identifier: MIT

use super::*;

#[test]
fn fake_clock_advances_both_axes() {
    let clock = FakeClock::new();
    let t0 = clock.now();
    let s0 = clock.unix_seconds();
    clock.advance(Duration::from_secs(30));
    assert!(clock.now() > t0);
    assert_eq!(clock.unix_seconds(), s0 + 30);
}

#[test]
fn set_unix_seconds_overrides_directly() {
    let clock = FakeClock::new();
    clock.set_unix_seconds(42);
    assert_eq!(clock.unix_seconds(), 42);
}
