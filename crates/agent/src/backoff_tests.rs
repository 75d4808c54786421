// SPDX-License-Identifier: MIT

use super::*;

#[test]
fn first_delay_never_exceeds_the_initial_bound() {
    let mut backoff = Backoff::new();
    let delay = backoff.next_delay();
    assert!(delay <= INITIAL_DELAY);
}

#[test]
fn delay_is_capped_after_many_attempts() {
    let mut backoff = Backoff::new();
    for _ in 0..20 {
        let delay = backoff.next_delay();
        assert!(delay <= MAX_DELAY);
    }
}

#[test]
fn reset_returns_to_the_initial_bound() {
    let mut backoff = Backoff::new();
    for _ in 0..10 {
        backoff.next_delay();
    }
    backoff.reset();
    assert!(backoff.next_delay() <= INITIAL_DELAY);
}
