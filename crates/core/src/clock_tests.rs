// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn fake_clock_advances_both_views() {
    let clock = FakeClock::new();
    let start = clock.now();
    let start_ms = clock.epoch_ms();

    clock.advance(Duration::from_secs(90));

    assert_eq!(clock.now() - start, Duration::from_secs(90));
    assert_eq!(clock.epoch_ms() - start_ms, 90_000);
}

#[test]
fn fake_clock_clones_share_time() {
    let clock = FakeClock::new();
    let other = clock.clone();

    clock.advance(Duration::from_millis(250));

    assert_eq!(clock.now(), other.now());
    assert_eq!(clock.epoch_ms(), other.epoch_ms());
}

#[test]
fn set_epoch_ms_leaves_monotonic_time_alone() {
    let clock = FakeClock::new();
    let before = clock.now();
    clock.set_epoch_ms(5_000);
    assert_eq!(clock.epoch_ms(), 5_000);
    assert_eq!(clock.now(), before);
}

#[test]
fn system_clock_epoch_is_recent() {
    // 2020-01-01 in epoch ms
    assert!(SystemClock.epoch_ms() > 1_577_836_800_000);
}
