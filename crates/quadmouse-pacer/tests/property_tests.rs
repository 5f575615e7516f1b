//! Property-based tests for the pacer crate.

use proptest::prelude::*;
use quadmouse_pacer::mock::MockOutputBank;
use quadmouse_pacer::{
    Axis, Direction, PacingSchedule, PendingSteps, Phase, QuadratureChannel, ScalingConfig,
    WAVEFORM, scale_delta,
};
use quickcheck_macros::quickcheck;

#[quickcheck]
fn scaling_is_odd(delta: i32) -> bool {
    let delta = delta.max(-i32::MAX);
    scale_delta(-delta) == -scale_delta(delta)
}

#[quickcheck]
fn schedule_burst_is_monotonic(a: u32, b: u32) -> bool {
    let schedule = PacingSchedule::default();
    let (low, high) = if a <= b { (a, b) } else { (b, a) };
    schedule.select(low).burst <= schedule.select(high).burst
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn prop_scaled_delta_keeps_sign_and_bound(delta in any::<i32>()) {
        let scaled = scale_delta(delta);
        prop_assert!(scaled.unsigned_abs() <= ScalingConfig::DEFAULT.max_event_steps);
        prop_assert_eq!(scaled.signum(), delta.signum());
        prop_assert!(scaled.unsigned_abs() >= delta.unsigned_abs().min(50));
    }

    #[test]
    fn prop_random_walk_is_gray_coded(
        start in 0i32..4,
        steps in prop::collection::vec(any::<bool>(), 1..1000),
    ) {
        let mut bank = MockOutputBank::new();
        let mut channel = QuadratureChannel::new(Axis::X);
        for _ in 0..start {
            prop_assert!(channel.advance(Direction::Forward, &mut bank).is_ok());
        }
        prop_assert_eq!(channel.phase(), Phase::new(start));
        let mut expected = start;

        for forward in steps {
            let direction = if forward { Direction::Forward } else { Direction::Reverse };
            let before = channel.pattern();
            prop_assert!(channel.advance(direction, &mut bank).is_ok());
            let after = channel.pattern();

            let changed = usize::from(before.0 != after.0) + usize::from(before.1 != after.1);
            prop_assert_eq!(changed, 1);

            expected += direction.delta();
            prop_assert!(channel.phase().index() < 4);
            prop_assert_eq!(channel.phase(), Phase::new(expected));
            prop_assert_eq!(after, WAVEFORM[channel.phase().index()]);
        }
    }

    #[test]
    fn prop_pending_stays_bounded(deltas in prop::collection::vec(-2_000i32..2_000, 0..64)) {
        let mut pending = PendingSteps::new(300);
        for delta in deltas {
            pending.accumulate(scale_delta(delta));
            prop_assert!(pending.count().abs() <= 300);
        }
    }

    #[test]
    fn prop_draining_reduces_magnitude_exactly(start in -300i32..=300, n in 0u32..400) {
        let mut pending = PendingSteps::new(300);
        pending.accumulate(start);
        let before = pending.magnitude();

        let taken = (0..n).filter_map(|_| pending.take_step()).count() as u32;
        prop_assert_eq!(taken, n.min(before));
        prop_assert_eq!(pending.magnitude(), before - taken);
        prop_assert!(pending.count().signum() * start.signum() >= 0);
    }
}
