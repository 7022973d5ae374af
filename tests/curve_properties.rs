// tests/curve_properties.rs
//
// Randomized sweeps over the two shared curves (seeded, so reruns are stable).

use rand::{rngs::StdRng, Rng, SeedableRng};
use speed_scoring::{speed_modifier, work_bonus};

const SAMPLES: usize = 2_000;

fn band(rng: &mut StdRng) -> (f64, f64) {
    let lower = rng.random_range(0.001..5.0);
    let upper = lower + rng.random_range(0.001..5.0);
    (lower, upper)
}

#[test]
fn flat_at_or_below_lower() {
    let mut rng = StdRng::seed_from_u64(11);
    for _ in 0..SAMPLES {
        let (lower, upper) = band(&mut rng);
        let x = rng.random_range(0.0..=lower);
        assert_eq!(speed_modifier(x, lower, upper), 1.0, "x={x} lower={lower}");
    }
}

#[test]
fn zero_at_or_above_upper() {
    let mut rng = StdRng::seed_from_u64(12);
    for _ in 0..SAMPLES {
        let (lower, upper) = band(&mut rng);
        let x = upper + rng.random_range(0.0..100.0);
        assert_eq!(speed_modifier(x, lower, upper), 0.0, "x={x} upper={upper}");
    }
}

#[test]
fn quadratic_in_normalized_overshoot() {
    let mut rng = StdRng::seed_from_u64(13);
    for _ in 0..SAMPLES {
        let (lower, upper) = band(&mut rng);
        let t: f64 = rng.random_range(0.0..=1.0);
        let got = speed_modifier(lower + t * (upper - lower), lower, upper);
        assert!((got - (1.0 - t * t)).abs() < 1e-9, "t={t} got={got}");
    }
}

#[test]
fn non_increasing_and_bounded() {
    let mut rng = StdRng::seed_from_u64(14);
    for _ in 0..200 {
        let (lower, upper) = band(&mut rng);
        let mut prev = f64::INFINITY;
        let step = (upper - lower) / 50.0;
        for i in 0..=60 {
            let v = speed_modifier(lower + step * i as f64, lower, upper);
            assert!((0.0..=1.0).contains(&v));
            assert!(v <= prev);
            prev = v;
        }
    }
}

#[test]
fn work_bonus_strictly_increasing_in_units() {
    let mut rng = StdRng::seed_from_u64(15);
    for _ in 0..200 {
        let overhead = rng.random_range(0.0..25.0);
        let lb = rng.random_range(0.001..2.0);
        let mut prev = work_bonus(0, overhead, lb);
        assert!((prev - overhead.powf(0.8)).abs() < 1e-12);
        for units in 1..100u64 {
            let v = work_bonus(units, overhead, lb);
            assert!(v > prev, "units={units} overhead={overhead} lb={lb}");
            prev = v;
        }
    }
}
