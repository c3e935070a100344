//! ---
//! ocrb_section: "07-resilience-workloads"
//! ocrb_subsection: "module"
//! ocrb_type: "source"
//! ocrb_scope: "code"
//! ocrb_description: "Stressed reference workloads and their fault hooks."
//! ocrb_version: "v0.0.0-prealpha"
//! ocrb_owner: "tbd"
//! ---
//! Deterministic crash injection.

use std::collections::BTreeSet;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Decides whether the pipeline crashes before executing `stage`.
///
/// Implementations must be deterministic in `(seed, stage)` plus whatever
/// state they keep themselves, so a run can be replayed exactly.
pub trait CrashPredicate {
    fn should_crash(&mut self, seed: u64, stage: u32) -> bool;
}

impl<F> CrashPredicate for F
where
    F: FnMut(u64, u32) -> bool,
{
    fn should_crash(&mut self, seed: u64, stage: u32) -> bool {
        self(seed, stage)
    }
}

/// Never crashes.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCrashes;

impl CrashPredicate for NoCrashes {
    fn should_crash(&mut self, _seed: u64, _stage: u32) -> bool {
        false
    }
}

/// Crashes at two seed-derived stages: `(seed % 37) % stages` and `(seed % 53) % stages`.
#[derive(Debug, Clone, Copy)]
pub struct ModuloCrashSchedule {
    stages: u32,
}

impl ModuloCrashSchedule {
    pub fn new(stages: u32) -> Self {
        Self {
            stages: stages.max(1),
        }
    }

    pub fn crash_stages(&self, seed: u64) -> BTreeSet<u32> {
        let stages = u64::from(self.stages);
        [37u64, 53]
            .into_iter()
            .map(|modulus| ((seed % modulus) % stages) as u32)
            .collect()
    }
}

impl CrashPredicate for ModuloCrashSchedule {
    fn should_crash(&mut self, seed: u64, stage: u32) -> bool {
        self.crash_stages(seed).contains(&stage)
    }
}

/// Crashes at a fixed set of stages regardless of seed.
#[derive(Debug, Clone, Default)]
pub struct CrashAtStages(BTreeSet<u32>);

impl CrashAtStages {
    pub fn new(stages: impl IntoIterator<Item = u32>) -> Self {
        Self(stages.into_iter().collect())
    }
}

impl CrashPredicate for CrashAtStages {
    fn should_crash(&mut self, _seed: u64, stage: u32) -> bool {
        self.0.contains(&stage)
    }
}

/// Independent per-`(seed, stage)` crash draw with a fixed probability.
#[derive(Debug, Clone, Copy)]
pub struct SeededCrashSchedule {
    probability: f64,
}

impl SeededCrashSchedule {
    /// `probability` is clamped to `[0, 1]`; non-finite values disable crashes.
    pub fn new(probability: f64) -> Self {
        let probability = if probability.is_finite() {
            probability.clamp(0.0, 1.0)
        } else {
            0.0
        };
        Self { probability }
    }

    pub fn probability(&self) -> f64 {
        self.probability
    }
}

impl CrashPredicate for SeededCrashSchedule {
    fn should_crash(&mut self, seed: u64, stage: u32) -> bool {
        let key = seed.wrapping_mul(0x9E37_79B9_7F4A_7C15) ^ u64::from(stage);
        StdRng::seed_from_u64(key).gen_bool(self.probability)
    }
}

/// Lets the wrapped predicate fire at most once per stage.
///
/// The crash point stays deterministic but transient: once the pipeline has
/// restarted past a crash, the same stage succeeds on the next attempt.
#[derive(Debug, Clone)]
pub struct CrashOnce<P> {
    inner: P,
    fired: BTreeSet<u32>,
}

impl<P: CrashPredicate> CrashOnce<P> {
    pub fn new(inner: P) -> Self {
        Self {
            inner,
            fired: BTreeSet::new(),
        }
    }

    /// Stages at which a crash has been injected so far.
    pub fn fired(&self) -> &BTreeSet<u32> {
        &self.fired
    }
}

impl<P: CrashPredicate> CrashPredicate for CrashOnce<P> {
    fn should_crash(&mut self, seed: u64, stage: u32) -> bool {
        if self.fired.contains(&stage) {
            return false;
        }
        let crash = self.inner.should_crash(seed, stage);
        if crash {
            self.fired.insert(stage);
        }
        crash
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modulo_schedule_matches_reference_stages() {
        let schedule = ModuloCrashSchedule::new(50);
        // 1000 % 37 = 1, 1000 % 53 = 46
        assert_eq!(schedule.crash_stages(1000), BTreeSet::from([1, 46]));
        let mut predicate = schedule;
        assert!(predicate.should_crash(1000, 46));
        assert!(!predicate.should_crash(1000, 2));
    }

    #[test]
    fn seeded_schedule_is_replayable() {
        let mut a = SeededCrashSchedule::new(0.3);
        let mut b = SeededCrashSchedule::new(0.3);
        let first: Vec<bool> = (0..40).map(|stage| a.should_crash(7, stage)).collect();
        let second: Vec<bool> = (0..40).map(|stage| b.should_crash(7, stage)).collect();
        assert_eq!(first, second);

        assert!((0..40).all(|stage| !SeededCrashSchedule::new(f64::NAN).should_crash(7, stage)));
        assert!((0..40).all(|stage| SeededCrashSchedule::new(4.0).should_crash(7, stage)));
    }

    #[test]
    fn crash_once_fires_a_single_time_per_stage() {
        let mut predicate = CrashOnce::new(CrashAtStages::new([3, 5]));
        assert!(predicate.should_crash(0, 3));
        assert!(!predicate.should_crash(0, 3));
        assert!(predicate.should_crash(0, 5));
        assert_eq!(predicate.fired(), &BTreeSet::from([3, 5]));
    }

    #[test]
    fn closures_are_predicates() {
        let mut predicate = |seed: u64, stage: u32| seed == 1 && stage == 2;
        assert!(CrashPredicate::should_crash(&mut predicate, 1, 2));
        assert!(!NoCrashes.should_crash(1, 2));
    }
}
