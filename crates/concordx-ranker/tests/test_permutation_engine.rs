//! Retry and failure behaviour of the permutation worker pool.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use concordx_common::{ConcordError, Observation};
use concordx_config::{PermutationConfig, RunConfig};
use concordx_ranker::permutation::DrawSeeds;
use concordx_ranker::pipeline::run_concordance_with;
use concordx_ranker::{DrawTask, PermutationEngine, ShuffleDraw};
use concordx_test_utils::example_tables;

fn observations(n: usize) -> (Vec<Observation>, Vec<Observation>) {
    let comp1 = (0..n).map(|i| Observation::new(1.0 + i as f64, 0.01)).collect();
    let comp2 = (0..n).map(|i| Observation::new(2.0 - i as f64, 0.2)).collect();
    (comp1, comp2)
}

fn config(max_attempts: u32) -> PermutationConfig {
    PermutationConfig {
        workers: 4,
        max_attempts,
        ..PermutationConfig::default()
    }
}

/// Fails the first attempt of every even draw, then behaves like `ShuffleDraw`.
#[derive(Default)]
struct FlakyDraw {
    failed: Mutex<HashSet<usize>>,
    calls: AtomicUsize,
}

impl DrawTask for FlakyDraw {
    fn run(&self, draw: usize, seeds: DrawSeeds, c1: &[Observation], c2: &[Observation]) -> anyhow::Result<Vec<f64>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if draw % 2 == 0 && self.failed.lock().unwrap().insert(draw) {
            anyhow::bail!("transient failure in draw {draw}");
        }
        ShuffleDraw.run(draw, seeds, c1, c2)
    }
}

/// Always fails one specific draw.
struct BrokenDraw {
    draw: usize,
}

impl DrawTask for BrokenDraw {
    fn run(&self, draw: usize, seeds: DrawSeeds, c1: &[Observation], c2: &[Observation]) -> anyhow::Result<Vec<f64>> {
        if draw == self.draw {
            anyhow::bail!("worker lost");
        }
        ShuffleDraw.run(draw, seeds, c1, c2)
    }
}

/// Panics on its first call for draw 3.
#[derive(Default)]
struct PanickyDraw {
    panicked: AtomicUsize,
}

impl DrawTask for PanickyDraw {
    fn run(&self, draw: usize, seeds: DrawSeeds, c1: &[Observation], c2: &[Observation]) -> anyhow::Result<Vec<f64>> {
        if draw == 3 && self.panicked.fetch_add(1, Ordering::SeqCst) == 0 {
            panic!("simulated worker crash");
        }
        ShuffleDraw.run(draw, seeds, c1, c2)
    }
}

/// Returns too few scores.
struct ShortDraw;

impl DrawTask for ShortDraw {
    fn run(&self, _draw: usize, _seeds: DrawSeeds, c1: &[Observation], _c2: &[Observation]) -> anyhow::Result<Vec<f64>> {
        Ok(vec![0.0; c1.len().saturating_sub(1)])
    }
}

#[test]
fn test_transient_failures_are_retried() {
    let (c1, c2) = observations(4);
    let engine = PermutationEngine::with_task(FlakyDraw::default(), &config(2)).unwrap();
    let null = engine.run(&c1, &c2).unwrap();

    let reference = PermutationEngine::from_config(&config(1)).unwrap().run(&c1, &c2).unwrap();
    assert_eq!(null, reference);
    assert_eq!(null.draws(), 16);
}

#[test]
fn test_exhausted_retries_fail_the_run() {
    let (c1, c2) = observations(4);
    let engine = PermutationEngine::with_task(BrokenDraw { draw: 5 }, &config(3)).unwrap();

    match engine.run(&c1, &c2) {
        Err(ConcordError::PermutationWorkerFailure { draw, attempts, reason }) => {
            assert_eq!(draw, 5);
            assert_eq!(attempts, 3);
            assert!(reason.contains("worker lost"), "reason: {reason}");
        }
        other => panic!("expected PermutationWorkerFailure, got {other:?}"),
    }
}

#[test]
fn test_panicking_draw_is_retried() {
    let (c1, c2) = observations(3);
    let engine = PermutationEngine::with_task(PanickyDraw::default(), &config(2)).unwrap();
    let null = engine.run(&c1, &c2).unwrap();
    assert_eq!(null.draws(), 9);
}

#[test]
fn test_wrong_length_draw_is_a_failure() {
    let (c1, c2) = observations(3);
    let engine = PermutationEngine::with_task(ShortDraw, &config(1)).unwrap();
    let err = engine.run(&c1, &c2).unwrap_err();
    assert!(matches!(err, ConcordError::PermutationWorkerFailure { .. }));
}

#[test]
fn test_pipeline_surfaces_worker_failure_without_output() {
    let (comp1, comp2) = example_tables();
    let engine = PermutationEngine::with_task(BrokenDraw { draw: 0 }, &config(2)).unwrap();
    let result = run_concordance_with(&engine, comp1, comp2, &RunConfig::default(), &HashSet::new());
    assert!(matches!(result, Err(ConcordError::PermutationWorkerFailure { draw: 0, .. })));
}

#[test]
fn test_zero_attempts_rejected() {
    assert!(PermutationEngine::with_task(ShuffleDraw, &config(0)).is_err());
}
