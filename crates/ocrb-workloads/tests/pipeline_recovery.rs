//! ---
//! ocrb_section: "07-resilience-workloads"
//! ocrb_subsection: "integration-tests"
//! ocrb_type: "source"
//! ocrb_scope: "code"
//! ocrb_description: "Restart, checkpoint, and grace behaviour of the stateful pipeline."
//! ocrb_version: "v0.0.0-prealpha"
//! ocrb_owner: "tbd"
//! ---
use std::collections::BTreeSet;
use std::fs;
use std::sync::Arc;
use std::time::Duration;

use ocrb_common::PipelineConfig;
use ocrb_persistence::{CheckpointStore, PersistenceError};
use ocrb_workloads::{
    AlwaysAvailable, CrashAtStages, FaultCause, IsolationSwitch, ModuloCrashSchedule, NoCrashes,
    PipelineError, PipelineMetrics, ScriptedDependency, StatefulPipeline,
};
use prometheus::Registry;
use tempfile::tempdir;

fn config(stages: u32, checkpoint_every: u32, max_restarts: u32) -> PipelineConfig {
    PipelineConfig {
        stages,
        checkpoint_every,
        max_restarts,
        ..PipelineConfig::default()
    }
    .with_stage_work(Duration::ZERO)
}

#[test]
fn crash_at_stage_seven_resumes_at_checkpoint_five() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let mut executed = Vec::new();
    let mut crashed = false;
    let result = {
        let predicate = |_seed: u64, stage: u32| {
            executed.push(stage);
            if stage == 7 && !crashed {
                crashed = true;
                return true;
            }
            false
        };
        let mut pipeline =
            StatefulPipeline::new(dir.path(), config(10, 5, 10), predicate, AlwaysAvailable);
        pipeline.run(42)?
    };

    assert!(!result.failed);
    assert_eq!(result.restarts, 1);
    assert_eq!(result.stages_completed, 10);
    // The attempt after the crash re-enters at stage 5, not stage 0.
    assert_eq!(executed, vec![0, 1, 2, 3, 4, 5, 6, 7, 5, 6, 7, 8, 9]);
    assert_eq!(result.recovered_faults().count(), 1);
    Ok(())
}

#[test]
fn persistent_crash_exhausts_restarts_and_reports_completed_stages() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let mut pipeline = StatefulPipeline::new(
        dir.path(),
        config(10, 5, 3),
        CrashAtStages::new([7]),
        AlwaysAvailable,
    );
    let result = pipeline.run(0)?;

    assert!(result.failed);
    assert_eq!(result.restarts, 3);
    assert_eq!(result.stages_completed, 7);
    assert_ne!(result.stages_completed, result.stages_total);
    assert_eq!(result.faults.len(), 4);
    assert!(result
        .recovered_faults()
        .all(|record| record.resumed_at == Some(5)));
    let terminal = result.terminal_fault().expect("terminal fault");
    assert_eq!(terminal.fault.cause, FaultCause::SimulatedCrash);
    assert_eq!(pipeline.checkpoint().load_next_stage()?, 5);
    Ok(())
}

#[test]
fn corrupt_checkpoint_at_start_is_an_error() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let store = CheckpointStore::for_run_dir(dir.path());
    fs::write(store.path(), "{\"next_stage\":")?;

    let mut pipeline =
        StatefulPipeline::new(dir.path(), config(10, 5, 3), NoCrashes, AlwaysAvailable);
    let err = pipeline.run(0).unwrap_err();
    assert!(matches!(
        err,
        PipelineError::Checkpoint(PersistenceError::CorruptCheckpoint { .. })
    ));
    Ok(())
}

#[test]
fn checkpoint_corrupted_before_restart_is_an_error() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let store = CheckpointStore::for_run_dir(dir.path());
    let corrupting = {
        let store = store.clone();
        move |_seed: u64, stage: u32| {
            if stage == 6 {
                // The crash takes the checkpoint down with it.
                let _ = fs::write(store.path(), b"\x00\x01garbage");
                return true;
            }
            false
        }
    };
    let mut pipeline =
        StatefulPipeline::new(dir.path(), config(10, 5, 3), corrupting, AlwaysAvailable);
    assert!(matches!(
        pipeline.run(0),
        Err(PipelineError::Checkpoint(PersistenceError::CorruptCheckpoint { .. }))
    ));
    Ok(())
}

#[test]
fn warm_start_resumes_from_existing_checkpoint() -> anyhow::Result<()> {
    let dir = tempdir()?;
    CheckpointStore::for_run_dir(dir.path()).save(8)?;

    let mut first_stage = None;
    let result = {
        let predicate = |_seed: u64, stage: u32| {
            if first_stage.is_none() {
                first_stage = Some(stage);
            }
            false
        };
        let mut pipeline =
            StatefulPipeline::new(dir.path(), config(10, 5, 3), predicate, AlwaysAvailable);
        pipeline.run(0)?
    };
    assert_eq!(first_stage, Some(8));
    assert!(!result.failed);
    assert_eq!(result.stages_completed, 10);
    Ok(())
}

#[test]
fn external_failures_within_grace_do_not_restart() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let cfg = PipelineConfig {
        external_grace_failures: 3,
        ..config(10, 5, 3)
    };
    let mut pipeline = StatefulPipeline::new(
        dir.path(),
        cfg,
        NoCrashes,
        ScriptedDependency::unavailable_for(3),
    );
    let result = pipeline.run(0)?;
    assert!(!result.failed);
    assert_eq!(result.restarts, 0);
    Ok(())
}

#[test]
fn exceeding_external_grace_restarts_and_the_counter_survives_restarts() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let cfg = PipelineConfig {
        external_grace_failures: 2,
        ..config(10, 5, 5)
    };
    let mut pipeline = StatefulPipeline::new(
        dir.path(),
        cfg,
        NoCrashes,
        ScriptedDependency::unavailable_for(5),
    );
    let result = pipeline.run(0)?;

    // Failures 1-2 are tolerated, 3 escalates; after each restart the streak
    // continues (4, 5) and escalates again until the dependency answers.
    assert!(!result.failed);
    assert_eq!(result.restarts, 3);
    let consecutive: Vec<u32> = result
        .faults
        .iter()
        .map(|record| match record.fault.cause {
            FaultCause::ExternalUnavailable {
                consecutive_failures,
            } => consecutive_failures,
            ref other => panic!("unexpected cause {other}"),
        })
        .collect();
    assert_eq!(consecutive, vec![3, 4, 5]);
    assert_eq!(pipeline.dependency().calls(), 5 + 10);
    Ok(())
}

#[test]
fn isolation_for_the_whole_run_exhausts_restarts() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let switch = IsolationSwitch::new();
    switch.isolate();
    let cfg = PipelineConfig {
        external_grace_failures: 10,
        ..config(50, 5, 10)
    };
    let mut pipeline = StatefulPipeline::new(dir.path(), cfg, NoCrashes, switch.clone());
    let result = pipeline.run(0)?;

    assert!(result.failed);
    assert_eq!(result.restarts, 10);
    // Ten tolerated failures let stages 0..=9 complete before the first escalation.
    assert_eq!(result.stages_completed, 10);
    assert!(switch.is_isolated());
    Ok(())
}

#[test]
fn checkpoint_reads_only_observe_written_values() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let store = CheckpointStore::for_run_dir(dir.path());
    let mut observed = BTreeSet::new();
    {
        let reader = store.clone();
        let predicate = |_seed: u64, _stage: u32| {
            observed.insert(reader.load_next_stage().expect("checkpoint readable"));
            false
        };
        let mut pipeline =
            StatefulPipeline::new(dir.path(), config(23, 5, 0), predicate, AlwaysAvailable);
        pipeline.run(0)?;
    }
    assert_eq!(observed, BTreeSet::from([0, 5, 10, 15, 20]));
    assert_eq!(store.load_next_stage()?, 23);
    Ok(())
}

#[test]
fn metrics_count_restarts_by_cause() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let registry = Arc::new(Registry::new());
    let metrics = PipelineMetrics::new(registry.clone())?;
    let schedule = ModuloCrashSchedule::new(10);
    // seed 40: 40 % 37 = 3, 40 % 53 = 40 -> stages {3, 0}
    assert_eq!(schedule.crash_stages(40), BTreeSet::from([0, 3]));

    let mut pipeline =
        StatefulPipeline::new(dir.path(), config(10, 5, 2), schedule, AlwaysAvailable)
            .with_ids("run-01", "W2-A")
            .with_metrics(metrics);
    let result = pipeline.run(40)?;
    assert!(result.failed);
    assert_eq!(result.restarts, 2);
    assert_eq!(result.stages_completed, 0);

    let restarts = registry
        .gather()
        .into_iter()
        .find(|family| family.get_name() == "ocrb_pipeline_restarts_total")
        .expect("restart family registered");
    let total: f64 = restarts
        .get_metric()
        .iter()
        .map(|metric| metric.get_counter().get_value())
        .sum();
    assert_eq!(total, 2.0);
    Ok(())
}
