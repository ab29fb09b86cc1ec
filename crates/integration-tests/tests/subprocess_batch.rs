//! Whole batches against a real child process (unix only)
//!
//! `sh` runs a small script that behaves like the docking program: it writes
//! `--out` unless the ligand name asks it to crash or to stay silent.
#![cfg(unix)]

use dockbatch_core::application::{BatchDispatcher, DispatcherConfig};
use dockbatch_core::domain::{ArgumentTemplate, RunFailure, RunOutcome};
use dockbatch_core::port::status_sink::mocks::RecordingStatusSink;
use dockbatch_core::port::time_provider::SystemTimeProvider;
use dockbatch_infra_system::{OutputMode, SubprocessExecutor};
use std::path::Path;
use std::sync::Arc;

const FAKE_DOCK: &str = r#"
out=""
ligand=""
while [ $# -gt 0 ]; do
  case "$1" in
    --out) out="$2"; shift 2 ;;
    --ligand) ligand="$2"; shift 2 ;;
    *) shift ;;
  esac
done
case "$ligand" in
  *crash*) echo "Parse error on line 1" >&2; exit 1 ;;
  *silent*) exit 0 ;;
  *partial*) printf 'MODEL 1\n' > "$out"; kill -9 $$ ;;
esac
printf 'MODEL 1\nREMARK VINA RESULT: -6.4\nENDMDL\n' > "$out"
"#;

fn setup(receptors: &str, ligands: &str) -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("receptor_list.txt"), receptors).unwrap();
    std::fs::write(dir.path().join("ligand_list.txt"), ligands).unwrap();
    std::fs::write(dir.path().join("fake_dock.sh"), FAKE_DOCK).unwrap();
    dir
}

fn dispatcher(dir: &Path, sink: Arc<RecordingStatusSink>) -> BatchDispatcher {
    let time_provider = Arc::new(SystemTimeProvider);
    let executor = SubprocessExecutor::new("sh", dir, time_provider.clone())
        .with_output_mode(OutputMode::Capture);
    BatchDispatcher::new(
        DispatcherConfig {
            work_dir: dir.to_path_buf(),
            ..Default::default()
        },
        Arc::new(executor),
        sink,
        time_provider,
    )
}

/// `sh fake_dock.sh <pass-through...>`: the script path rides in the template
fn template(dir: &Path, extra: &[&str]) -> ArgumentTemplate {
    let script = dir.join("fake_dock.sh").display().to_string();
    let mut argv = vec!["dockbatch".to_string(), script];
    argv.extend(extra.iter().map(|s| s.to_string()));
    ArgumentTemplate::from_argv(argv)
}

#[tokio::test]
async fn test_mixed_batch_reports_only_failures() {
    let dir = setup(
        "receptors/1abc.pdbqt\nreceptors/2xyz.pdbqt\n",
        "ok.pdbqt\ncrash.pdbqt\nsilent.pdbqt\n",
    );
    let sink = Arc::new(RecordingStatusSink::new());

    let report = dispatcher(dir.path(), sink.clone())
        .run(
            &template(dir.path(), &["--exhaustiveness", "1"]),
            &dir.path().join("receptor_list.txt"),
            &dir.path().join("ligand_list.txt"),
        )
        .await
        .unwrap();

    assert_eq!(report.total_runs(), 6);
    assert_eq!(sink.failed_indices(), vec![1, 2, 4, 5]);
    assert!(dir.path().join("0--1abc--ok.out").exists());
    assert!(dir.path().join("3--2xyz--ok.out").exists());
    assert!(matches!(
        report.runs[1].outcome,
        RunOutcome::Failure(RunFailure::TaskAbnormalTermination(_))
    ));
    assert_eq!(
        report.runs[2].outcome,
        RunOutcome::Failure(RunFailure::MissingOutputArtifact)
    );
}

#[tokio::test]
async fn test_killed_task_leaves_no_partial_output() {
    let dir = setup("r.pdbqt\n", "partial.pdbqt\nok.pdbqt\n");
    let sink = Arc::new(RecordingStatusSink::new());

    let report = dispatcher(dir.path(), sink.clone())
        .run(
            &template(dir.path(), &[]),
            &dir.path().join("receptor_list.txt"),
            &dir.path().join("ligand_list.txt"),
        )
        .await
        .unwrap();

    assert_eq!(sink.lines(), vec!["ERROR RUN: 0"]);
    assert!(!dir.path().join("0--r--partial.out").exists());
    assert!(report.runs[1].outcome.is_success());
}

#[tokio::test]
async fn test_score_only_batch_with_real_process() {
    let dir = setup("r.pdbqt\n", "silent.pdbqt\n");
    let sink = Arc::new(RecordingStatusSink::new());

    let report = dispatcher(dir.path(), sink.clone())
        .run(
            &template(dir.path(), &["--score_only"]),
            &dir.path().join("receptor_list.txt"),
            &dir.path().join("ligand_list.txt"),
        )
        .await
        .unwrap();

    assert!(!report.has_failures());
    assert!(sink.lines().is_empty());
    assert!(dir.path().join("0--r--silent.out").exists());
}

#[tokio::test]
async fn test_missing_program_fails_every_run_without_aborting() {
    let dir = setup("r0\nr1\n", "l0\n");
    let sink = Arc::new(RecordingStatusSink::new());
    let time_provider = Arc::new(SystemTimeProvider);
    let dispatcher = BatchDispatcher::new(
        DispatcherConfig {
            work_dir: dir.path().to_path_buf(),
            ..Default::default()
        },
        Arc::new(SubprocessExecutor::new(
            "/nonexistent/vina",
            dir.path(),
            time_provider.clone(),
        )),
        sink.clone(),
        time_provider,
    );

    let report = dispatcher
        .run(
            &template(dir.path(), &[]),
            &dir.path().join("receptor_list.txt"),
            &dir.path().join("ligand_list.txt"),
        )
        .await
        .unwrap();

    assert_eq!(report.total_runs(), 2);
    assert_eq!(sink.failed_indices(), vec![0, 1]);
}
