// Run Domain Model - one task invocation per (receptor, ligand) pair

use super::arguments::{ArgumentTemplate, LIGAND_FLAG, OUT_FLAG, RECEPTOR_FLAG, SCORE_ONLY_FLAG};
use super::label::file_label;
use serde::Serialize;
use thiserror::Error;

/// Zero-based position of a pair in receptor-major, ligand-minor order.
///
/// Pair `(R[i], L[j])` always gets index `i * len(L) + j`. Indices are
/// never reused within a batch, which keeps output names unique.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct RunIndex(u64);

impl RunIndex {
    pub const ZERO: RunIndex = RunIndex(0);

    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }

    /// The index assigned to the following pair
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl std::fmt::Display for RunIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Everything needed to invoke the task for one pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSpec {
    pub index: RunIndex,
    pub receptor: String,
    pub ligand: String,
    pub output_name: String,
    argv: Vec<String>,
}

impl RunSpec {
    /// Derive the run for a pair:
    /// program + template args + selectors + `--out {output_name}`.
    pub fn derive(
        template: &ArgumentTemplate,
        index: RunIndex,
        receptor: &str,
        ligand: &str,
        extension: &str,
    ) -> Self {
        let output_name = Self::output_name_for(index, receptor, ligand, extension);

        let mut argv = Vec::with_capacity(template.args().len() + 7);
        argv.push(template.program().to_string());
        argv.extend(template.args().iter().cloned());
        argv.push(RECEPTOR_FLAG.to_string());
        argv.push(receptor.to_string());
        argv.push(LIGAND_FLAG.to_string());
        argv.push(ligand.to_string());
        argv.push(OUT_FLAG.to_string());
        argv.push(output_name.clone());

        Self {
            index,
            receptor: receptor.to_string(),
            ligand: ligand.to_string(),
            output_name,
            argv,
        }
    }

    /// `{index}--{receptor-label}--{ligand-label}.{extension}`
    pub fn output_name_for(index: RunIndex, receptor: &str, ligand: &str, extension: &str) -> String {
        format!(
            "{}--{}--{}.{}",
            index,
            file_label(receptor),
            file_label(ligand),
            extension
        )
    }

    /// Full argv, program name first
    pub fn argv(&self) -> &[String] {
        &self.argv
    }

    pub fn program(&self) -> &str {
        &self.argv[0]
    }

    /// Arguments after the program name
    pub fn args(&self) -> &[String] {
        &self.argv[1..]
    }

    pub fn is_score_only(&self) -> bool {
        self.argv.iter().any(|arg| arg == SCORE_ONLY_FLAG)
    }
}

/// Why a run was classified as failed
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunFailure {
    /// Non-zero exit, signal, structured error or panic inside the task
    #[error("task terminated abnormally: {0}")]
    TaskAbnormalTermination(String),

    /// Task returned normally but left no readable output artifact
    #[error("expected output artifact is missing")]
    MissingOutputArtifact,

    /// Score-only placeholder could not be created
    #[error("could not write score-only placeholder: {0}")]
    PlaceholderWrite(String),
}

/// Final classification of a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "failure", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunOutcome {
    Success,
    Failure(RunFailure),
}

impl RunOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, RunOutcome::Success)
    }

    pub fn is_failure(&self) -> bool {
        !self.is_success()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template() -> ArgumentTemplate {
        ArgumentTemplate::from_argv(["vina", "--receptor", "base.pdbqt", "--cpu", "4"])
    }

    #[test]
    fn test_derive_appends_selectors_and_out() {
        let spec = RunSpec::derive(
            &template(),
            RunIndex::new(3),
            "rec/1abc.pdbqt",
            "lig/aspirin.sdf",
            "out",
        );

        assert_eq!(
            spec.argv(),
            &[
                "vina",
                "--cpu",
                "4",
                "--receptor",
                "rec/1abc.pdbqt",
                "--ligand",
                "lig/aspirin.sdf",
                "--out",
                "3--1abc--aspirin.out",
            ]
        );
        assert_eq!(spec.program(), "vina");
        assert_eq!(spec.args()[0], "--cpu");
        assert_eq!(spec.output_name, "3--1abc--aspirin.out");
    }

    #[test]
    fn test_derivation_leaves_template_untouched() {
        let template = template();
        let before = template.clone();

        let mut first = RunSpec::derive(&template, RunIndex::ZERO, "a.pdbqt", "x.sdf", "out");
        first.argv.push("--mutated".to_string());
        let second = RunSpec::derive(&template, RunIndex::new(1), "b.pdbqt", "y.sdf", "out");

        assert_eq!(template, before);
        assert!(!second.argv().iter().any(|a| a == "--mutated"));
        assert_eq!(second.argv().len(), first.argv().len() - 1);
    }

    #[test]
    fn test_output_names_differ_by_index_for_duplicate_pairs() {
        let a = RunSpec::output_name_for(RunIndex::new(0), "r.pdbqt", "l.pdbqt", "out");
        let b = RunSpec::output_name_for(RunIndex::new(1), "r.pdbqt", "l.pdbqt", "out");
        assert_ne!(a, b);
    }

    #[test]
    fn test_score_only_is_read_from_argv() {
        let scoring = ArgumentTemplate::from_argv(["vina", "--score_only"]);
        let spec = RunSpec::derive(&scoring, RunIndex::ZERO, "r", "l", "out");
        assert!(spec.is_score_only());

        let spec = RunSpec::derive(&template(), RunIndex::ZERO, "r", "l", "out");
        assert!(!spec.is_score_only());
    }

    #[test]
    fn test_run_index_sequence() {
        let index = RunIndex::ZERO.next().next();
        assert_eq!(index.value(), 2);
        assert_eq!(index.to_string(), "2");
    }

    #[test]
    fn test_outcome_serializes_with_status_tag() {
        let ok = serde_json::to_value(RunOutcome::Success).unwrap();
        assert_eq!(ok["status"], "SUCCESS");

        let failed =
            serde_json::to_value(RunOutcome::Failure(RunFailure::MissingOutputArtifact)).unwrap();
        assert_eq!(failed["status"], "FAILURE");
        assert_eq!(failed["failure"]["kind"], "MISSING_OUTPUT_ARTIFACT");

        let placeholder = serde_json::to_value(RunOutcome::Failure(RunFailure::PlaceholderWrite(
            "is a directory".into(),
        )))
        .unwrap();
        assert_eq!(placeholder["failure"]["kind"], "PLACEHOLDER_WRITE");
        assert_eq!(placeholder["failure"]["detail"], "is a directory");
    }
}
