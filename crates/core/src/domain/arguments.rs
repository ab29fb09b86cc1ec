// Argument Template - baseline argv shared by every run of a batch

/// Selector flag carrying the per-run receptor path
pub const RECEPTOR_FLAG: &str = "--receptor";

/// Selector flag carrying the per-run ligand path
pub const LIGAND_FLAG: &str = "--ligand";

/// Output flag, always set by the dispatcher to the synthesized artifact name
pub const OUT_FLAG: &str = "--out";

/// When present the task writes no artifact and the dispatcher marks the run itself
pub const SCORE_ONLY_FLAG: &str = "--score_only";

/// Flags whose caller-supplied values are replaced per run
const PER_RUN_FLAGS: [&str; 3] = [RECEPTOR_FLAG, LIGAND_FLAG, OUT_FLAG];

/// The driver's own argv with per-run flags removed.
///
/// Built once per batch and only read afterwards; each RunSpec copies the
/// args it needs, so no run can observe another run's arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgumentTemplate {
    program: String,
    args: Vec<String>,
}

impl ArgumentTemplate {
    /// Build the template from a full process-style argv (program name first).
    ///
    /// Every occurrence of `--receptor`, `--ligand` and `--out` is dropped
    /// together with the token that follows it. Everything else passes
    /// through verbatim, in its original order.
    pub fn from_argv<I, S>(argv: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut argv = argv.into_iter().map(Into::into);
        let program = argv.next().unwrap_or_default();

        let mut args = Vec::new();
        while let Some(arg) = argv.next() {
            if PER_RUN_FLAGS.contains(&arg.as_str()) {
                // Value slot; absent when the flag is the last token
                let _ = argv.next();
                continue;
            }
            args.push(arg);
        }

        Self { program, args }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Pass-through arguments (program name excluded)
    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn is_score_only(&self) -> bool {
        self.args.iter().any(|arg| arg == SCORE_ONLY_FLAG)
    }
}
