//! Driver configuration, read from `DOCKBATCH_*` environment variables

use anyhow::{bail, Context, Result};
use dockbatch_core::application::dispatcher::constants::{
    DEFAULT_LIGAND_LIST, DEFAULT_OUT_EXTENSION, DEFAULT_RECEPTOR_LIST,
};
use dockbatch_core::application::DispatcherConfig;
use std::path::{Path, PathBuf};

pub const ENV_TASK: &str = "DOCKBATCH_TASK";
pub const ENV_WORKDIR: &str = "DOCKBATCH_WORKDIR";
pub const ENV_RECEPTOR_LIST: &str = "DOCKBATCH_RECEPTOR_LIST";
pub const ENV_LIGAND_LIST: &str = "DOCKBATCH_LIGAND_LIST";
pub const ENV_OUT_EXTENSION: &str = "DOCKBATCH_OUT_EXTENSION";
pub const ENV_STRICT_EXIT: &str = "DOCKBATCH_STRICT_EXIT";
pub const ENV_REPORT_PATH: &str = "DOCKBATCH_REPORT_PATH";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverConfig {
    /// External docking program run once per pair
    pub task_program: PathBuf,
    pub work_dir: PathBuf,
    pub receptor_list: PathBuf,
    pub ligand_list: PathBuf,
    pub out_extension: String,
    /// Exit nonzero when any run failed (off: always exit 0 after dispatch)
    pub strict_exit: bool,
    pub report_path: Option<PathBuf>,
}

impl DriverConfig {
    pub fn from_env() -> Result<Self> {
        let cwd = std::env::current_dir().context("Cannot determine current directory")?;
        Self::from_lookup(|key| std::env::var(key).ok(), &cwd)
    }

    /// Build from any key lookup; relative paths resolve against `cwd`.
    pub fn from_lookup<F>(lookup: F, cwd: &Path) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let Some(task) = lookup(ENV_TASK).filter(|v| !v.is_empty()) else {
            bail!("{} must name the docking program (e.g. vina, smina)", ENV_TASK);
        };
        let task_program = PathBuf::from(shellexpand::tilde(&task).into_owned());

        let work_dir = match lookup(ENV_WORKDIR) {
            Some(dir) => cwd.join(shellexpand::tilde(&dir).into_owned()),
            None => cwd.to_path_buf(),
        };

        let receptor_list = work_dir.join(
            lookup(ENV_RECEPTOR_LIST).unwrap_or_else(|| DEFAULT_RECEPTOR_LIST.to_string()),
        );
        let ligand_list = work_dir
            .join(lookup(ENV_LIGAND_LIST).unwrap_or_else(|| DEFAULT_LIGAND_LIST.to_string()));

        let out_extension = lookup(ENV_OUT_EXTENSION)
            .map(|ext| ext.trim_start_matches('.').to_string())
            .filter(|ext| !ext.is_empty())
            .unwrap_or_else(|| DEFAULT_OUT_EXTENSION.to_string());

        let strict_exit = match lookup(ENV_STRICT_EXIT) {
            Some(value) => parse_flag(ENV_STRICT_EXIT, &value)?,
            None => false,
        };

        let report_path = lookup(ENV_REPORT_PATH)
            .filter(|v| !v.is_empty())
            .map(|path| cwd.join(shellexpand::tilde(&path).into_owned()));

        Ok(Self {
            task_program,
            work_dir,
            receptor_list,
            ligand_list,
            out_extension,
            strict_exit,
            report_path,
        })
    }

    pub fn dispatcher_config(&self) -> DispatcherConfig {
        DispatcherConfig {
            work_dir: self.work_dir.clone(),
            out_extension: self.out_extension.clone(),
        }
    }
}

fn parse_flag(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "" | "0" | "false" | "no" | "off" => Ok(false),
        other => bail!("{} has invalid boolean value '{}'", key, other),
    }
}
