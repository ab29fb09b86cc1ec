// Input Loader - reads a line-delimited list file into an InputList

use crate::domain::{InputList, ListKind};
use crate::error::{BatchError, Result};
use std::path::Path;
use tracing::info;

/// Load one list file.
///
/// Lines are taken verbatim in file order. Any failure to open or decode
/// the file is reported as `BatchError::FileNotReadable`.
pub fn load_input_list(kind: ListKind, path: &Path) -> Result<InputList> {
    let text = std::fs::read_to_string(path).map_err(|source| BatchError::FileNotReadable {
        path: path.to_path_buf(),
        source,
    })?;

    let list = InputList::from_text(kind, &text);
    info!(kind = %kind, path = %path.display(), entries = list.len(), "Loaded input list");
    Ok(list)
}
