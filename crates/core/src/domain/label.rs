// Short labels for naming output artifacts

use std::path::Path;

/// Short identifying label for an input path: its file stem.
///
/// `receptors/1abc.pdbqt` becomes `1abc`. Inputs without a stem (empty
/// string, `..`) fall back to the raw input so the label is never lost.
pub fn file_label(path: &str) -> String {
    Path::new(path)
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string())
}
