// Input List Domain Model

use serde::Serialize;

/// Which of the two batch inputs a list holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ListKind {
    Receptor,
    Ligand,
}

impl std::fmt::Display for ListKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ListKind::Receptor => write!(f, "receptor"),
            ListKind::Ligand => write!(f, "ligand"),
        }
    }
}

/// Ordered, immutable sequence of input identifiers (one per line of a list file)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputList {
    kind: ListKind,
    entries: Vec<String>,
}

impl InputList {
    pub fn new(kind: ListKind, entries: Vec<String>) -> Self {
        Self { kind, entries }
    }

    /// Split list text into entries, one per line.
    ///
    /// Lines are kept verbatim (no trimming, empty lines included). A final
    /// newline terminates the last entry instead of opening an empty one.
    pub fn from_text(kind: ListKind, text: &str) -> Self {
        let entries = text.split_terminator('\n').map(str::to_string).collect();
        Self::new(kind, entries)
    }

    pub fn kind(&self) -> ListKind {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.entries.iter()
    }
}

impl<'a> IntoIterator for &'a InputList {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
