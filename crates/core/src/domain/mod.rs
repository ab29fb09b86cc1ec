// Domain Layer - Pure batch model: lists, argument derivation, runs

pub mod arguments;
pub mod input_list;
pub mod label;
pub mod run;

// Re-exports
pub use arguments::{ArgumentTemplate, LIGAND_FLAG, OUT_FLAG, RECEPTOR_FLAG, SCORE_ONLY_FLAG};
pub use input_list::{InputList, ListKind};
pub use label::file_label;
pub use run::{RunFailure, RunIndex, RunOutcome, RunSpec};
