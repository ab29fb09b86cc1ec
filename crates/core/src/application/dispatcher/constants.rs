// Dispatcher constants (no magic values)

/// Receptor list file name, resolved against the working directory
pub const DEFAULT_RECEPTOR_LIST: &str = "receptor_list.txt";

/// Ligand list file name, resolved against the working directory
pub const DEFAULT_LIGAND_LIST: &str = "ligand_list.txt";

/// Extension of synthesized output artifacts
pub const DEFAULT_OUT_EXTENSION: &str = "out";
