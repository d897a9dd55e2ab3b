// Core data models for kstrigger
// These structs represent the run identity and the status ledger entries

pub mod module;
pub mod run;
pub mod status;

pub use module::*;
pub use run::*;
pub use status::*;

/// Caller-supplied parameter set (option name -> value)
pub type Params = serde_json::Map<String, serde_json::Value>;
