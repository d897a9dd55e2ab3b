// Input JSON construction for the CatGT and module stages

pub mod args;
pub mod document;
pub mod hash;
pub mod params;

pub use args::{accepts, InputArgs};
pub use document::{build_document, write_input_json};
pub use hash::config_hash;
pub use params::{namespace_ks_params, param_f64, python_repr};
