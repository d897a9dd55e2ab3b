// SpikeGLX recording layout: filenames, data files, metadata

pub mod filename;
pub mod files;
pub mod meta;

pub use filename::parse_meta_filename;
pub use files::{catgt_output_dir, find_meta_file, parse_input_filename, parse_trigger_range, raw_data_files};
pub use meta::SpikeGlxMeta;
