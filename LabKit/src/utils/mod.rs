//! Utility modules

pub mod filesys;

pub use filesys::{
    create_path, ensure_read_complete, entry_output_path, file_extension, list_files_in_path,
    load_file, query_file_size,
};
