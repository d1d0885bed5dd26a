//! Shared infrastructure utilities for the town square crates.
//!
//! - **`atomic_write`**: Crash-safe file persistence (temp + rename, `.bak`
//!   recovery)

pub mod atomic_write;

pub use atomic_write::{
    Durability, WriteOptions, atomic_write, atomic_write_with_options, backup_path,
    recover_bak_file,
};
