//! # fs2hcp
//!
//! Converts a FreeSurfer `recon-all` subject into an HCP-style directory:
//! volumes in T1w and MNI space, GIFTI surfaces and metrics on the native
//! and fs_LR meshes, and CIFTI dense maps, all listed in Workbench spec
//! files.
//!
//! ## Usage
//!
//! ```bash
//! fs2hcp [--dry-run] [--resume] [--config settings.toml] <SUBJECT>
//! ```
//!
//! ## Modules
//!
//! - `app` - Logging setup and fatal error reporting
//! - `cli` - Command-line arguments and the conversion entry point
//! - `paths` - Output layout, naming conventions and template locations
//! - `pipeline` - The ordered conversion stages, resume checkpoint and helpers
//! - `settings` - Mesh resolutions, processing constants and root directories
//! - `subprocess` - External process execution with dry-run and a mock runner
//! - `tools` - Command builders for FreeSurfer, FSL and Connectome Workbench

pub mod app;
pub mod cli;
pub mod error;
pub mod paths;
pub mod pipeline;
pub mod settings;
pub mod subprocess;
pub mod tools;

pub use error::{Error, Result};
