//! CLI argument structures

use clap::Parser;
use std::path::PathBuf;

use crate::app::AppConfig;
use crate::settings::EnvironmentOverrides;

/// Convert a FreeSurfer recon-all subject into an HCP-style directory
#[derive(Parser, Debug)]
#[command(name = "fs2hcp")]
#[command(
    about = "fs2hcp - Convert a FreeSurfer subject into HCP volumes, surfaces and CIFTI files",
    long_about = None
)]
#[command(version)]
pub struct Cli {
    /// Subject identifier under the FreeSurfer subjects directory
    pub subject: String,

    /// HCP output root (overrides HCP_DATA)
    #[arg(long, value_name = "PATH")]
    pub hcp_data_dir: Option<PathBuf>,

    /// FreeSurfer subjects directory (overrides SUBJECTS_DIR)
    #[arg(long, value_name = "PATH")]
    pub fs_subjects_dir: Option<PathBuf>,

    /// FSL installation (overrides FSLDIR)
    #[arg(long, value_name = "PATH")]
    pub fsl_dir: Option<PathBuf>,

    /// HCP template directory (overrides FS2HCP_TEMPLATES)
    #[arg(long, value_name = "PATH")]
    pub templates_dir: Option<PathBuf>,

    /// TOML settings file
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Skip stages completed by an earlier run
    #[arg(long)]
    pub resume: bool,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Enable trace logging
    #[arg(long)]
    pub debug: bool,

    /// Log commands without running them
    #[arg(short = 'n', long)]
    pub dry_run: bool,
}

impl Cli {
    pub fn app_config(&self) -> AppConfig {
        AppConfig::new(self.verbose, self.debug)
    }

    pub fn environment_overrides(&self) -> EnvironmentOverrides {
        EnvironmentOverrides {
            hcp_data: self.hcp_data_dir.clone(),
            fs_subjects_dir: self.fs_subjects_dir.clone(),
            fsl_dir: self.fsl_dir.clone(),
            templates_dir: self.templates_dir.clone(),
        }
    }
}
