//! Pipeline settings and environment resolution.
//!
//! Settings control mesh resolutions and a few processing constants. They
//! default to the HCP values and can be overridden from a TOML file:
//!
//! ```toml
//! high_res_mesh = 164
//! low_res_meshes = [32]
//! grayordinates_resolutions = [2]
//! registration = "FS"
//! command_timeout_secs = 7200
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};

/// Surface registration used to reach fs_LR.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum RegistrationMethod {
    /// FreeSurfer's `sphere.reg` concatenated with the fs → fs_LR deformation.
    #[default]
    #[serde(rename = "FS")]
    FreeSurfer,
    #[serde(rename = "MSMSulc")]
    MsmSulc,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub high_res_mesh: u32,
    pub low_res_meshes: Vec<u32>,
    pub grayordinates_resolutions: Vec<u32>,
    pub registration: RegistrationMethod,
    /// Inflation iterations scale for native and high-res midthickness.
    pub inflation_scale: f64,
    /// Inflation iterations scale for low-res midthickness.
    pub low_res_inflation_scale: f64,
    /// Dilation distance (mm) for native thickness and curvature.
    pub dilation_mm: u32,
    pub command_timeout_secs: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            high_res_mesh: 164,
            low_res_meshes: vec![32],
            grayordinates_resolutions: vec![2],
            registration: RegistrationMethod::FreeSurfer,
            inflation_scale: 2.5,
            low_res_inflation_scale: 0.75,
            dilation_mm: 10,
            command_timeout_secs: None,
        }
    }
}

impl Settings {
    pub fn from_toml(content: &str) -> Result<Self> {
        let settings: Settings = toml::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Read settings from a TOML file. An unreadable file is a
    /// configuration error like a malformed one.
    pub async fn load(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            Error::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_toml(&content)
    }

    pub fn validate(&self) -> Result<()> {
        if self.low_res_meshes.contains(&self.high_res_mesh) {
            return Err(Error::Config(format!(
                "low-res meshes must differ from the high-res mesh ({}k)",
                self.high_res_mesh
            )));
        }
        let mut seen = HashSet::new();
        if let Some(k) = self.low_res_meshes.iter().find(|k| !seen.insert(**k)) {
            return Err(Error::Config(format!(
                "low-res mesh {}k is listed more than once",
                k
            )));
        }
        if self.grayordinates_resolutions.is_empty() {
            return Err(Error::Config(
                "at least one grayordinates resolution is required".to_string(),
            ));
        }
        if self.inflation_scale <= 0.0 || self.low_res_inflation_scale <= 0.0 {
            return Err(Error::Config("inflation scales must be positive".to_string()));
        }
        Ok(())
    }

    pub fn command_timeout(&self) -> Option<Duration> {
        self.command_timeout_secs.map(Duration::from_secs)
    }
}

/// Root directories the pipeline works against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Environment {
    pub hcp_data: PathBuf,
    pub fs_subjects_dir: PathBuf,
    pub fsl_dir: PathBuf,
    pub templates_dir: PathBuf,
}

/// Command-line overrides for [`Environment`] values.
#[derive(Debug, Clone, Default)]
pub struct EnvironmentOverrides {
    pub hcp_data: Option<PathBuf>,
    pub fs_subjects_dir: Option<PathBuf>,
    pub fsl_dir: Option<PathBuf>,
    pub templates_dir: Option<PathBuf>,
}

impl Environment {
    pub fn resolve(overrides: EnvironmentOverrides) -> Result<Self> {
        Self::resolve_with(overrides, |key| std::env::var_os(key).map(PathBuf::from))
    }

    /// Resolve with a custom variable lookup; flags win over variables.
    pub fn resolve_with<F>(overrides: EnvironmentOverrides, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<PathBuf>,
    {
        let pick = |flag_value: Option<PathBuf>, variable: &'static str, flag: &'static str| {
            flag_value
                .or_else(|| lookup(variable))
                .filter(|p| !p.as_os_str().is_empty())
                .ok_or(Error::MissingEnvironment { variable, flag })
        };

        Ok(Self {
            hcp_data: pick(overrides.hcp_data, "HCP_DATA", "--hcp-data-dir")?,
            fs_subjects_dir: pick(
                overrides.fs_subjects_dir,
                "SUBJECTS_DIR",
                "--fs-subjects-dir",
            )?,
            fsl_dir: pick(overrides.fsl_dir, "FSLDIR", "--fsl-dir")?,
            templates_dir: pick(
                overrides.templates_dir,
                "FS2HCP_TEMPLATES",
                "--templates-dir",
            )?,
        })
    }
}
