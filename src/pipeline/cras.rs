//! Surface-to-volume offset from the FreeSurfer volume header.
//!
//! FreeSurfer surfaces are stored relative to the volume's c_ras centre.
//! `mri_info` reports that centre on the `c_r`, `c_a` and `c_s` entries of
//! its `xform info` block; the pipeline turns them into a translation-only
//! affine that moves surfaces into scanner space.

use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::subprocess::CommandRunner;
use crate::tools::freesurfer;

static CRAS_FIELD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\bc_([ras])\s*=\s*([-+]?(?:\d+\.?\d*|\.\d+)(?:[eE][-+]?\d+)?)")
        .expect("Invalid regex pattern")
});

/// c_ras offsets, kept as the tokens printed by `mri_info`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrasOffset {
    pub r: String,
    pub a: String,
    pub s: String,
}

impl CrasOffset {
    /// Scan header text line by line; a later line overrides an earlier one.
    pub fn parse(header: &str) -> Result<Self> {
        let (mut r, mut a, mut s) = (None, None, None);
        for line in header.lines() {
            for caps in CRAS_FIELD.captures_iter(line) {
                let value = caps[2].to_string();
                match &caps[1] {
                    "r" => r = Some(value),
                    "a" => a = Some(value),
                    _ => s = Some(value),
                }
            }
        }

        Ok(Self {
            r: r.ok_or(Error::HeaderField { field: "c_r" })?,
            a: a.ok_or(Error::HeaderField { field: "c_a" })?,
            s: s.ok_or(Error::HeaderField { field: "c_s" })?,
        })
    }

    /// Four-row translation matrix in the text form `wb_command` reads.
    pub fn to_matrix(&self) -> String {
        format!(
            "1 0 0 {}\n0 1 0 {}\n0 0 1 {}\n0 0 0 1\n",
            self.r, self.a, self.s
        )
    }
}

/// Read the header of `volume` and write its c_ras matrix to `output`.
///
/// In dry-run mode nothing is read or written and `output` is returned as
/// planned.
pub async fn write_cras_matrix(
    runner: &CommandRunner,
    volume: &Path,
    output: &Path,
) -> Result<PathBuf> {
    let Some(header) = runner.capture(freesurfer::mri_info(volume)).await? else {
        info!("Dry run: c_ras matrix would be written to {}", output.display());
        return Ok(output.to_path_buf());
    };

    let offset = CrasOffset::parse(&header)?;
    debug!("c_ras offset: {:?}", offset);
    tokio::fs::write(output, offset.to_matrix()).await?;
    Ok(output.to_path_buf())
}
