use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::error::Result;
use crate::paths::{Hemisphere, Mesh, SubjectLayout, TemplatePaths};
use crate::settings::Settings;
use crate::subprocess::{CommandRunner, ProcessCommand};

use super::helpers;

/// Everything a stage needs: the runner, the path planners and the settings.
///
/// Owns a scratch directory for intermediates that never reach the subject
/// tree; it is removed when the context drops.
pub struct PipelineContext {
    pub runner: CommandRunner,
    pub layout: SubjectLayout,
    pub templates: TemplatePaths,
    pub settings: Settings,
    scratch: TempDir,
}

impl PipelineContext {
    pub fn new(
        runner: CommandRunner,
        layout: SubjectLayout,
        templates: TemplatePaths,
        settings: Settings,
    ) -> Result<Self> {
        let scratch = tempfile::Builder::new().prefix("fs2hcp").tempdir()?;
        Ok(Self {
            runner,
            layout,
            templates,
            settings,
            scratch,
        })
    }

    pub fn dry_run(&self) -> bool {
        self.runner.is_dry_run()
    }

    /// Run a command, failing on non-zero exit.
    pub async fn run(&self, command: ProcessCommand) -> Result<()> {
        self.runner.run_checked(command).await?;
        Ok(())
    }

    pub async fn add_to_spec(&self, spec: &Path, structure: &str, artifact: &Path) -> Result<()> {
        helpers::add_to_spec(&self.runner, spec, structure, artifact).await
    }

    pub async fn copy(&self, from: &Path, to: &Path) -> Result<()> {
        helpers::copy_file(&self.runner, from, to).await
    }

    pub fn scratch_path(&self, name: &str) -> PathBuf {
        self.scratch.path().join(name)
    }

    /// Translation from FreeSurfer surface coordinates to scanner space.
    pub fn cras_matrix(&self) -> PathBuf {
        self.scratch_path("c_ras.mat")
    }

    pub fn high_res_mesh(&self) -> Mesh {
        self.layout.high_res_mesh()
    }

    pub fn low_res_meshes(&self) -> impl Iterator<Item = Mesh> + '_ {
        self.settings.low_res_meshes.iter().map(|&k| Mesh::Standard(k))
    }

    /// Every mesh dense maps are built on: native, high-res, then low-res.
    pub fn all_meshes(&self) -> Vec<Mesh> {
        let mut meshes = vec![Mesh::Native, self.high_res_mesh()];
        meshes.extend(self.low_res_meshes());
        meshes
    }

    /// FreeSurfer segmentations present in the recon-all output.
    pub fn available_segmentations(&self) -> Vec<&'static str> {
        crate::paths::SEGMENTATIONS
            .into_iter()
            .filter(|name| self.layout.fs_volume(name).is_file())
            .collect()
    }

    /// Annotations present for `hemisphere`.
    pub fn available_annotations(&self, hemisphere: Hemisphere) -> Vec<&'static str> {
        crate::paths::ANNOTATIONS
            .into_iter()
            .filter(|annot| self.layout.fs_annotation(hemisphere, annot).is_file())
            .collect()
    }

    /// Annotations present for both hemispheres, the ones that become
    /// dense label files.
    pub fn bilateral_annotations(&self) -> Vec<&'static str> {
        let right = self.available_annotations(Hemisphere::Right);
        self.available_annotations(Hemisphere::Left)
            .into_iter()
            .filter(|annot| right.contains(annot))
            .collect()
    }
}
