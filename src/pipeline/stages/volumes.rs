//! Volume stages: T1w conversion, segmentations, brain mask and the
//! subcortical grayordinate ROIs.

use async_trait::async_trait;
use std::path::PathBuf;
use tracing::info;

use crate::error::Result;
use crate::paths::{Mesh, Space};
use crate::pipeline::context::PipelineContext;
use crate::pipeline::cras;
use crate::pipeline::stage::Stage;
use crate::tools::fsl::{self, ApplyWarp, Interpolation};
use crate::tools::workbench::{self, LabelImport, STRUCTURE_INVALID};
use crate::tools::freesurfer;

const T1W: &str = "T1w";
const T1W_BRAIN: &str = "T1w_brain";
const BRAIN_MASK: &str = "brainmask_fs";

/// Create the output directory tree.
pub struct Scaffold;

#[async_trait]
impl Stage for Scaffold {
    fn name(&self) -> String {
        "scaffold".to_string()
    }

    fn outputs(&self, ctx: &PipelineContext) -> Vec<PathBuf> {
        ctx.layout.directories(&ctx.settings.low_res_meshes)
    }

    async fn run(&self, ctx: &PipelineContext) -> Result<()> {
        for dir in ctx.layout.directories(&ctx.settings.low_res_meshes) {
            info!("Creating {}", dir.display());
            if !ctx.dry_run() {
                tokio::fs::create_dir_all(&dir).await?;
            }
        }
        Ok(())
    }
}

pub struct ConvertT1w;

#[async_trait]
impl Stage for ConvertT1w {
    fn name(&self) -> String {
        "convert-t1w".to_string()
    }

    fn inputs(&self, ctx: &PipelineContext) -> Vec<PathBuf> {
        vec![ctx.layout.fs_volume("T1")]
    }

    fn outputs(&self, ctx: &PipelineContext) -> Vec<PathBuf> {
        vec![ctx.layout.volume(Space::T1w, T1W)]
    }

    async fn run(&self, ctx: &PipelineContext) -> Result<()> {
        let t1w = ctx.layout.volume(Space::T1w, T1W);
        ctx.run(freesurfer::mri_convert(&ctx.layout.fs_volume("T1"), &t1w))
            .await?;
        ctx.run(fsl::reorient_to_std(&t1w, &t1w)).await
    }
}

/// Bring the FreeSurfer segmentations into T1w space with their label tables.
pub struct ImportSegmentations;

#[async_trait]
impl Stage for ImportSegmentations {
    fn name(&self) -> String {
        "import-segmentations".to_string()
    }

    fn inputs(&self, ctx: &PipelineContext) -> Vec<PathBuf> {
        vec![
            ctx.layout.volume(Space::T1w, T1W),
            ctx.templates.freesurfer_labels(),
        ]
    }

    fn outputs(&self, ctx: &PipelineContext) -> Vec<PathBuf> {
        ctx.available_segmentations()
            .into_iter()
            .map(|seg| ctx.layout.volume(Space::T1w, seg))
            .collect()
    }

    async fn run(&self, ctx: &PipelineContext) -> Result<()> {
        let t1w = ctx.layout.volume(Space::T1w, T1W);
        let labels = ctx.templates.freesurfer_labels();
        for seg in ctx.available_segmentations() {
            let output = ctx.layout.volume(Space::T1w, seg);
            ctx.run(freesurfer::mri_convert_labels(
                &ctx.layout.fs_volume(seg),
                &t1w,
                &output,
            ))
            .await?;
            ctx.run(workbench::volume_label_import(
                &output,
                &labels,
                &output,
                LabelImport::DropUnused,
            ))
            .await?;
        }
        Ok(())
    }
}

/// Brain mask from the dilated and eroded wmparc, applied to T1w.
pub struct BrainMask;

#[async_trait]
impl Stage for BrainMask {
    fn name(&self) -> String {
        "brain-mask".to_string()
    }

    fn inputs(&self, ctx: &PipelineContext) -> Vec<PathBuf> {
        vec![
            ctx.layout.volume(Space::T1w, "wmparc"),
            ctx.layout.volume(Space::T1w, T1W),
        ]
    }

    fn outputs(&self, ctx: &PipelineContext) -> Vec<PathBuf> {
        vec![
            ctx.layout.volume(Space::T1w, BRAIN_MASK),
            ctx.layout.volume(Space::T1w, T1W_BRAIN),
        ]
    }

    async fn run(&self, ctx: &PipelineContext) -> Result<()> {
        let wmparc = ctx.layout.volume(Space::T1w, "wmparc");
        let mask = ctx.layout.volume(Space::T1w, BRAIN_MASK);

        ctx.run(fsl::fslmaths(
            &wmparc,
            &["-bin", "-dilD", "-dilD", "-dilD", "-ero", "-ero"],
            &mask,
        ))
        .await?;
        ctx.run(workbench::volume_fill_holes(&mask, &mask)).await?;
        ctx.run(fsl::fslmaths(&mask, &["-bin"], &mask)).await?;
        ctx.run(fsl::apply_mask(
            &ctx.layout.volume(Space::T1w, T1W),
            &mask,
            &ctx.layout.volume(Space::T1w, T1W_BRAIN),
        ))
        .await
    }
}

/// Warp T1w and the label volumes into MNI space.
pub struct WarpVolumes;

#[async_trait]
impl Stage for WarpVolumes {
    fn name(&self) -> String {
        "warp-volumes".to_string()
    }

    fn inputs(&self, ctx: &PipelineContext) -> Vec<PathBuf> {
        vec![
            ctx.layout.volume(Space::T1w, T1W),
            ctx.layout.volume(Space::T1w, BRAIN_MASK),
            ctx.layout.linear_transform(),
            ctx.layout.nonlinear_warp(),
        ]
    }

    fn outputs(&self, ctx: &PipelineContext) -> Vec<PathBuf> {
        let mut outputs = vec![
            ctx.layout.volume(Space::Mni, T1W),
            ctx.layout.volume(Space::Mni, BRAIN_MASK),
        ];
        outputs.extend(
            ctx.available_segmentations()
                .into_iter()
                .map(|seg| ctx.layout.volume(Space::Mni, seg)),
        );
        outputs
    }

    async fn run(&self, ctx: &PipelineContext) -> Result<()> {
        let linear = ctx.layout.linear_transform();
        let warp = ctx.layout.nonlinear_warp();
        let reference = ctx.templates.mni_2mm();
        let t1w_mni = ctx.layout.volume(Space::Mni, T1W);

        ctx.run(
            ApplyWarp::resample(
                &ctx.layout.volume(Space::T1w, T1W),
                &reference,
                &t1w_mni,
                Interpolation::Trilinear,
            )
            .through(&linear, &warp)
            .command(),
        )
        .await?;

        let labels = ctx.templates.freesurfer_labels();
        let mut volumes = ctx.available_segmentations();
        volumes.push(BRAIN_MASK);
        for name in volumes {
            let output = ctx.layout.volume(Space::Mni, name);
            ctx.run(
                ApplyWarp::resample(
                    &ctx.layout.volume(Space::T1w, name),
                    &t1w_mni,
                    &output,
                    Interpolation::Nearest,
                )
                .through(&linear, &warp)
                .command(),
            )
            .await?;
            ctx.run(workbench::volume_label_import(
                &output,
                &labels,
                &output,
                LabelImport::DropUnused,
            ))
            .await?;
        }
        Ok(())
    }
}

/// Seed every spec file with its space's T1w volume.
pub struct InitSpecFiles;

impl InitSpecFiles {
    fn entries(ctx: &PipelineContext) -> Vec<(PathBuf, PathBuf)> {
        let t1w = ctx.layout.volume(Space::T1w, T1W);
        let t1w_mni = ctx.layout.volume(Space::Mni, T1W);
        let mut entries = vec![
            (ctx.layout.spec_file(Space::T1w, Mesh::Native), t1w.clone()),
            (ctx.layout.spec_file(Space::Mni, Mesh::Native), t1w_mni.clone()),
            (ctx.layout.spec_file(Space::Mni, ctx.high_res_mesh()), t1w_mni.clone()),
        ];
        for mesh in ctx.low_res_meshes() {
            entries.push((ctx.layout.spec_file(Space::Mni, mesh), t1w_mni.clone()));
            entries.push((ctx.layout.spec_file(Space::T1w, mesh), t1w.clone()));
        }
        entries
    }
}

#[async_trait]
impl Stage for InitSpecFiles {
    fn name(&self) -> String {
        "init-spec-files".to_string()
    }

    fn inputs(&self, ctx: &PipelineContext) -> Vec<PathBuf> {
        vec![
            ctx.layout.volume(Space::T1w, T1W),
            ctx.layout.volume(Space::Mni, T1W),
        ]
    }

    fn outputs(&self, ctx: &PipelineContext) -> Vec<PathBuf> {
        Self::entries(ctx).into_iter().map(|(spec, _)| spec).collect()
    }

    async fn run(&self, ctx: &PipelineContext) -> Result<()> {
        for (spec, volume) in Self::entries(ctx) {
            ctx.add_to_spec(&spec, STRUCTURE_INVALID, &volume).await?;
        }
        Ok(())
    }
}

/// Subcortical ROIs and T1w at each grayordinate resolution.
pub struct SubcorticalRois;

#[async_trait]
impl Stage for SubcorticalRois {
    fn name(&self) -> String {
        "subcortical-rois".to_string()
    }

    fn inputs(&self, ctx: &PipelineContext) -> Vec<PathBuf> {
        let mut inputs = vec![
            ctx.layout.volume(Space::Mni, "wmparc"),
            ctx.layout.volume(Space::Mni, T1W),
            ctx.templates.average_wmparc(),
            ctx.templates.freesurfer_labels(),
            ctx.templates.subcortical_labels(),
        ];
        inputs.extend(
            ctx.settings
                .grayordinates_resolutions
                .iter()
                .map(|&res| ctx.templates.atlas_rois(res)),
        );
        inputs
    }

    fn outputs(&self, ctx: &PipelineContext) -> Vec<PathBuf> {
        ctx.settings
            .grayordinates_resolutions
            .iter()
            .flat_map(|&res| {
                [
                    ctx.layout.roi_volume("Atlas_ROIs", res),
                    ctx.layout.roi_volume("ROIs", res),
                    ctx.layout.volume(Space::Mni, &format!("{}.{}", T1W, res)),
                ]
            })
            .collect()
    }

    async fn run(&self, ctx: &PipelineContext) -> Result<()> {
        let labels = ctx.templates.freesurfer_labels();
        for &res in &ctx.settings.grayordinates_resolutions {
            let atlas_rois = ctx.layout.roi_volume("Atlas_ROIs", res);
            let wmparc_rois = ctx.layout.roi_volume("wmparc", res);
            let atlas_wmparc = ctx.layout.roi_volume("Atlas_wmparc", res);

            ctx.copy(&ctx.templates.atlas_rois(res), &atlas_rois).await?;

            for (input, output) in [
                (ctx.layout.volume(Space::Mni, "wmparc"), &wmparc_rois),
                (ctx.templates.average_wmparc(), &atlas_wmparc),
            ] {
                ctx.run(
                    ApplyWarp::resample(&input, &atlas_rois, output, Interpolation::Nearest)
                        .command(),
                )
                .await?;
                ctx.run(workbench::volume_label_import(
                    output,
                    &labels,
                    output,
                    LabelImport::DropUnused,
                ))
                .await?;
            }

            ctx.run(workbench::volume_label_import(
                &wmparc_rois,
                &ctx.templates.subcortical_labels(),
                &ctx.layout.roi_volume("ROIs", res),
                LabelImport::DiscardOthers,
            ))
            .await?;
            ctx.run(
                ApplyWarp::resample(
                    &ctx.layout.volume(Space::Mni, T1W),
                    &atlas_rois,
                    &ctx.layout.volume(Space::Mni, &format!("{}.{}", T1W, res)),
                    Interpolation::Spline,
                )
                .command(),
            )
            .await?;
        }
        Ok(())
    }
}

/// Write the c_ras translation for the surface stages.
pub struct CrasOffset;

#[async_trait]
impl Stage for CrasOffset {
    fn name(&self) -> String {
        "cras-offset".to_string()
    }

    fn inputs(&self, ctx: &PipelineContext) -> Vec<PathBuf> {
        vec![ctx.layout.fs_volume("brain.finalsurfs")]
    }

    fn outputs(&self, ctx: &PipelineContext) -> Vec<PathBuf> {
        vec![ctx.cras_matrix()]
    }

    async fn run(&self, ctx: &PipelineContext) -> Result<()> {
        cras::write_cras_matrix(
            &ctx.runner,
            &ctx.layout.fs_volume("brain.finalsurfs"),
            &ctx.cras_matrix(),
        )
        .await?;
        Ok(())
    }
}
