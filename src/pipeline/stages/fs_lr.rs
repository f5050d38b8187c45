//! Registration to fs_LR and resampling onto the standard meshes.

use async_trait::async_trait;
use std::path::PathBuf;

use crate::error::Result;
use crate::paths::naming::{metric, surface};
use crate::paths::{Hemisphere, Mesh, Space};
use crate::pipeline::context::PipelineContext;
use crate::pipeline::helpers::{self, MetricMeshes};
use crate::pipeline::stage::Stage;
use crate::tools::workbench;

/// Surfaces carried to every standard mesh.
const RESAMPLED_SURFACES: [&str; 3] = [surface::WHITE, surface::MIDTHICKNESS, surface::PIAL];

/// Metrics masked by the medial wall on the way to a standard mesh.
const MASKED_METRICS: [&str; 2] = [metric::THICKNESS, metric::CURVATURE];

/// Metrics resampled over the whole sphere.
const UNMASKED_METRICS: [&str; 2] = [metric::AREAL_DISTORTION_FS, metric::SULC];

/// Native sphere registered to fs_LR.
fn registered_sphere(ctx: &PipelineContext, hemisphere: Hemisphere) -> PathBuf {
    ctx.layout
        .surface(Space::Mni, hemisphere, surface::SPHERE_REG_LR, Mesh::Native)
}

fn native_shape(ctx: &PipelineContext, hemisphere: Hemisphere, name: &str) -> PathBuf {
    ctx.layout.shape(Space::Mni, hemisphere, name, Mesh::Native)
}

/// Copy the colin flat map for `mesh` when the atlas has one.
async fn copy_flat_map(ctx: &PipelineContext, hemisphere: Hemisphere, mesh_k: u32) -> Result<()> {
    let template = ctx.templates.flat_map(hemisphere, mesh_k);
    if !template.is_file() {
        return Ok(());
    }
    let mesh = Mesh::Standard(mesh_k);
    let flat = ctx.layout.surface(Space::Mni, hemisphere, surface::FLAT, mesh);
    ctx.copy(&template, &flat).await?;
    ctx.add_to_spec(
        &ctx.layout.spec_file(Space::Mni, mesh),
        hemisphere.structure(),
        &flat,
    )
    .await
}

/// Resample the native labels of `hemisphere` onto `new_sphere`'s mesh.
async fn resample_labels(
    ctx: &PipelineContext,
    hemisphere: Hemisphere,
    new_sphere: &std::path::Path,
    mesh: Mesh,
) -> Result<()> {
    let current_sphere = registered_sphere(ctx, hemisphere);
    for annot in ctx.available_annotations(hemisphere) {
        ctx.run(workbench::label_resample(
            &ctx.layout.label(Space::Mni, hemisphere, annot, Mesh::Native),
            &current_sphere,
            new_sphere,
            &ctx.layout.label(Space::Mni, hemisphere, annot, mesh),
        ))
        .await?;
    }
    Ok(())
}

/// Metric resampling from native onto `mesh`, masked with `new_roi`.
async fn resample_metrics(
    ctx: &PipelineContext,
    hemisphere: Hemisphere,
    meshes: MetricMeshes<'_>,
    mesh: Mesh,
    new_roi: &std::path::Path,
) -> Result<()> {
    let native_roi = native_shape(ctx, hemisphere, metric::ROI);
    for name in MASKED_METRICS {
        helpers::resample_and_mask_metric(
            &ctx.runner,
            &native_shape(ctx, hemisphere, name),
            &ctx.layout.shape(Space::Mni, hemisphere, name, mesh),
            meshes,
            Some(native_roi.as_path()),
            Some(new_roi),
        )
        .await?;
    }
    for name in UNMASKED_METRICS {
        helpers::resample_and_mask_metric(
            &ctx.runner,
            &native_shape(ctx, hemisphere, name),
            &ctx.layout.shape(Space::Mni, hemisphere, name, mesh),
            meshes,
            None,
            None,
        )
        .await?;
    }
    Ok(())
}

/// FreeSurfer to fs_LR registration and the native medial wall ROI.
pub struct RegisterFsLr(pub Hemisphere);

#[async_trait]
impl Stage for RegisterFsLr {
    fn name(&self) -> String {
        format!("register-fs-lr-{}", self.0)
    }

    fn inputs(&self, ctx: &PipelineContext) -> Vec<PathBuf> {
        let k = ctx.settings.high_res_mesh;
        vec![
            ctx.templates.standard_sphere(self.0, k),
            ctx.templates.fsaverage_sphere(self.0, k),
            ctx.templates.fs_to_fs_lr_sphere(self.0, k),
            ctx.templates.high_res_atlas_roi(self.0, k),
            ctx.layout
                .surface(Space::Mni, self.0, surface::SPHERE_REG, Mesh::Native),
            native_shape(ctx, self.0, metric::ROI),
        ]
    }

    fn outputs(&self, ctx: &PipelineContext) -> Vec<PathBuf> {
        vec![
            ctx.layout
                .surface(Space::Mni, self.0, surface::SPHERE, ctx.high_res_mesh()),
            registered_sphere(ctx, self.0),
            native_shape(ctx, self.0, metric::AREAL_DISTORTION_FS),
            native_shape(ctx, self.0, metric::ATLAS_ROI),
        ]
    }

    async fn run(&self, ctx: &PipelineContext) -> Result<()> {
        let hemisphere = self.0;
        let structure = hemisphere.structure();
        let high_k = ctx.settings.high_res_mesh;
        let high_res = ctx.high_res_mesh();
        let high_sphere = ctx
            .layout
            .surface(Space::Mni, hemisphere, surface::SPHERE, high_res);
        let reg_sphere = registered_sphere(ctx, hemisphere);

        ctx.copy(&ctx.templates.standard_sphere(hemisphere, high_k), &high_sphere)
            .await?;
        ctx.add_to_spec(
            &ctx.layout.spec_file(Space::Mni, high_res),
            structure,
            &high_sphere,
        )
        .await?;
        copy_flat_map(ctx, hemisphere, high_k).await?;

        // sphere.reg followed by the fsaverage to fs_LR deformation
        ctx.run(workbench::surface_sphere_project_unproject(
            &ctx.layout
                .surface(Space::Mni, hemisphere, surface::SPHERE_REG, Mesh::Native),
            &ctx.templates.fsaverage_sphere(hemisphere, high_k),
            &ctx.templates.fs_to_fs_lr_sphere(hemisphere, high_k),
            &reg_sphere,
        ))
        .await?;

        helpers::calc_areal_distortion(
            &ctx.runner,
            &ctx.layout
                .surface(Space::Mni, hemisphere, surface::SPHERE, Mesh::Native),
            &reg_sphere,
            &native_shape(ctx, hemisphere, metric::AREAL_DISTORTION_FS),
            &format!("{}_{}", ctx.layout.subject(), hemisphere),
            "FS",
        )
        .await?;

        let atlas_roi = native_shape(ctx, hemisphere, metric::ATLAS_ROI);
        let roi = native_shape(ctx, hemisphere, metric::ROI);
        ctx.run(workbench::metric_resample_largest(
            &ctx.templates.high_res_atlas_roi(hemisphere, high_k),
            &high_sphere,
            &reg_sphere,
            &atlas_roi,
        ))
        .await?;
        ctx.run(workbench::metric_math(
            "((atlas + individual) > 0)",
            &roi,
            &[("atlas", atlas_roi.as_path()), ("individual", roi.as_path())],
        ))
        .await?;

        for name in MASKED_METRICS {
            let map = native_shape(ctx, hemisphere, name);
            ctx.run(workbench::metric_mask(&map, &roi, &map)).await?;
        }
        Ok(())
    }
}

/// Populate the high-res fs_LR mesh.
pub struct ResampleHighRes(pub Hemisphere);

#[async_trait]
impl Stage for ResampleHighRes {
    fn name(&self) -> String {
        format!("resample-high-res-{}", self.0)
    }

    fn inputs(&self, ctx: &PipelineContext) -> Vec<PathBuf> {
        vec![
            registered_sphere(ctx, self.0),
            ctx.layout
                .surface(Space::Mni, self.0, surface::SPHERE, ctx.high_res_mesh()),
            ctx.templates
                .high_res_atlas_roi(self.0, ctx.settings.high_res_mesh),
        ]
    }

    fn outputs(&self, ctx: &PipelineContext) -> Vec<PathBuf> {
        let mesh = ctx.high_res_mesh();
        let mut outputs: Vec<PathBuf> = RESAMPLED_SURFACES
            .iter()
            .chain(&[surface::INFLATED, surface::VERY_INFLATED])
            .map(|name| ctx.layout.surface(Space::Mni, self.0, name, mesh))
            .collect();
        outputs.extend(
            MASKED_METRICS
                .iter()
                .chain(&UNMASKED_METRICS)
                .chain(&[metric::ATLAS_ROI])
                .map(|name| ctx.layout.shape(Space::Mni, self.0, name, mesh)),
        );
        outputs
    }

    async fn run(&self, ctx: &PipelineContext) -> Result<()> {
        let hemisphere = self.0;
        let structure = hemisphere.structure();
        let mesh = ctx.high_res_mesh();
        let spec = ctx.layout.spec_file(Space::Mni, mesh);
        let reg_sphere = registered_sphere(ctx, hemisphere);
        let high_sphere = ctx.layout.surface(Space::Mni, hemisphere, surface::SPHERE, mesh);

        for name in RESAMPLED_SURFACES {
            helpers::resample_surface_to_spec(
                &ctx.runner,
                &ctx.layout.surface(Space::Mni, hemisphere, name, Mesh::Native),
                &ctx.layout.surface(Space::Mni, hemisphere, name, mesh),
                &reg_sphere,
                &high_sphere,
                &spec,
                structure,
            )
            .await?;
        }

        let native_mid =
            ctx.layout
                .surface(Space::Mni, hemisphere, surface::MIDTHICKNESS, Mesh::Native);
        let high_mid = ctx
            .layout
            .surface(Space::Mni, hemisphere, surface::MIDTHICKNESS, mesh);
        helpers::make_inflated_surfaces(
            &ctx.runner,
            &high_mid,
            &spec,
            structure,
            ctx.settings.inflation_scale,
        )
        .await?;

        let atlas_roi = ctx.layout.shape(Space::Mni, hemisphere, metric::ATLAS_ROI, mesh);
        ctx.copy(
            &ctx.templates
                .high_res_atlas_roi(hemisphere, ctx.settings.high_res_mesh),
            &atlas_roi,
        )
        .await?;

        let meshes = MetricMeshes {
            current_sphere: &reg_sphere,
            new_sphere: &high_sphere,
            current_midthickness: &native_mid,
            new_midthickness: &high_mid,
        };
        resample_metrics(ctx, hemisphere, meshes, mesh, &atlas_roi).await?;
        resample_labels(ctx, hemisphere, &high_sphere, mesh).await
    }
}

/// Populate each low-res fs_LR mesh in MNI space, then its T1w-space
/// counterpart.
pub struct ResampleLowRes(pub Hemisphere);

#[async_trait]
impl Stage for ResampleLowRes {
    fn name(&self) -> String {
        format!("resample-low-res-{}", self.0)
    }

    fn inputs(&self, ctx: &PipelineContext) -> Vec<PathBuf> {
        let mut inputs = vec![registered_sphere(ctx, self.0)];
        for &k in &ctx.settings.low_res_meshes {
            inputs.push(ctx.templates.low_res_sphere(self.0, k));
            inputs.push(ctx.templates.low_res_atlas_roi(self.0, k));
        }
        inputs
    }

    fn outputs(&self, ctx: &PipelineContext) -> Vec<PathBuf> {
        let mut outputs = Vec::new();
        for mesh in ctx.low_res_meshes() {
            for space in [Space::Mni, Space::T1w] {
                outputs.extend(
                    RESAMPLED_SURFACES
                        .iter()
                        .chain(&[surface::INFLATED, surface::VERY_INFLATED])
                        .map(|name| ctx.layout.surface(space, self.0, name, mesh)),
                );
            }
            outputs.extend(
                MASKED_METRICS
                    .iter()
                    .chain(&UNMASKED_METRICS)
                    .chain(&[metric::ATLAS_ROI])
                    .map(|name| ctx.layout.shape(Space::Mni, self.0, name, mesh)),
            );
        }
        outputs
    }

    async fn run(&self, ctx: &PipelineContext) -> Result<()> {
        let hemisphere = self.0;
        let structure = hemisphere.structure();
        let reg_sphere = registered_sphere(ctx, hemisphere);
        let scale = ctx.settings.low_res_inflation_scale;

        for &k in &ctx.settings.low_res_meshes {
            let mesh = Mesh::Standard(k);
            let spec = ctx.layout.spec_file(Space::Mni, mesh);
            let sphere = ctx.layout.surface(Space::Mni, hemisphere, surface::SPHERE, mesh);
            let atlas_roi = ctx.layout.shape(Space::Mni, hemisphere, metric::ATLAS_ROI, mesh);

            ctx.copy(&ctx.templates.low_res_sphere(hemisphere, k), &sphere)
                .await?;
            ctx.add_to_spec(&spec, structure, &sphere).await?;
            ctx.copy(&ctx.templates.low_res_atlas_roi(hemisphere, k), &atlas_roi)
                .await?;
            copy_flat_map(ctx, hemisphere, k).await?;

            for name in RESAMPLED_SURFACES {
                helpers::resample_surface_to_spec(
                    &ctx.runner,
                    &ctx.layout.surface(Space::Mni, hemisphere, name, Mesh::Native),
                    &ctx.layout.surface(Space::Mni, hemisphere, name, mesh),
                    &reg_sphere,
                    &sphere,
                    &spec,
                    structure,
                )
                .await?;
            }

            let native_mid =
                ctx.layout
                    .surface(Space::Mni, hemisphere, surface::MIDTHICKNESS, Mesh::Native);
            let low_mid = ctx
                .layout
                .surface(Space::Mni, hemisphere, surface::MIDTHICKNESS, mesh);
            helpers::make_inflated_surfaces(&ctx.runner, &low_mid, &spec, structure, scale)
                .await?;

            let meshes = MetricMeshes {
                current_sphere: &reg_sphere,
                new_sphere: &sphere,
                current_midthickness: &native_mid,
                new_midthickness: &low_mid,
            };
            resample_metrics(ctx, hemisphere, meshes, mesh, &atlas_roi).await?;
            resample_labels(ctx, hemisphere, &sphere, mesh).await?;

            let t1w_spec = ctx.layout.spec_file(Space::T1w, mesh);
            for name in RESAMPLED_SURFACES {
                helpers::resample_surface_to_spec(
                    &ctx.runner,
                    &ctx.layout.surface(Space::T1w, hemisphere, name, Mesh::Native),
                    &ctx.layout.surface(Space::T1w, hemisphere, name, mesh),
                    &reg_sphere,
                    &sphere,
                    &t1w_spec,
                    structure,
                )
                .await?;
            }
            helpers::make_inflated_surfaces(
                &ctx.runner,
                &ctx.layout
                    .surface(Space::T1w, hemisphere, surface::MIDTHICKNESS, mesh),
                &t1w_spec,
                structure,
                scale,
            )
            .await?;
        }
        Ok(())
    }
}
