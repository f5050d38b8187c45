//! Native-mesh processing of one hemisphere.

use async_trait::async_trait;
use std::path::PathBuf;

use crate::error::Result;
use crate::paths::naming::{metric, surface};
use crate::paths::{Hemisphere, Mesh, Space};
use crate::pipeline::context::PipelineContext;
use crate::pipeline::helpers;
use crate::pipeline::stage::Stage;
use crate::tools::freesurfer;
use crate::tools::workbench::{self, Palette, SurfaceType};

/// Convert white and pial, move them into scanner space and then into MNI.
pub struct NativeSurfaces(pub Hemisphere);

impl NativeSurfaces {
    const SURFACES: [(&'static str, &'static str); 2] =
        [(surface::WHITE, "GRAY_WHITE"), (surface::PIAL, "PIAL")];
}

#[async_trait]
impl Stage for NativeSurfaces {
    fn name(&self) -> String {
        format!("native-surfaces-{}", self.0)
    }

    fn inputs(&self, ctx: &PipelineContext) -> Vec<PathBuf> {
        let mut inputs: Vec<PathBuf> = Self::SURFACES
            .iter()
            .map(|(name, _)| ctx.layout.fs_surf(self.0, name))
            .collect();
        inputs.extend([
            ctx.cras_matrix(),
            ctx.layout.volume(Space::T1w, "T1w"),
            ctx.layout.linear_transform(),
            ctx.layout.nonlinear_warp(),
            ctx.layout.inverse_nonlinear_warp(),
        ]);
        inputs
    }

    fn outputs(&self, ctx: &PipelineContext) -> Vec<PathBuf> {
        Self::SURFACES
            .iter()
            .flat_map(|(name, _)| {
                [Space::T1w, Space::Mni]
                    .map(|space| ctx.layout.surface(space, self.0, name, Mesh::Native))
            })
            .collect()
    }

    async fn run(&self, ctx: &PipelineContext) -> Result<()> {
        let hemisphere = self.0;
        let structure = hemisphere.structure();
        let t1w_spec = ctx.layout.spec_file(Space::T1w, Mesh::Native);
        let mni_spec = ctx.layout.spec_file(Space::Mni, Mesh::Native);

        for (name, secondary) in Self::SURFACES {
            let native = ctx.layout.surface(Space::T1w, hemisphere, name, Mesh::Native);
            let mni = ctx.layout.surface(Space::Mni, hemisphere, name, Mesh::Native);

            ctx.run(freesurfer::mris_convert(
                &ctx.layout.fs_surf(hemisphere, name),
                &native,
            ))
            .await?;
            ctx.run(workbench::set_surface_structure(
                &native,
                structure,
                SurfaceType::Anatomical(Some(secondary)),
            ))
            .await?;
            ctx.run(workbench::surface_apply_affine(
                &native,
                &ctx.cras_matrix(),
                &native,
            ))
            .await?;
            ctx.add_to_spec(&t1w_spec, structure, &native).await?;

            ctx.run(workbench::surface_apply_flirt_affine(
                &native,
                &ctx.layout.linear_transform(),
                &mni,
                &ctx.layout.volume(Space::T1w, "T1w"),
                &ctx.templates.mni_2mm(),
            ))
            .await?;
            ctx.run(workbench::surface_apply_warpfield(
                &mni,
                &ctx.layout.inverse_nonlinear_warp(),
                &mni,
                &ctx.layout.nonlinear_warp(),
            ))
            .await?;
            ctx.add_to_spec(&mni_spec, structure, &mni).await?;
        }
        Ok(())
    }
}

/// Midthickness and its inflations, in T1w and MNI space.
pub struct Midthickness(pub Hemisphere);

#[async_trait]
impl Stage for Midthickness {
    fn name(&self) -> String {
        format!("midthickness-{}", self.0)
    }

    fn inputs(&self, ctx: &PipelineContext) -> Vec<PathBuf> {
        [Space::T1w, Space::Mni]
            .into_iter()
            .flat_map(|space| {
                [surface::WHITE, surface::PIAL]
                    .map(|name| ctx.layout.surface(space, self.0, name, Mesh::Native))
            })
            .collect()
    }

    fn outputs(&self, ctx: &PipelineContext) -> Vec<PathBuf> {
        [Space::T1w, Space::Mni]
            .into_iter()
            .flat_map(|space| {
                [surface::MIDTHICKNESS, surface::INFLATED, surface::VERY_INFLATED]
                    .map(|name| ctx.layout.surface(space, self.0, name, Mesh::Native))
            })
            .collect()
    }

    async fn run(&self, ctx: &PipelineContext) -> Result<()> {
        let hemisphere = self.0;
        let structure = hemisphere.structure();

        for space in [Space::T1w, Space::Mni] {
            let spec = ctx.layout.spec_file(space, Mesh::Native);
            let mid = ctx
                .layout
                .surface(space, hemisphere, surface::MIDTHICKNESS, Mesh::Native);
            let white = ctx.layout.surface(space, hemisphere, surface::WHITE, Mesh::Native);
            let pial = ctx.layout.surface(space, hemisphere, surface::PIAL, Mesh::Native);

            ctx.run(workbench::surface_average(&mid, &[white.as_path(), pial.as_path()]))
                .await?;
            ctx.run(workbench::set_surface_structure(
                &mid,
                structure,
                SurfaceType::Anatomical(Some("MIDTHICKNESS")),
            ))
            .await?;
            ctx.add_to_spec(&spec, structure, &mid).await?;
            helpers::make_inflated_surfaces(
                &ctx.runner,
                &mid,
                &spec,
                structure,
                ctx.settings.inflation_scale,
            )
            .await?;
        }
        Ok(())
    }
}

/// Native and registered FreeSurfer spheres.
pub struct Spheres(pub Hemisphere);

#[async_trait]
impl Stage for Spheres {
    fn name(&self) -> String {
        format!("spheres-{}", self.0)
    }

    fn inputs(&self, ctx: &PipelineContext) -> Vec<PathBuf> {
        [surface::SPHERE_REG, surface::SPHERE]
            .map(|name| ctx.layout.fs_surf(self.0, name))
            .to_vec()
    }

    fn outputs(&self, ctx: &PipelineContext) -> Vec<PathBuf> {
        [surface::SPHERE_REG, surface::SPHERE]
            .map(|name| ctx.layout.surface(Space::Mni, self.0, name, Mesh::Native))
            .to_vec()
    }

    async fn run(&self, ctx: &PipelineContext) -> Result<()> {
        let hemisphere = self.0;
        let structure = hemisphere.structure();

        for name in [surface::SPHERE_REG, surface::SPHERE] {
            let output = ctx.layout.surface(Space::Mni, hemisphere, name, Mesh::Native);
            ctx.run(freesurfer::mris_convert(
                &ctx.layout.fs_surf(hemisphere, name),
                &output,
            ))
            .await?;
            ctx.run(workbench::set_surface_structure(
                &output,
                structure,
                SurfaceType::Spherical,
            ))
            .await?;
        }

        ctx.add_to_spec(
            &ctx.layout.spec_file(Space::Mni, Mesh::Native),
            structure,
            &ctx.layout
                .surface(Space::Mni, hemisphere, surface::SPHERE, Mesh::Native),
        )
        .await
    }
}

/// Sulc, thickness and curvature as GIFTI metrics plus the medial wall ROI.
pub struct NativeMetrics(pub Hemisphere);

impl NativeMetrics {
    /// FreeSurfer file name, HCP metric name, map-name suffix.
    const METRICS: [(&'static str, &'static str, &'static str); 3] = [
        ("sulc", metric::SULC, "Sulc"),
        ("thickness", metric::THICKNESS, "Thickness"),
        ("curv", metric::CURVATURE, "Curvature"),
    ];
}

#[async_trait]
impl Stage for NativeMetrics {
    fn name(&self) -> String {
        format!("native-metrics-{}", self.0)
    }

    fn inputs(&self, ctx: &PipelineContext) -> Vec<PathBuf> {
        let mut inputs: Vec<PathBuf> = Self::METRICS
            .iter()
            .map(|(fs_name, _, _)| ctx.layout.fs_surf(self.0, fs_name))
            .collect();
        inputs.push(ctx.layout.fs_surf(self.0, surface::WHITE));
        inputs.push(ctx.layout.surface(
            Space::Mni,
            self.0,
            surface::MIDTHICKNESS,
            Mesh::Native,
        ));
        inputs
    }

    fn outputs(&self, ctx: &PipelineContext) -> Vec<PathBuf> {
        [metric::SULC, metric::THICKNESS, metric::CURVATURE, metric::ROI]
            .map(|name| ctx.layout.shape(Space::Mni, self.0, name, Mesh::Native))
            .to_vec()
    }

    async fn run(&self, ctx: &PipelineContext) -> Result<()> {
        let hemisphere = self.0;
        let structure = hemisphere.structure();
        let subject = ctx.layout.subject();
        let white = ctx.layout.fs_surf(hemisphere, surface::WHITE);
        let shape = |name: &str| ctx.layout.shape(Space::Mni, hemisphere, name, Mesh::Native);

        for (fs_name, wb_name, map_name) in Self::METRICS {
            let output = shape(wb_name);
            ctx.run(freesurfer::mris_convert_metric(
                &ctx.layout.fs_surf(hemisphere, fs_name),
                &white,
                &output,
            ))
            .await?;
            ctx.run(workbench::set_structure(&output, structure)).await?;
            ctx.run(workbench::metric_math(
                "(var * -1)",
                &output,
                &[("var", output.as_path())],
            ))
            .await?;
            ctx.run(workbench::set_map_name(
                &output,
                &format!("{}_{}_{}", subject, hemisphere, map_name),
            ))
            .await?;
            ctx.run(workbench::metric_palette(&output, Palette::SHAPE))
                .await?;
        }

        let thickness = shape(metric::THICKNESS);
        let curvature = shape(metric::CURVATURE);
        let roi = shape(metric::ROI);
        let midthickness =
            ctx.layout
                .surface(Space::Mni, hemisphere, surface::MIDTHICKNESS, Mesh::Native);

        ctx.run(workbench::metric_math(
            "(abs(thickness))",
            &thickness,
            &[("thickness", thickness.as_path())],
        ))
        .await?;
        ctx.run(workbench::metric_palette(&thickness, Palette::THICKNESS))
            .await?;

        // medial wall: zero thickness, cleaned up
        ctx.run(workbench::metric_math(
            "(thickness > 0)",
            &roi,
            &[("thickness", thickness.as_path())],
        ))
        .await?;
        ctx.run(workbench::metric_fill_holes(&midthickness, &roi, &roi))
            .await?;
        ctx.run(workbench::metric_remove_islands(&midthickness, &roi, &roi))
            .await?;
        ctx.run(workbench::set_map_name(
            &roi,
            &format!("{}_{}_ROI", subject, hemisphere),
        ))
        .await?;

        for map in [&thickness, &curvature] {
            ctx.run(workbench::metric_dilate(
                map,
                &midthickness,
                ctx.settings.dilation_mm,
                map,
            ))
            .await?;
        }
        Ok(())
    }
}

/// Parcellation annotations as GIFTI label files.
pub struct NativeLabels(pub Hemisphere);

#[async_trait]
impl Stage for NativeLabels {
    fn name(&self) -> String {
        format!("native-labels-{}", self.0)
    }

    fn outputs(&self, ctx: &PipelineContext) -> Vec<PathBuf> {
        ctx.available_annotations(self.0)
            .into_iter()
            .map(|annot| ctx.layout.label(Space::Mni, self.0, annot, Mesh::Native))
            .collect()
    }

    async fn run(&self, ctx: &PipelineContext) -> Result<()> {
        let hemisphere = self.0;
        let white = ctx.layout.fs_surf(hemisphere, surface::WHITE);

        for annot in ctx.available_annotations(hemisphere) {
            let label = ctx.layout.label(Space::Mni, hemisphere, annot, Mesh::Native);
            ctx.run(freesurfer::mris_convert_annotation(
                &ctx.layout.fs_annotation(hemisphere, annot),
                &white,
                &label,
            ))
            .await?;
            ctx.run(workbench::set_structure(&label, hemisphere.structure()))
                .await?;
            ctx.run(workbench::set_map_name(
                &label,
                &format!("{}_{}_{}", ctx.layout.subject(), hemisphere, annot),
            ))
            .await?;
            ctx.run(workbench::gifti_label_add_prefix(
                &label,
                &format!("{}_", hemisphere),
                &label,
            ))
            .await?;
        }
        Ok(())
    }
}
