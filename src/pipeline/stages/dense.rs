//! CIFTI dense maps combining both hemispheres, and their spec entries.

use async_trait::async_trait;
use std::path::PathBuf;

use crate::error::Result;
use crate::paths::naming::metric;
use crate::paths::{DenseKind, Hemisphere, Mesh, Space};
use crate::pipeline::context::PipelineContext;
use crate::pipeline::stage::Stage;
use crate::tools::workbench::{self, HemisphereRois, Palette, STRUCTURE_INVALID};

/// A dense scalar built from the per-hemisphere metric of the same name.
struct DenseScalar {
    metric: &'static str,
    map_suffix: &'static str,
    palette: Palette,
    masked: bool,
}

const DENSE_SCALARS: [DenseScalar; 4] = [
    DenseScalar {
        metric: metric::SULC,
        map_suffix: "Sulc",
        palette: Palette::SHAPE,
        masked: false,
    },
    DenseScalar {
        metric: metric::CURVATURE,
        map_suffix: "Curvature",
        palette: Palette::SHAPE,
        masked: true,
    },
    DenseScalar {
        metric: metric::THICKNESS,
        map_suffix: "Thickness",
        palette: Palette::THICKNESS,
        masked: true,
    },
    DenseScalar {
        metric: metric::AREAL_DISTORTION_FS,
        map_suffix: "ArealDistortion_FS",
        palette: Palette::AREAL_DISTORTION_DENSE,
        masked: false,
    },
];

/// Medial wall mask used for dense files on `mesh`.
fn roi_name(mesh: Mesh) -> &'static str {
    match mesh {
        Mesh::Native => metric::ROI,
        Mesh::Standard(_) => metric::ATLAS_ROI,
    }
}

/// Build sulc, curvature, thickness and areal distortion dense scalars and
/// a dense label file per bilateral annotation, on every mesh.
pub struct DenseMaps;

impl DenseMaps {
    fn planned(ctx: &PipelineContext) -> Vec<PathBuf> {
        let annotations = ctx.bilateral_annotations();
        let mut files = Vec::new();
        for mesh in ctx.all_meshes() {
            files.extend(
                DENSE_SCALARS
                    .iter()
                    .map(|d| ctx.layout.dense(d.metric, mesh, DenseKind::Scalar)),
            );
            files.extend(
                annotations
                    .iter()
                    .map(|annot| ctx.layout.dense(annot, mesh, DenseKind::Label)),
            );
        }
        files
    }
}

#[async_trait]
impl Stage for DenseMaps {
    fn name(&self) -> String {
        "dense-maps".to_string()
    }

    fn outputs(&self, ctx: &PipelineContext) -> Vec<PathBuf> {
        Self::planned(ctx)
    }

    async fn run(&self, ctx: &PipelineContext) -> Result<()> {
        let subject = ctx.layout.subject();
        let annotations = ctx.bilateral_annotations();

        for mesh in ctx.all_meshes() {
            let shape = |h: Hemisphere, name: &str| ctx.layout.shape(Space::Mni, h, name, mesh);
            let left_roi = shape(Hemisphere::Left, roi_name(mesh));
            let right_roi = shape(Hemisphere::Right, roi_name(mesh));
            let rois = HemisphereRois {
                left: &left_roi,
                right: &right_roi,
            };

            for dense in &DENSE_SCALARS {
                let output = ctx.layout.dense(dense.metric, mesh, DenseKind::Scalar);
                ctx.run(workbench::cifti_create_dense_scalar(
                    &output,
                    &shape(Hemisphere::Left, dense.metric),
                    &shape(Hemisphere::Right, dense.metric),
                    dense.masked.then_some(rois),
                ))
                .await?;
                ctx.run(workbench::set_map_name(
                    &output,
                    &format!("{}_{}", subject, dense.map_suffix),
                ))
                .await?;
                ctx.run(workbench::cifti_palette(&output, dense.palette))
                    .await?;
            }

            for annot in &annotations {
                let output = ctx.layout.dense(annot, mesh, DenseKind::Label);
                ctx.run(workbench::cifti_create_label(
                    &output,
                    &ctx.layout.label(Space::Mni, Hemisphere::Left, annot, mesh),
                    &ctx.layout.label(Space::Mni, Hemisphere::Right, annot, mesh),
                    Some(rois),
                ))
                .await?;
                ctx.run(workbench::set_map_name(
                    &output,
                    &format!("{}_{}", subject, annot),
                ))
                .await?;
            }
        }
        Ok(())
    }
}

/// Add the sulc, thickness, curvature and label dense maps to the spec
/// files of both spaces.
pub struct SpecDenseMaps;

impl SpecDenseMaps {
    fn entries(ctx: &PipelineContext) -> Vec<(PathBuf, PathBuf)> {
        let mut targets = vec![
            (ctx.layout.spec_file(Space::T1w, Mesh::Native), Mesh::Native),
            (ctx.layout.spec_file(Space::Mni, Mesh::Native), Mesh::Native),
            (
                ctx.layout.spec_file(Space::Mni, ctx.high_res_mesh()),
                ctx.high_res_mesh(),
            ),
        ];
        for mesh in ctx.low_res_meshes() {
            targets.push((ctx.layout.spec_file(Space::Mni, mesh), mesh));
            targets.push((ctx.layout.spec_file(Space::T1w, mesh), mesh));
        }

        let annotations = ctx.bilateral_annotations();
        let mut entries = Vec::new();
        for (spec, mesh) in targets {
            for name in [metric::SULC, metric::THICKNESS, metric::CURVATURE] {
                entries.push((spec.clone(), ctx.layout.dense(name, mesh, DenseKind::Scalar)));
            }
            for annot in &annotations {
                entries.push((spec.clone(), ctx.layout.dense(annot, mesh, DenseKind::Label)));
            }
        }
        entries
    }
}

#[async_trait]
impl Stage for SpecDenseMaps {
    fn name(&self) -> String {
        "spec-dense-maps".to_string()
    }

    fn inputs(&self, ctx: &PipelineContext) -> Vec<PathBuf> {
        DenseMaps::planned(ctx)
    }

    async fn run(&self, ctx: &PipelineContext) -> Result<()> {
        for (spec, dense) in Self::entries(ctx) {
            ctx.add_to_spec(&spec, STRUCTURE_INVALID, &dense).await?;
        }
        Ok(())
    }
}
