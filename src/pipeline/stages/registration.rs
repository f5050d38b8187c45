use async_trait::async_trait;
use std::path::PathBuf;

use crate::error::Result;
use crate::paths::Space;
use crate::pipeline::context::PipelineContext;
use crate::pipeline::stage::Stage;
use crate::tools::fsl::{self, Fnirt};

/// Linear then nonlinear registration of T1w to the MNI 2mm template.
///
/// The linearly registered image only feeds FNIRT, so it stays in scratch
/// and the three tools run as one stage.
pub struct RegisterToMni;

#[async_trait]
impl Stage for RegisterToMni {
    fn name(&self) -> String {
        "register-to-mni".to_string()
    }

    fn inputs(&self, ctx: &PipelineContext) -> Vec<PathBuf> {
        vec![
            ctx.layout.volume(Space::T1w, "T1w_brain"),
            ctx.templates.mni_2mm(),
            ctx.templates.mni_2mm_brain(),
            ctx.templates.mni_2mm_brain_mask(),
            ctx.templates.fnirt_config(),
        ]
    }

    fn outputs(&self, ctx: &PipelineContext) -> Vec<PathBuf> {
        vec![
            ctx.layout.linear_transform(),
            ctx.layout.nonlinear_warp(),
            ctx.layout.inverse_nonlinear_warp(),
        ]
    }

    async fn run(&self, ctx: &PipelineContext) -> Result<()> {
        let linear_image = ctx.scratch_path("T1w2StandardLinearImage.nii.gz");
        let warp = ctx.layout.nonlinear_warp();

        ctx.run(fsl::flirt(
            &ctx.layout.volume(Space::T1w, "T1w_brain"),
            &ctx.templates.mni_2mm_brain(),
            &ctx.layout.linear_transform(),
            &linear_image,
        ))
        .await?;

        // warp only, without the affine: surfaces can fall outside the
        // bounding box of a full warpfield
        ctx.run(
            Fnirt {
                input: &linear_image,
                reference: &ctx.templates.mni_2mm(),
                reference_mask: &ctx.templates.mni_2mm_brain_mask(),
                field_out: &warp,
                log_out: &ctx.layout.fnirt_log(),
                config: &ctx.templates.fnirt_config(),
            }
            .command(),
        )
        .await?;

        ctx.run(fsl::invwarp(
            &warp,
            &ctx.layout.inverse_nonlinear_warp(),
            &ctx.templates.mni_2mm(),
        ))
        .await
    }
}
