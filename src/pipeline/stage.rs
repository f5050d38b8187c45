use async_trait::async_trait;
use std::path::PathBuf;

use crate::error::Result;

use super::context::PipelineContext;

/// One named step of the conversion.
///
/// `inputs` must exist before the stage runs (checked outside dry-run);
/// `outputs` decide whether a checkpointed stage may be skipped on resume.
#[async_trait]
pub trait Stage: Send + Sync {
    fn name(&self) -> String;

    fn inputs(&self, _ctx: &PipelineContext) -> Vec<PathBuf> {
        Vec::new()
    }

    fn outputs(&self, _ctx: &PipelineContext) -> Vec<PathBuf> {
        Vec::new()
    }

    async fn run(&self, ctx: &PipelineContext) -> Result<()>;
}
