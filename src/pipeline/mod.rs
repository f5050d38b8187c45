//! The FreeSurfer to HCP conversion as an ordered list of stages.
//!
//! Each [`Stage`] declares the files it needs and produces. The
//! [`Pipeline`] runs them strictly in order, checks inputs before each one
//! and records completed stages in the subject's checkpoint file so a later
//! run with `--resume` can skip them.

pub mod checkpoint;
pub mod context;
pub mod cras;
pub mod helpers;
pub mod stage;
pub mod stages;

#[cfg(test)]
pub(crate) mod test_support;
#[cfg(test)]
mod tests;

pub use checkpoint::{Checkpoint, CheckpointStore};
pub use context::PipelineContext;
pub use stage::Stage;

use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::settings::RegistrationMethod;

/// Stages run and skipped by one pipeline invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub executed: Vec<String>,
    pub skipped: Vec<String>,
}

pub struct Pipeline {
    ctx: PipelineContext,
    stages: Vec<Box<dyn Stage>>,
    resume: bool,
}

impl Pipeline {
    /// Plan the standard conversion for the subject in `ctx`.
    pub fn new(ctx: PipelineContext) -> Result<Self> {
        Self::with_stages(ctx, stages::standard_stages())
    }

    pub fn with_stages(ctx: PipelineContext, stages: Vec<Box<dyn Stage>>) -> Result<Self> {
        if ctx.settings.registration == RegistrationMethod::MsmSulc {
            return Err(Error::Unsupported(
                "MSMSulc registration is not available; use registration = \"FS\"".to_string(),
            ));
        }
        Ok(Self {
            ctx,
            stages,
            resume: false,
        })
    }

    pub fn with_resume(mut self, resume: bool) -> Self {
        self.resume = resume;
        self
    }

    pub fn context(&self) -> &PipelineContext {
        &self.ctx
    }

    pub fn stage_names(&self) -> Vec<String> {
        self.stages.iter().map(|stage| stage.name()).collect()
    }

    pub async fn run(&self) -> Result<RunSummary> {
        let ctx = &self.ctx;
        let subject = ctx.layout.subject();
        let store = CheckpointStore::new(ctx.layout.checkpoint_file());
        let mut checkpoint = if self.resume {
            store.load(subject).await?
        } else {
            Checkpoint::new(subject)
        };

        info!("START: fs2hcp conversion of subject {}", subject);
        let total = self.stages.len();
        let mut summary = RunSummary::default();

        for (index, stage) in self.stages.iter().enumerate() {
            let name = stage.name();

            if self.resume && self.can_skip(stage.as_ref(), &checkpoint) {
                info!("[{}/{}] Skipping completed stage {}", index + 1, total, name);
                summary.skipped.push(name);
                continue;
            }

            info!("[{}/{}] {}", index + 1, total, name);
            if !ctx.dry_run() {
                if let Some(path) = stage.inputs(ctx).into_iter().find(|p| !p.exists()) {
                    return Err(Error::MissingInput { stage: name, path });
                }
            }

            stage.run(ctx).await.map_err(|source| Error::Stage {
                stage: name.clone(),
                source: Box::new(source),
            })?;

            if !ctx.dry_run() {
                checkpoint.mark_complete(&name);
                store.save(&checkpoint).await?;
            }
            summary.executed.push(name);
        }

        info!(
            "END: fs2hcp ({} stages run, {} skipped)",
            summary.executed.len(),
            summary.skipped.len()
        );
        Ok(summary)
    }

    /// Checkpointed, with every declared output present.
    fn can_skip(&self, stage: &dyn Stage, checkpoint: &Checkpoint) -> bool {
        let name = stage.name();
        if !checkpoint.is_complete(&name) {
            return false;
        }
        let outputs = stage.outputs(&self.ctx);
        if outputs.is_empty() {
            return false;
        }
        match outputs.iter().find(|p| !p.exists()) {
            Some(missing) => {
                debug!("{} must rerun: {} is missing", name, missing.display());
                false
            }
            None => true,
        }
    }
}
