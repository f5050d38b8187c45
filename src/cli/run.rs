//! Conversion run for one subject.

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::cli::args::Cli;
use crate::error::Error;
use crate::paths::{SubjectLayout, TemplatePaths};
use crate::pipeline::{Pipeline, PipelineContext, RunSummary};
use crate::settings::{Environment, Settings};
use crate::subprocess::CommandRunner;

/// Resolve roots and settings, then run the pipeline.
pub async fn execute(cli: &Cli) -> Result<RunSummary> {
    let env = Environment::resolve(cli.environment_overrides())?;
    debug!("Resolved environment: {:?}", env);

    let fs_subject = env.fs_subjects_dir.join(&cli.subject);
    if !fs_subject.is_dir() {
        return Err(Error::SubjectNotFound(fs_subject).into());
    }

    let settings = match &cli.config {
        Some(path) => Settings::load(path)
            .await
            .with_context(|| format!("Failed to load settings from {}", path.display()))?,
        None => Settings::default(),
    };

    if cli.dry_run {
        info!("Dry-run mode: commands are logged, not executed");
    }
    let runner = CommandRunner::production(cli.dry_run)
        .with_timeout(settings.command_timeout());
    let layout = SubjectLayout::new(
        &cli.subject,
        &env.hcp_data,
        &env.fs_subjects_dir,
        settings.high_res_mesh,
    );
    let templates = TemplatePaths::new(&env.fsl_dir, &env.templates_dir);

    let ctx = PipelineContext::new(runner, layout, templates, settings)?;
    let pipeline = Pipeline::new(ctx)?.with_resume(cli.resume);
    Ok(pipeline.run().await?)
}
