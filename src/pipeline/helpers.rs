//! Multi-command building blocks shared by the surface stages.

use std::path::Path;
use tempfile::TempDir;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::paths::naming::surface;
use crate::paths::sibling_path;
use crate::subprocess::CommandRunner;
use crate::tools::workbench::{self, MetricResample, Palette};

/// Append `artifact` to a spec file under `structure`.
///
/// Outside dry-run the artifact must already exist.
pub async fn add_to_spec(
    runner: &CommandRunner,
    spec: &Path,
    structure: &str,
    artifact: &Path,
) -> Result<()> {
    if !runner.is_dry_run() && !artifact.exists() {
        return Err(Error::MissingArtifact {
            spec: spec.to_path_buf(),
            artifact: artifact.to_path_buf(),
        });
    }
    runner
        .run_checked(workbench::add_to_spec_file(spec, structure, artifact))
        .await?;
    Ok(())
}

/// Copy a template file into the subject tree.
pub async fn copy_file(runner: &CommandRunner, from: &Path, to: &Path) -> Result<()> {
    info!("Copying {} to {}", from.display(), to.display());
    if runner.is_dry_run() {
        return Ok(());
    }
    tokio::fs::copy(from, to).await?;
    Ok(())
}

/// Log2 ratio of registered to original vertex areas.
///
/// Vertex areas go to a temporary directory that is removed on return.
pub async fn calc_areal_distortion(
    runner: &CommandRunner,
    sphere_pre: &Path,
    sphere_reg: &Path,
    output: &Path,
    map_prefix: &str,
    map_postfix: &str,
) -> Result<()> {
    let scratch = TempDir::new()?;
    let pre_areas = scratch.path().join("sphere_pre_va.shape.gii");
    let reg_areas = scratch.path().join("sphere_reg_va.shape.gii");

    runner
        .run_checked(workbench::surface_vertex_areas(sphere_pre, &pre_areas))
        .await?;
    runner
        .run_checked(workbench::surface_vertex_areas(sphere_reg, &reg_areas))
        .await?;
    runner
        .run_checked(workbench::metric_math(
            "(ln(spherereg / sphere) / ln(2))",
            output,
            &[("sphere", pre_areas.as_path()), ("spherereg", reg_areas.as_path())],
        ))
        .await?;
    runner
        .run_checked(workbench::set_map_name(
            output,
            &format!("{}_Areal_Distortion_{}", map_prefix, map_postfix),
        ))
        .await?;
    runner
        .run_checked(workbench::metric_palette(output, Palette::AREAL_DISTORTION))
        .await?;

    debug!("Removing {}", scratch.path().display());
    Ok(())
}

/// Barycentric surface resample, then add the result to `spec`.
pub async fn resample_surface_to_spec(
    runner: &CommandRunner,
    input: &Path,
    output: &Path,
    current_sphere: &Path,
    new_sphere: &Path,
    spec: &Path,
    structure: &str,
) -> Result<()> {
    runner
        .run_checked(workbench::surface_resample(
            input,
            current_sphere,
            new_sphere,
            output,
        ))
        .await?;
    add_to_spec(runner, spec, structure, output).await
}

/// Generate inflated and very inflated siblings of a midthickness surface
/// and add both to `spec`.
pub async fn make_inflated_surfaces(
    runner: &CommandRunner,
    midthickness: &Path,
    spec: &Path,
    structure: &str,
    iterations_scale: f64,
) -> Result<()> {
    let inflated = sibling_path(midthickness, surface::MIDTHICKNESS, surface::INFLATED);
    let very_inflated =
        sibling_path(midthickness, surface::MIDTHICKNESS, surface::VERY_INFLATED);

    runner
        .run_checked(workbench::surface_generate_inflated(
            midthickness,
            &inflated,
            &very_inflated,
            iterations_scale,
        ))
        .await?;
    add_to_spec(runner, spec, structure, &inflated).await?;
    add_to_spec(runner, spec, structure, &very_inflated).await
}

/// Where a metric comes from and where it goes.
#[derive(Debug, Clone, Copy)]
pub struct MetricMeshes<'a> {
    pub current_sphere: &'a Path,
    pub new_sphere: &'a Path,
    pub current_midthickness: &'a Path,
    pub new_midthickness: &'a Path,
}

/// Area-adaptive metric resample, optionally restricted to `current_roi`
/// on the way in and masked by `new_roi` on the way out.
pub async fn resample_and_mask_metric(
    runner: &CommandRunner,
    input: &Path,
    output: &Path,
    meshes: MetricMeshes<'_>,
    current_roi: Option<&Path>,
    new_roi: Option<&Path>,
) -> Result<()> {
    let resample = MetricResample {
        input,
        current_sphere: meshes.current_sphere,
        new_sphere: meshes.new_sphere,
        output,
        current_area: meshes.current_midthickness,
        new_area: meshes.new_midthickness,
        current_roi,
    };
    runner.run_checked(resample.command()).await?;

    if let Some(roi) = new_roi {
        runner
            .run_checked(workbench::metric_mask(output, roi, output))
            .await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn meshes() -> MetricMeshes<'static> {
        MetricMeshes {
            current_sphere: Path::new("reg.native.surf.gii"),
            new_sphere: Path::new("sphere.32k.surf.gii"),
            current_midthickness: Path::new("mid.native.surf.gii"),
            new_midthickness: Path::new("mid.32k.surf.gii"),
        }
    }

    #[tokio::test]
    async fn test_add_to_spec_requires_artifact() {
        let (runner, mock) = CommandRunner::mock(false);
        let err = add_to_spec(
            &runner,
            Path::new("/nonexistent/sub.native.wb.spec"),
            "CORTEX_LEFT",
            Path::new("/nonexistent/sub.L.white.native.surf.gii"),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, Error::MissingArtifact { .. }));
        assert!(mock.get_call_history().is_empty());
    }

    #[tokio::test]
    async fn test_add_to_spec_existing_artifact() {
        let dir = TempDir::new().unwrap();
        let artifact = dir.path().join("T1w.nii.gz");
        std::fs::write(&artifact, b"").unwrap();
        let (runner, mut mock) = CommandRunner::mock(false);
        mock.succeed_for(&["wb_command"]);

        add_to_spec(&runner, &dir.path().join("s.wb.spec"), "INVALID", &artifact)
            .await
            .unwrap();

        let calls = mock.wb_calls("-add-to-spec-file");
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0][2], "INVALID");
    }

    #[tokio::test]
    async fn test_copy_file_skipped_in_dry_run() {
        let dir = TempDir::new().unwrap();
        let from = dir.path().join("template.surf.gii");
        std::fs::write(&from, b"gifti").unwrap();
        let to = dir.path().join("copy.surf.gii");

        let (runner, _mock) = CommandRunner::mock(true);
        copy_file(&runner, &from, &to).await.unwrap();
        assert!(!to.exists());

        let (runner, _mock) = CommandRunner::mock(false);
        copy_file(&runner, &from, &to).await.unwrap();
        assert_eq!(std::fs::read(&to).unwrap(), b"gifti");
    }

    #[tokio::test]
    async fn test_areal_distortion_sequence() {
        let (runner, mut mock) = CommandRunner::mock(false);
        mock.succeed_for(&["wb_command"]);

        calc_areal_distortion(
            &runner,
            Path::new("sphere.native.surf.gii"),
            Path::new("sphere.reg.reg_LR.native.surf.gii"),
            Path::new("ArealDistortion_FS.native.shape.gii"),
            "sub-01_L",
            "FS",
        )
        .await
        .unwrap();

        let subcommands: Vec<String> = mock
            .get_call_history()
            .iter()
            .map(|cmd| cmd.args[0].clone())
            .collect();
        assert_eq!(
            subcommands,
            vec![
                "-surface-vertex-areas",
                "-surface-vertex-areas",
                "-metric-math",
                "-set-map-names",
                "-metric-palette",
            ]
        );

        let math = &mock.wb_calls("-metric-math")[0];
        assert_eq!(math[1], "(ln(spherereg / sphere) / ln(2))");
        let scratch = PathBuf::from(&math[5]);
        assert!(!scratch.parent().unwrap().exists());

        assert_eq!(
            mock.wb_calls("-set-map-names")[0].last().unwrap(),
            "sub-01_L_Areal_Distortion_FS"
        );
        let palette = &mock.wb_calls("-metric-palette")[0];
        assert!(palette.contains(&"ROY-BIG-BL".to_string()));
        assert!(palette.contains(&"THRESHOLD_TEST_SHOW_OUTSIDE".to_string()));
    }

    #[tokio::test]
    async fn test_areal_distortion_cleans_up_on_failure() {
        let (runner, mut mock) = CommandRunner::mock(false);
        mock.expect_command("wb_command")
            .with_args(|args| args[0] == "-metric-math")
            .returns_exit_code(1)
            .finish();
        mock.succeed_for(&["wb_command"]);

        let result = calc_areal_distortion(
            &runner,
            Path::new("pre.surf.gii"),
            Path::new("reg.surf.gii"),
            Path::new("out.shape.gii"),
            "sub-01_R",
            "FS",
        )
        .await;

        assert!(result.is_err());
        let areas = &mock.wb_calls("-surface-vertex-areas")[0];
        assert!(!Path::new(&areas[2]).parent().unwrap().exists());
        assert!(mock.wb_calls("-set-map-names").is_empty());
    }

    #[tokio::test]
    async fn test_inflation_adds_two_siblings() {
        let (runner, mut mock) = CommandRunner::mock(true);
        mock.succeed_for(&["wb_command"]);

        // dry-run: commands are only logged
        make_inflated_surfaces(
            &runner,
            Path::new("/out/sub.L.midthickness.native.surf.gii"),
            Path::new("/out/sub.native.wb.spec"),
            "CORTEX_LEFT",
            2.5,
        )
        .await
        .unwrap();
        assert!(mock.get_call_history().is_empty());

        let dir = TempDir::new().unwrap();
        let mid = dir.path().join("sub.L.midthickness.native.surf.gii");
        for name in ["sub.L.inflated.native.surf.gii", "sub.L.very_inflated.native.surf.gii"] {
            std::fs::write(dir.path().join(name), b"").unwrap();
        }
        let (runner, mut mock) = CommandRunner::mock(false);
        mock.succeed_for(&["wb_command"]);

        make_inflated_surfaces(&runner, &mid, &dir.path().join("s.wb.spec"), "CORTEX_LEFT", 2.5)
            .await
            .unwrap();

        let generate = &mock.wb_calls("-surface-generate-inflated")[0];
        assert!(generate[2].ends_with("sub.L.inflated.native.surf.gii"));
        assert!(generate[3].ends_with("sub.L.very_inflated.native.surf.gii"));
        assert_eq!(generate[5], "2.5");

        let added = mock.wb_calls("-add-to-spec-file");
        assert_eq!(added.len(), 2);
        assert_eq!(added[0][3], generate[2]);
        assert_eq!(added[1][3], generate[3]);
    }

    #[tokio::test]
    async fn test_resample_with_both_masks() {
        let (runner, mut mock) = CommandRunner::mock(false);
        mock.succeed_for(&["wb_command"]);

        resample_and_mask_metric(
            &runner,
            Path::new("thickness.native.shape.gii"),
            Path::new("thickness.32k.shape.gii"),
            meshes(),
            Some(Path::new("roi.native.shape.gii")),
            Some(Path::new("atlasroi.32k.shape.gii")),
        )
        .await
        .unwrap();

        let resample = &mock.wb_calls("-metric-resample")[0];
        assert_eq!(resample[4], "ADAP_BARY_AREA");
        assert_eq!(
            &resample[resample.len() - 2..],
            ["-current-roi", "roi.native.shape.gii"]
        );
        assert_eq!(
            mock.wb_calls("-metric-mask")[0],
            vec![
                "-metric-mask",
                "thickness.32k.shape.gii",
                "atlasroi.32k.shape.gii",
                "thickness.32k.shape.gii",
            ]
        );
    }

    #[tokio::test]
    async fn test_resample_without_masks() {
        let (runner, mut mock) = CommandRunner::mock(false);
        mock.succeed_for(&["wb_command"]);

        resample_and_mask_metric(
            &runner,
            Path::new("sulc.native.shape.gii"),
            Path::new("sulc.32k.shape.gii"),
            meshes(),
            None,
            None,
        )
        .await
        .unwrap();

        let resample = &mock.wb_calls("-metric-resample")[0];
        assert!(!resample.contains(&"-current-roi".to_string()));
        assert_eq!(resample.last().unwrap(), "mid.32k.surf.gii");
        assert!(mock.wb_calls("-metric-mask").is_empty());
    }

    #[tokio::test]
    async fn test_resample_with_destination_mask_only() {
        let (runner, mut mock) = CommandRunner::mock(false);
        mock.succeed_for(&["wb_command"]);

        resample_and_mask_metric(
            &runner,
            Path::new("curvature.native.shape.gii"),
            Path::new("curvature.164k.shape.gii"),
            meshes(),
            None,
            Some(Path::new("atlasroi.164k.shape.gii")),
        )
        .await
        .unwrap();

        assert!(!mock.wb_calls("-metric-resample")[0].contains(&"-current-roi".to_string()));
        assert_eq!(mock.wb_calls("-metric-mask").len(), 1);
    }
}
