use super::stages::dense::{DenseMaps, SpecDenseMaps};
use super::stages::fs_lr::{RegisterFsLr, ResampleLowRes};
use super::stages::hemisphere::NativeMetrics;
use super::stages::volumes::{ConvertT1w, InitSpecFiles, Scaffold};
use super::test_support::{SyntheticSubject, SUBJECT};
use super::*;
use crate::paths::{Hemisphere, Mesh, Space};
use crate::settings::Settings;
use crate::subprocess::MockProcessRunner;

fn path_arg(path: std::path::PathBuf) -> String {
    path.to_string_lossy().into_owned()
}

fn create_file(path: &std::path::Path) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, b"").unwrap();
}

/// `(spec, structure, file)` of every `-add-to-spec-file` call, in order.
fn spec_entries(mock: &MockProcessRunner) -> Vec<(String, String, String)> {
    mock.wb_calls("-add-to-spec-file")
        .into_iter()
        .map(|args| (args[1].clone(), args[2].clone(), args[3].clone()))
        .collect()
}

fn entry(
    spec: std::path::PathBuf,
    structure: &str,
    file: std::path::PathBuf,
) -> (String, String, String) {
    (path_arg(spec), structure.to_string(), path_arg(file))
}

#[test]
fn test_standard_stage_order() {
    let subject = SyntheticSubject::new();
    let (ctx, _mock) = subject.context(true);
    let pipeline = Pipeline::new(ctx).unwrap();

    let mut expected: Vec<String> = [
        "scaffold",
        "convert-t1w",
        "import-segmentations",
        "brain-mask",
        "register-to-mni",
        "warp-volumes",
        "init-spec-files",
        "subcortical-rois",
        "cras-offset",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();
    for h in ["L", "R"] {
        for stage in [
            "native-surfaces",
            "midthickness",
            "spheres",
            "native-metrics",
            "native-labels",
            "register-fs-lr",
            "resample-high-res",
            "resample-low-res",
        ] {
            expected.push(format!("{}-{}", stage, h));
        }
    }
    expected.push("dense-maps".to_string());
    expected.push("spec-dense-maps".to_string());

    assert_eq!(pipeline.stage_names(), expected);
}

#[test]
fn test_msmsulc_is_rejected_before_running() {
    let subject = SyntheticSubject::new();
    let settings = Settings::from_toml("registration = \"MSMSulc\"\n").unwrap();
    let (ctx, _mock) = subject.context_with(settings, false);

    assert!(matches!(Pipeline::new(ctx), Err(Error::Unsupported(_))));
    assert!(!subject.hcp_data().exists());
}

#[tokio::test]
async fn test_dry_run_traverses_every_stage_without_processes() {
    let subject = SyntheticSubject::new();
    let (ctx, mock) = subject.context(true);
    let pipeline = Pipeline::new(ctx).unwrap();

    let summary = pipeline.run().await.unwrap();

    assert_eq!(summary.executed, pipeline.stage_names());
    assert!(summary.skipped.is_empty());
    assert!(mock.get_call_history().is_empty());
    assert!(!subject.hcp_data().exists());
}

#[tokio::test]
async fn test_failing_command_aborts_with_its_exit_status() {
    let subject = SyntheticSubject::new();
    let (ctx, mut mock) = subject.context(false);
    mock.expect_command("mri_convert").returns_exit_code(3).finish();
    let pipeline = Pipeline::new(ctx).unwrap();

    let err = pipeline.run().await.unwrap_err();

    match &err {
        Error::Stage { stage, .. } => assert_eq!(stage, "convert-t1w"),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(err.command_exit_code(), Some(3));
    assert_eq!(mock.get_call_history().len(), 1);
    assert_eq!(mock.call_count("fslreorient2std"), 0);

    let checkpoint = CheckpointStore::new(pipeline.context().layout.checkpoint_file())
        .load(SUBJECT)
        .await
        .unwrap();
    assert!(checkpoint.is_complete("scaffold"));
    assert!(!checkpoint.is_complete("convert-t1w"));
}

#[tokio::test]
async fn test_missing_input_stops_before_running() {
    let subject = SyntheticSubject::new();
    std::fs::remove_file(subject.path(&format!("fs/{}/mri/T1.mgz", SUBJECT))).unwrap();
    let (ctx, mock) = subject.context(false);
    let pipeline = Pipeline::new(ctx).unwrap();

    let err = pipeline.run().await.unwrap_err();

    assert!(matches!(err, Error::MissingInput { ref stage, .. } if stage == "convert-t1w"));
    assert!(mock.get_call_history().is_empty());
}

fn head_stages() -> Vec<Box<dyn Stage>> {
    vec![Box::new(Scaffold), Box::new(ConvertT1w)]
}

#[tokio::test]
async fn test_resume_skips_checkpointed_stages_with_outputs() {
    let subject = SyntheticSubject::new();

    let (ctx, mut mock) = subject.context(false);
    mock.succeed_for(&["mri_convert", "fslreorient2std"]);
    let first = Pipeline::with_stages(ctx, head_stages()).unwrap();
    let summary = first.run().await.unwrap();
    assert_eq!(summary.executed, vec!["scaffold", "convert-t1w"]);

    // the mock does not write files
    std::fs::write(first.context().layout.volume(Space::T1w, "T1w"), b"").unwrap();

    let (ctx, mock) = subject.context(false);
    let resumed = Pipeline::with_stages(ctx, head_stages())
        .unwrap()
        .with_resume(true);
    let summary = resumed.run().await.unwrap();

    assert!(summary.executed.is_empty());
    assert_eq!(summary.skipped, vec!["scaffold", "convert-t1w"]);
    assert!(mock.get_call_history().is_empty());
}

#[tokio::test]
async fn test_resume_reruns_stage_with_missing_output() {
    let subject = SyntheticSubject::new();

    let (ctx, mut mock) = subject.context(false);
    mock.succeed_for(&["mri_convert", "fslreorient2std"]);
    Pipeline::with_stages(ctx, head_stages())
        .unwrap()
        .run()
        .await
        .unwrap();

    let (ctx, mut mock) = subject.context(false);
    mock.succeed_for(&["mri_convert", "fslreorient2std"]);
    let summary = Pipeline::with_stages(ctx, head_stages())
        .unwrap()
        .with_resume(true)
        .run()
        .await
        .unwrap();

    assert_eq!(summary.skipped, vec!["scaffold"]);
    assert_eq!(summary.executed, vec!["convert-t1w"]);
    assert_eq!(mock.call_count("mri_convert"), 1);
}

#[tokio::test]
async fn test_without_resume_everything_reruns() {
    let subject = SyntheticSubject::new();

    for _ in 0..2 {
        let (ctx, mut mock) = subject.context(false);
        mock.succeed_for(&["mri_convert", "fslreorient2std"]);
        let summary = Pipeline::with_stages(ctx, head_stages())
            .unwrap()
            .run()
            .await
            .unwrap();
        assert_eq!(summary.executed.len(), 2);
    }
}

#[tokio::test]
async fn test_native_metrics_sequence() {
    let subject = SyntheticSubject::new();
    let (ctx, mut mock) = subject.context(false);
    mock.succeed_for(&["mris_convert", "wb_command"]);

    NativeMetrics(Hemisphere::Left).run(&ctx).await.unwrap();

    assert_eq!(mock.call_count("mris_convert"), 3);
    let expressions: Vec<String> = mock
        .wb_calls("-metric-math")
        .into_iter()
        .map(|args| args[1].clone())
        .collect();
    assert_eq!(
        expressions,
        vec![
            "(var * -1)",
            "(var * -1)",
            "(var * -1)",
            "(abs(thickness))",
            "(thickness > 0)",
        ]
    );

    let map_names: Vec<String> = mock
        .wb_calls("-set-map-names")
        .into_iter()
        .map(|args| args.last().unwrap().clone())
        .collect();
    assert_eq!(
        map_names,
        vec!["sub-01_L_Sulc", "sub-01_L_Thickness", "sub-01_L_Curvature", "sub-01_L_ROI"]
    );

    let dilations = mock.wb_calls("-metric-dilate");
    assert_eq!(dilations.len(), 2);
    let thickness = ctx
        .layout
        .shape(Space::Mni, Hemisphere::Left, "thickness", Mesh::Native);
    assert_eq!(dilations[0][1], path_arg(thickness));
    assert_eq!(dilations[0][3], "10");
    assert_eq!(dilations[0].last().unwrap(), "-nearest");

    for structure in mock.wb_calls("-set-structure") {
        assert_eq!(structure[2], "CORTEX_LEFT");
    }
}

#[tokio::test]
async fn test_register_fs_lr_builds_native_roi() {
    let subject = SyntheticSubject::new();
    let (ctx, mut mock) = subject.context(false);
    mock.succeed_for(&["wb_command"]);
    subject.touch(
        "templates/standard_mesh_atlases/fsaverage.R_LR.spherical_std.164k_fs_LR.surf.gii",
    );
    std::fs::create_dir_all(ctx.layout.space_dir(Space::Mni)).unwrap();

    RegisterFsLr(Hemisphere::Right).run(&ctx).await.unwrap();

    let high_sphere = ctx
        .layout
        .surface(Space::Mni, Hemisphere::Right, "sphere", Mesh::Standard(164));
    assert!(high_sphere.exists());
    let added = mock.wb_calls("-add-to-spec-file");
    assert_eq!(added.len(), 1);
    assert_eq!(added[0][3], path_arg(high_sphere));

    let roi = ctx
        .layout
        .shape(Space::Mni, Hemisphere::Right, "roi", Mesh::Native);
    let math = mock.wb_calls("-metric-math");
    let combine = math.last().unwrap();
    assert_eq!(combine[1], "((atlas + individual) > 0)");
    assert_eq!(combine[2], path_arg(roi.clone()));

    let masks = mock.wb_calls("-metric-mask");
    assert_eq!(masks.len(), 2);
    for (mask, name) in masks.iter().zip(["thickness", "curvature"]) {
        let metric = ctx
            .layout
            .shape(Space::Mni, Hemisphere::Right, name, Mesh::Native);
        assert_eq!(mask[1], path_arg(metric.clone()));
        assert_eq!(mask[2], path_arg(roi.clone()));
        assert_eq!(mask[3], path_arg(metric));
    }

    let names = mock.wb_calls("-set-map-names");
    assert_eq!(names[0].last().unwrap(), "sub-01_R_Areal_Distortion_FS");
}

#[tokio::test]
async fn test_dense_maps_mask_with_mesh_rois() {
    let subject = SyntheticSubject::new();
    let (ctx, mut mock) = subject.context(false);
    mock.succeed_for(&["wb_command"]);

    DenseMaps.run(&ctx).await.unwrap();

    let scalars = mock.wb_calls("-cifti-create-dense-scalar");
    assert_eq!(scalars.len(), 12);
    let labels = mock.wb_calls("-cifti-create-label");
    // aparc and aparc.a2009s on three meshes; BA is left-only
    assert_eq!(labels.len(), 6);

    let native_thickness = ctx
        .layout
        .dense("thickness", Mesh::Native, crate::paths::DenseKind::Scalar);
    let call = scalars
        .iter()
        .find(|args| args[1] == path_arg(native_thickness.clone()))
        .unwrap();
    let native_roi = ctx
        .layout
        .shape(Space::Mni, Hemisphere::Left, "roi", Mesh::Native);
    assert_eq!(call[4], "-roi-left");
    assert_eq!(call[5], path_arg(native_roi));

    let high_sulc = ctx
        .layout
        .dense("sulc", Mesh::Standard(164), crate::paths::DenseKind::Scalar);
    let call = scalars
        .iter()
        .find(|args| args[1] == path_arg(high_sulc.clone()))
        .unwrap();
    assert!(!call.contains(&"-roi-left".to_string()));

    let low_curvature = ctx
        .layout
        .dense("curvature", Mesh::Standard(32), crate::paths::DenseKind::Scalar);
    let call = scalars
        .iter()
        .find(|args| args[1] == path_arg(low_curvature.clone()))
        .unwrap();
    assert!(call[5].ends_with("sub-01.L.atlasroi.32k_fs_LR.shape.gii"));

    let palettes = mock.wb_calls("-cifti-palette");
    assert_eq!(palettes.len(), 12);
    assert!(palettes
        .iter()
        .any(|args| args.contains(&"MODE_USER_SCALE".to_string())));
}

#[tokio::test]
async fn test_init_spec_files_adds_t1w_volumes() {
    let subject = SyntheticSubject::new();
    let (ctx, mut mock) = subject.context(false);
    mock.succeed_for(&["wb_command"]);
    let t1w = ctx.layout.volume(Space::T1w, "T1w");
    let t1w_mni = ctx.layout.volume(Space::Mni, "T1w");
    create_file(&t1w);
    create_file(&t1w_mni);

    InitSpecFiles.run(&ctx).await.unwrap();

    let spec = |space, mesh| ctx.layout.spec_file(space, mesh);
    assert_eq!(
        spec_entries(&mock),
        vec![
            entry(spec(Space::T1w, Mesh::Native), "INVALID", t1w.clone()),
            entry(spec(Space::Mni, Mesh::Native), "INVALID", t1w_mni.clone()),
            entry(spec(Space::Mni, Mesh::Standard(164)), "INVALID", t1w_mni.clone()),
            entry(spec(Space::Mni, Mesh::Standard(32)), "INVALID", t1w_mni),
            entry(spec(Space::T1w, Mesh::Standard(32)), "INVALID", t1w),
        ]
    );
    assert!(spec(Space::Mni, Mesh::Standard(32))
        .ends_with("MNINonLinear/fsaverage_LR32k/sub-01.32k_fs_LR.wb.spec"));
}

#[tokio::test]
async fn test_init_spec_files_requires_the_volume() {
    let subject = SyntheticSubject::new();
    let (ctx, mut mock) = subject.context(false);
    mock.succeed_for(&["wb_command"]);

    let err = InitSpecFiles.run(&ctx).await.unwrap_err();

    assert!(matches!(err, Error::MissingArtifact { .. }));
    assert!(mock.get_call_history().is_empty());
}

#[tokio::test]
async fn test_resample_low_res_fills_t1w_spec() {
    let subject = SyntheticSubject::new();
    let (ctx, mut mock) = subject.context(false);
    mock.succeed_for(&["wb_command"]);
    let stage = ResampleLowRes(Hemisphere::Left);
    for template in stage.inputs(&ctx) {
        create_file(&template);
    }
    // the mock does not write the resampled surfaces
    for output in stage.outputs(&ctx) {
        create_file(&output);
    }

    stage.run(&ctx).await.unwrap();

    let mesh = Mesh::Standard(32);
    let t1w_spec = path_arg(ctx.layout.spec_file(Space::T1w, mesh));
    let t1w_entries: Vec<_> = spec_entries(&mock)
        .into_iter()
        .filter(|(spec, _, _)| *spec == t1w_spec)
        .collect();
    let expected: Vec<_> = ["white", "midthickness", "pial", "inflated", "very_inflated"]
        .into_iter()
        .map(|name| {
            entry(
                ctx.layout.spec_file(Space::T1w, mesh),
                "CORTEX_LEFT",
                ctx.layout.surface(Space::T1w, Hemisphere::Left, name, mesh),
            )
        })
        .collect();
    assert_eq!(t1w_entries, expected);

    let mni_entries: Vec<_> = spec_entries(&mock)
        .into_iter()
        .filter(|(spec, _, _)| *spec == path_arg(ctx.layout.spec_file(Space::Mni, mesh)))
        .collect();
    assert_eq!(mni_entries.len(), 6);
    assert_eq!(
        mni_entries[0].2,
        path_arg(ctx.layout.surface(Space::Mni, Hemisphere::Left, "sphere", mesh))
    );
    assert!(mni_entries
        .iter()
        .all(|(_, structure, file)| structure == "CORTEX_LEFT" && file.contains("MNINonLinear")));
}

#[tokio::test]
async fn test_spec_dense_maps_entries() {
    let subject = SyntheticSubject::new();
    let (ctx, mut mock) = subject.context(false);
    mock.succeed_for(&["wb_command"]);
    for dense in SpecDenseMaps.inputs(&ctx) {
        create_file(&dense);
    }

    SpecDenseMaps.run(&ctx).await.unwrap();

    let targets = [
        (Space::T1w, Mesh::Native),
        (Space::Mni, Mesh::Native),
        (Space::Mni, Mesh::Standard(164)),
        (Space::Mni, Mesh::Standard(32)),
        (Space::T1w, Mesh::Standard(32)),
    ];
    let mut expected = Vec::new();
    for (space, mesh) in targets {
        let spec = ctx.layout.spec_file(space, mesh);
        for name in ["sulc", "thickness", "curvature"] {
            let dense = ctx.layout.dense(name, mesh, crate::paths::DenseKind::Scalar);
            expected.push(entry(spec.clone(), "INVALID", dense));
        }
        // BA is left-only and gets no dense label file
        for annot in ["aparc", "aparc.a2009s"] {
            let dense = ctx.layout.dense(annot, mesh, crate::paths::DenseKind::Label);
            expected.push(entry(spec.clone(), "INVALID", dense));
        }
    }
    let entries = spec_entries(&mock);
    assert_eq!(entries, expected);
    assert!(entries
        .iter()
        .all(|(_, _, file)| !file.contains("ArealDistortion")));
}
