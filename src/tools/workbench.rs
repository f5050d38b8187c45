//! `wb_command` invocations.

use std::path::Path;

use crate::subprocess::{ProcessCommand, ProcessCommandBuilder};

fn wb(subcommand: &str) -> ProcessCommandBuilder {
    ProcessCommandBuilder::new("wb_command").arg(subcommand)
}

/// Structure tag for volumes and other non-surface entries in a spec file.
pub const STRUCTURE_INVALID: &str = "INVALID";

pub fn add_to_spec_file(spec: &Path, structure: &str, file: &Path) -> ProcessCommand {
    wb("-add-to-spec-file")
        .path(spec)
        .arg(structure)
        .path(file)
        .build()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceType {
    Anatomical(Option<&'static str>),
    Spherical,
}

pub fn set_structure(file: &Path, structure: &str) -> ProcessCommand {
    wb("-set-structure").path(file).arg(structure).build()
}

pub fn set_surface_structure(file: &Path, structure: &str, kind: SurfaceType) -> ProcessCommand {
    let builder = wb("-set-structure")
        .path(file)
        .arg(structure)
        .arg("-surface-type");
    match kind {
        SurfaceType::Anatomical(None) => builder.arg("ANATOMICAL"),
        SurfaceType::Anatomical(Some(secondary)) => builder
            .arg("ANATOMICAL")
            .arg("-surface-secondary-type")
            .arg(secondary),
        SurfaceType::Spherical => builder.arg("SPHERICAL"),
    }
    .build()
}

pub fn surface_apply_affine(input: &Path, affine: &Path, output: &Path) -> ProcessCommand {
    wb("-surface-apply-affine")
        .path(input)
        .path(affine)
        .path(output)
        .build()
}

/// Apply a FLIRT matrix, which needs the source and target volumes.
pub fn surface_apply_flirt_affine(
    input: &Path,
    affine: &Path,
    output: &Path,
    source_volume: &Path,
    target_volume: &Path,
) -> ProcessCommand {
    wb("-surface-apply-affine")
        .path(input)
        .path(affine)
        .path(output)
        .arg("-flirt")
        .path(source_volume)
        .path(target_volume)
        .build()
}

/// Surfaces are warped with the inverse field; FNIRT also wants the forward one.
pub fn surface_apply_warpfield(
    input: &Path,
    inverse_warp: &Path,
    output: &Path,
    forward_warp: &Path,
) -> ProcessCommand {
    wb("-surface-apply-warpfield")
        .path(input)
        .path(inverse_warp)
        .path(output)
        .arg("-fnirt")
        .path(forward_warp)
        .build()
}

pub fn surface_average(output: &Path, surfaces: &[&Path]) -> ProcessCommand {
    let mut builder = wb("-surface-average").path(output);
    for surface in surfaces {
        builder = builder.arg("-surf").path(surface);
    }
    builder.build()
}

pub fn surface_generate_inflated(
    midthickness: &Path,
    inflated: &Path,
    very_inflated: &Path,
    iterations_scale: f64,
) -> ProcessCommand {
    wb("-surface-generate-inflated")
        .path(midthickness)
        .path(inflated)
        .path(very_inflated)
        .arg("-iterations-scale")
        .arg(&iterations_scale.to_string())
        .build()
}

pub fn surface_resample(
    input: &Path,
    current_sphere: &Path,
    new_sphere: &Path,
    output: &Path,
) -> ProcessCommand {
    wb("-surface-resample")
        .path(input)
        .path(current_sphere)
        .path(new_sphere)
        .arg("BARYCENTRIC")
        .path(output)
        .build()
}

pub fn surface_vertex_areas(surface: &Path, output: &Path) -> ProcessCommand {
    wb("-surface-vertex-areas")
        .path(surface)
        .path(output)
        .build()
}

pub fn surface_sphere_project_unproject(
    sphere_in: &Path,
    project_to: &Path,
    unproject_using: &Path,
    output: &Path,
) -> ProcessCommand {
    wb("-surface-sphere-project-unproject")
        .path(sphere_in)
        .path(project_to)
        .path(unproject_using)
        .path(output)
        .build()
}

/// `-metric-math <expression> <output> -var <name> <file> ...`
pub fn metric_math(expression: &str, output: &Path, vars: &[(&str, &Path)]) -> ProcessCommand {
    let mut builder = wb("-metric-math").arg(expression).path(output);
    for (name, file) in vars {
        builder = builder.arg("-var").arg(name).path(file);
    }
    builder.build()
}

/// Name the first map of a metric, label or CIFTI file.
pub fn set_map_name(file: &Path, name: &str) -> ProcessCommand {
    wb("-set-map-names")
        .path(file)
        .args(["-map", "1"])
        .arg(name)
        .build()
}

/// Palette metadata applied to metrics and dense scalars.
///
/// `options` is a whitespace-separated `wb_command` option list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub mode: &'static str,
    pub options: &'static str,
}

impl Palette {
    /// Sulc and curvature.
    pub const SHAPE: Palette = Palette {
        mode: "MODE_AUTO_SCALE_PERCENTAGE",
        options: concat!(
            "-pos-percent 2 98 ",
            "-palette-name Gray_Interp ",
            "-disp-pos true -disp-neg true -disp-zero true",
        ),
    };

    pub const THICKNESS: Palette = Palette {
        mode: "MODE_AUTO_SCALE_PERCENTAGE",
        options: concat!(
            "-pos-percent 4 96 ",
            "-interpolate true ",
            "-palette-name videen_style ",
            "-disp-pos true -disp-neg false -disp-zero false",
        ),
    };

    /// Native areal distortion metrics.
    pub const AREAL_DISTORTION: Palette = Palette {
        mode: "MODE_AUTO_SCALE",
        options: concat!(
            "-palette-name ROY-BIG-BL ",
            "-thresholding THRESHOLD_TYPE_NORMAL THRESHOLD_TEST_SHOW_OUTSIDE -1 1",
        ),
    };

    /// Areal distortion dense scalars.
    pub const AREAL_DISTORTION_DENSE: Palette = Palette {
        mode: "MODE_USER_SCALE",
        options: concat!(
            "-pos-user 0 1 ",
            "-neg-user 0 -1 ",
            "-interpolate true ",
            "-palette-name ROY-BIG-BL ",
            "-disp-pos true -disp-neg true -disp-zero false",
        ),
    };
}

pub fn metric_palette(metric: &Path, palette: Palette) -> ProcessCommand {
    wb("-metric-palette")
        .path(metric)
        .arg(palette.mode)
        .args(palette.options.split_whitespace())
        .build()
}

/// In-place palette update of a CIFTI file.
pub fn cifti_palette(cifti: &Path, palette: Palette) -> ProcessCommand {
    wb("-cifti-palette")
        .path(cifti)
        .arg(palette.mode)
        .path(cifti)
        .args(palette.options.split_whitespace())
        .build()
}

pub fn metric_fill_holes(surface: &Path, metric: &Path, output: &Path) -> ProcessCommand {
    wb("-metric-fill-holes")
        .path(surface)
        .path(metric)
        .path(output)
        .build()
}

pub fn metric_remove_islands(surface: &Path, metric: &Path, output: &Path) -> ProcessCommand {
    wb("-metric-remove-islands")
        .path(surface)
        .path(metric)
        .path(output)
        .build()
}

/// Nearest-value dilation by `distance_mm` along `surface`.
pub fn metric_dilate(
    metric: &Path,
    surface: &Path,
    distance_mm: u32,
    output: &Path,
) -> ProcessCommand {
    wb("-metric-dilate")
        .path(metric)
        .path(surface)
        .arg(&distance_mm.to_string())
        .path(output)
        .arg("-nearest")
        .build()
}

/// Area-adaptive metric resampling between spheres.
pub struct MetricResample<'a> {
    pub input: &'a Path,
    pub current_sphere: &'a Path,
    pub new_sphere: &'a Path,
    pub output: &'a Path,
    pub current_area: &'a Path,
    pub new_area: &'a Path,
    pub current_roi: Option<&'a Path>,
}

impl MetricResample<'_> {
    pub fn command(&self) -> ProcessCommand {
        let builder = wb("-metric-resample")
            .path(self.input)
            .path(self.current_sphere)
            .path(self.new_sphere)
            .arg("ADAP_BARY_AREA")
            .path(self.output)
            .arg("-area-surfs")
            .path(self.current_area)
            .path(self.new_area);
        match self.current_roi {
            Some(roi) => builder.arg("-current-roi").path(roi),
            None => builder,
        }
        .build()
    }
}

/// Barycentric resample keeping the largest weight, for ROI masks.
pub fn metric_resample_largest(
    input: &Path,
    current_sphere: &Path,
    new_sphere: &Path,
    output: &Path,
) -> ProcessCommand {
    wb("-metric-resample")
        .path(input)
        .path(current_sphere)
        .path(new_sphere)
        .arg("BARYCENTRIC")
        .path(output)
        .arg("-largest")
        .build()
}

/// Zero `metric` outside `mask`.
pub fn metric_mask(metric: &Path, mask: &Path, output: &Path) -> ProcessCommand {
    wb("-metric-mask")
        .path(metric)
        .path(mask)
        .path(output)
        .build()
}

pub fn label_resample(
    input: &Path,
    current_sphere: &Path,
    new_sphere: &Path,
    output: &Path,
) -> ProcessCommand {
    wb("-label-resample")
        .path(input)
        .path(current_sphere)
        .path(new_sphere)
        .arg("BARYCENTRIC")
        .path(output)
        .arg("-largest")
        .build()
}

pub fn gifti_label_add_prefix(input: &Path, prefix: &str, output: &Path) -> ProcessCommand {
    wb("-gifti-label-add-prefix")
        .path(input)
        .arg(prefix)
        .path(output)
        .build()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelImport {
    /// Keep only labels that occur in the volume.
    DropUnused,
    /// Zero voxels whose value is not in the label table.
    DiscardOthers,
}

pub fn volume_label_import(
    input: &Path,
    label_table: &Path,
    output: &Path,
    mode: LabelImport,
) -> ProcessCommand {
    wb("-volume-label-import")
        .path(input)
        .path(label_table)
        .path(output)
        .arg(match mode {
            LabelImport::DropUnused => "-drop-unused-labels",
            LabelImport::DiscardOthers => "-discard-others",
        })
        .build()
}

pub fn volume_fill_holes(input: &Path, output: &Path) -> ProcessCommand {
    wb("-volume-fill-holes").path(input).path(output).build()
}

/// Left and right medial-wall masks for dense file creation.
#[derive(Debug, Clone, Copy)]
pub struct HemisphereRois<'a> {
    pub left: &'a Path,
    pub right: &'a Path,
}

pub fn cifti_create_dense_scalar(
    output: &Path,
    left: &Path,
    right: &Path,
    rois: Option<HemisphereRois<'_>>,
) -> ProcessCommand {
    cifti_create("-cifti-create-dense-scalar", "metric", output, left, right, rois)
}

pub fn cifti_create_label(
    output: &Path,
    left: &Path,
    right: &Path,
    rois: Option<HemisphereRois<'_>>,
) -> ProcessCommand {
    cifti_create("-cifti-create-label", "label", output, left, right, rois)
}

fn cifti_create(
    subcommand: &str,
    data: &str,
    output: &Path,
    left: &Path,
    right: &Path,
    rois: Option<HemisphereRois<'_>>,
) -> ProcessCommand {
    let mut builder = wb(subcommand)
        .path(output)
        .arg(&format!("-left-{}", data))
        .path(left);
    if let Some(rois) = rois {
        builder = builder.arg("-roi-left").path(rois.left);
    }
    builder = builder.arg(&format!("-right-{}", data)).path(right);
    if let Some(rois) = rois {
        builder = builder.arg("-roi-right").path(rois.right);
    }
    builder.build()
}
