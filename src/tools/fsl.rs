use std::path::Path;

use crate::subprocess::{ProcessCommand, ProcessCommandBuilder};

/// Reorient an image to the MNI standard orientation, in place when
/// `input == output`.
pub fn reorient_to_std(input: &Path, output: &Path) -> ProcessCommand {
    ProcessCommandBuilder::new("fslreorient2std")
        .path(input)
        .path(output)
        .build()
}

/// `fslmaths <input> <ops...> <output>`
pub fn fslmaths(input: &Path, ops: &[&str], output: &Path) -> ProcessCommand {
    ProcessCommandBuilder::new("fslmaths")
        .path(input)
        .args(ops)
        .path(output)
        .build()
}

/// `fslmaths <input> -mul <mask> <output>`
pub fn apply_mask(input: &Path, mask: &Path, output: &Path) -> ProcessCommand {
    ProcessCommandBuilder::new("fslmaths")
        .path(input)
        .arg("-mul")
        .path(mask)
        .path(output)
        .build()
}

/// 12 DOF spline-interpolated linear registration.
pub fn flirt(
    input: &Path,
    reference: &Path,
    out_matrix: &Path,
    out_image: &Path,
) -> ProcessCommand {
    ProcessCommandBuilder::new("flirt")
        .args(["-interp", "spline", "-dof", "12", "-in"])
        .path(input)
        .arg("-ref")
        .path(reference)
        .arg("-omat")
        .path(out_matrix)
        .arg("-o")
        .path(out_image)
        .build()
}

pub struct Fnirt<'a> {
    pub input: &'a Path,
    pub reference: &'a Path,
    pub reference_mask: &'a Path,
    pub field_out: &'a Path,
    pub log_out: &'a Path,
    pub config: &'a Path,
}

impl Fnirt<'_> {
    pub fn command(&self) -> ProcessCommand {
        ProcessCommandBuilder::new("fnirt")
            .flag_path("--in", self.input)
            .flag_path("--ref", self.reference)
            .flag_path("--refmask", self.reference_mask)
            .flag_path("--fout", self.field_out)
            .flag_path("--logout", self.log_out)
            .flag_path("--config", self.config)
            .build()
    }
}

/// Invert a warp field.
pub fn invwarp(warp: &Path, output: &Path, reference: &Path) -> ProcessCommand {
    ProcessCommandBuilder::new("invwarp")
        .arg("-w")
        .path(warp)
        .arg("-o")
        .path(output)
        .arg("-r")
        .path(reference)
        .build()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interpolation {
    Nearest,
    Trilinear,
    Spline,
}

impl Interpolation {
    fn flag(self) -> &'static str {
        match self {
            Interpolation::Nearest => "--interp=nn",
            Interpolation::Trilinear => "--interp=trilinear",
            Interpolation::Spline => "--interp=spline",
        }
    }
}

/// `applywarp`, optionally through a relative warp field and a pre-affine.
pub struct ApplyWarp<'a> {
    pub input: &'a Path,
    pub reference: &'a Path,
    pub output: &'a Path,
    pub interpolation: Interpolation,
    pub warp: Option<&'a Path>,
    pub premat: Option<&'a Path>,
}

impl<'a> ApplyWarp<'a> {
    /// Plain resampling onto `reference`'s grid.
    pub fn resample(
        input: &'a Path,
        reference: &'a Path,
        output: &'a Path,
        interpolation: Interpolation,
    ) -> Self {
        Self {
            input,
            reference,
            output,
            interpolation,
            warp: None,
            premat: None,
        }
    }

    pub fn through(mut self, premat: &'a Path, warp: &'a Path) -> Self {
        self.premat = Some(premat);
        self.warp = Some(warp);
        self
    }

    pub fn command(&self) -> ProcessCommand {
        let mut builder = ProcessCommandBuilder::new("applywarp");
        if self.warp.is_some() {
            builder = builder.arg("--rel");
        }
        builder = builder
            .arg(self.interpolation.flag())
            .arg("-i")
            .path(self.input)
            .arg("-r")
            .path(self.reference);
        if let Some(warp) = self.warp {
            builder = builder.arg("-w").path(warp);
        }
        if let Some(premat) = self.premat {
            builder = builder.flag_path("--premat", premat);
        }
        builder.arg("-o").path(self.output).build()
    }
}
