//! Naming vocabulary shared by every derived path.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hemisphere {
    Left,
    Right,
}

impl Hemisphere {
    pub const ALL: [Hemisphere; 2] = [Hemisphere::Left, Hemisphere::Right];

    /// HCP file-name letter: `L` or `R`.
    pub fn letter(self) -> &'static str {
        match self {
            Hemisphere::Left => "L",
            Hemisphere::Right => "R",
        }
    }

    /// FreeSurfer file prefix: `lh` or `rh`.
    pub fn fs_prefix(self) -> &'static str {
        match self {
            Hemisphere::Left => "lh",
            Hemisphere::Right => "rh",
        }
    }

    /// Workbench structure tag.
    pub fn structure(self) -> &'static str {
        match self {
            Hemisphere::Left => "CORTEX_LEFT",
            Hemisphere::Right => "CORTEX_RIGHT",
        }
    }
}

impl fmt::Display for Hemisphere {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.letter())
    }
}

/// Coordinate space of an output subtree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Space {
    /// Subject's native volume space (`T1w/`).
    T1w,
    /// Nonlinearly registered MNI space (`MNINonLinear/`).
    Mni,
}

impl Space {
    pub fn folder(self) -> &'static str {
        match self {
            Space::T1w => "T1w",
            Space::Mni => "MNINonLinear",
        }
    }
}

/// Surface mesh a file is defined on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mesh {
    /// The subject's own FreeSurfer mesh.
    Native,
    /// Standard fs_LR mesh with the given vertex count in thousands.
    Standard(u32),
}

impl fmt::Display for Mesh {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mesh::Native => f.write_str("native"),
            Mesh::Standard(k) => write!(f, "{}k_fs_LR", k),
        }
    }
}

/// Workbench surface kinds used as file-name components.
pub mod surface {
    pub const WHITE: &str = "white";
    pub const PIAL: &str = "pial";
    pub const MIDTHICKNESS: &str = "midthickness";
    pub const INFLATED: &str = "inflated";
    pub const VERY_INFLATED: &str = "very_inflated";
    pub const SPHERE: &str = "sphere";
    pub const SPHERE_REG: &str = "sphere.reg";
    pub const SPHERE_REG_LR: &str = "sphere.reg.reg_LR";
    pub const FLAT: &str = "flat";
}

/// Per-vertex metric names.
pub mod metric {
    pub const SULC: &str = "sulc";
    pub const THICKNESS: &str = "thickness";
    pub const CURVATURE: &str = "curvature";
    pub const AREAL_DISTORTION_FS: &str = "ArealDistortion_FS";
    pub const ROI: &str = "roi";
    pub const ATLAS_ROI: &str = "atlasroi";
}

/// FreeSurfer annotations converted to label files when present.
pub const ANNOTATIONS: [&str; 3] = ["aparc", "aparc.a2009s", "BA"];

/// FreeSurfer segmentation volumes imported with label tables.
pub const SEGMENTATIONS: [&str; 3] = ["wmparc", "aparc.a2009s+aseg", "aparc+aseg"];
