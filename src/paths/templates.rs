//! Locations of FSL standard images and the HCP surface templates.

use std::path::{Path, PathBuf};

use super::naming::Hemisphere;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplatePaths {
    fsl_dir: PathBuf,
    templates_dir: PathBuf,
}

impl TemplatePaths {
    pub fn new(fsl_dir: &Path, templates_dir: &Path) -> Self {
        Self {
            fsl_dir: fsl_dir.to_path_buf(),
            templates_dir: templates_dir.to_path_buf(),
        }
    }

    fn fsl_standard(&self, name: &str) -> PathBuf {
        self.fsl_dir.join("data").join("standard").join(name)
    }

    /// FNIRT 2mm T1w config
    pub fn fnirt_config(&self) -> PathBuf {
        self.fsl_dir
            .join("etc")
            .join("flirtsch")
            .join("T1_2_MNI152_2mm.cnf")
    }

    pub fn mni_2mm(&self) -> PathBuf {
        self.fsl_standard("MNI152_T1_2mm.nii.gz")
    }

    pub fn mni_2mm_brain(&self) -> PathBuf {
        self.fsl_standard("MNI152_T1_2mm_brain.nii.gz")
    }

    pub fn mni_2mm_brain_mask(&self) -> PathBuf {
        self.fsl_standard("MNI152_T1_2mm_brain_mask_dil.nii.gz")
    }

    pub fn freesurfer_labels(&self) -> PathBuf {
        self.templates_dir
            .join("hcp_config")
            .join("FreeSurferAllLut.txt")
    }

    pub fn subcortical_labels(&self) -> PathBuf {
        self.templates_dir
            .join("FreeSurferSubcorticalLabelTableLut.txt")
    }

    pub fn grayordinates_dir(&self) -> PathBuf {
        self.templates_dir.join("91282_Greyordinates")
    }

    pub fn surface_atlas_dir(&self) -> PathBuf {
        self.templates_dir.join("standard_mesh_atlases")
    }

    pub fn atlas_rois(&self, resolution: u32) -> PathBuf {
        self.grayordinates_dir()
            .join(format!("Atlas_ROIs.{}.nii.gz", resolution))
    }

    pub fn average_wmparc(&self) -> PathBuf {
        self.surface_atlas_dir().join("Avgwmparc.nii.gz")
    }

    /// Standard fs_LR sphere copied in as the subject's high-res sphere.
    pub fn standard_sphere(&self, hemisphere: Hemisphere, mesh_k: u32) -> PathBuf {
        self.surface_atlas_dir().join(format!(
            "fsaverage.{}_LR.spherical_std.{}k_fs_LR.surf.gii",
            hemisphere, mesh_k
        ))
    }

    pub fn low_res_sphere(&self, hemisphere: Hemisphere, mesh_k: u32) -> PathBuf {
        self.surface_atlas_dir()
            .join(format!("{}.sphere.{}k_fs_LR.surf.gii", hemisphere, mesh_k))
    }

    pub fn flat_map(&self, hemisphere: Hemisphere, mesh_k: u32) -> PathBuf {
        self.surface_atlas_dir().join(format!(
            "colin.cerebral.{}.flat.{}k_fs_LR.surf.gii",
            hemisphere, mesh_k
        ))
    }

    /// FreeSurfer fsaverage sphere on the fs_<H> mesh.
    pub fn fsaverage_sphere(&self, hemisphere: Hemisphere, mesh_k: u32) -> PathBuf {
        self.surface_atlas_dir()
            .join(format!("fs_{}", hemisphere))
            .join(format!(
                "fsaverage.{h}.sphere.{k}k_fs_{h}.surf.gii",
                h = hemisphere,
                k = mesh_k
            ))
    }

    /// fsaverage sphere deformed onto fs_LR.
    pub fn fs_to_fs_lr_sphere(&self, hemisphere: Hemisphere, mesh_k: u32) -> PathBuf {
        self.surface_atlas_dir()
            .join(format!("fs_{}", hemisphere))
            .join(format!(
                "fs_{h}-to-fs_LR_fsaverage.{h}_LR.spherical_std.{k}k_fs_{h}.surf.gii",
                h = hemisphere,
                k = mesh_k
            ))
    }

    pub fn high_res_atlas_roi(&self, hemisphere: Hemisphere, mesh_k: u32) -> PathBuf {
        self.surface_atlas_dir()
            .join(format!("{}.atlasroi.{}k_fs_LR.shape.gii", hemisphere, mesh_k))
    }

    pub fn low_res_atlas_roi(&self, hemisphere: Hemisphere, mesh_k: u32) -> PathBuf {
        self.grayordinates_dir()
            .join(format!("{}.atlasroi.{}k_fs_LR.shape.gii", hemisphere, mesh_k))
    }
}
