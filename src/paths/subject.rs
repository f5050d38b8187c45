//! Output and input locations for one subject.
//!
//! All functions here are pure: they only join path components and never
//! touch the filesystem.

use std::path::{Path, PathBuf};

use super::naming::{Hemisphere, Mesh, Space};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectLayout {
    subject: String,
    subject_dir: PathBuf,
    freesurfer_dir: PathBuf,
    high_res_mesh: u32,
}

impl SubjectLayout {
    pub fn new(
        subject: &str,
        hcp_data: &Path,
        fs_subjects_dir: &Path,
        high_res_mesh: u32,
    ) -> Self {
        Self {
            subject: subject.to_string(),
            subject_dir: hcp_data.join(subject),
            freesurfer_dir: fs_subjects_dir.join(subject),
            high_res_mesh,
        }
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn high_res_mesh(&self) -> Mesh {
        Mesh::Standard(self.high_res_mesh)
    }

    // ---- FreeSurfer inputs ----

    pub fn freesurfer_dir(&self) -> &Path {
        &self.freesurfer_dir
    }

    /// `<fs>/mri/<name>.mgz`
    pub fn fs_volume(&self, name: &str) -> PathBuf {
        self.freesurfer_dir.join("mri").join(format!("{}.mgz", name))
    }

    /// `<fs>/surf/<lh|rh>.<name>`
    pub fn fs_surf(&self, hemisphere: Hemisphere, name: &str) -> PathBuf {
        self.freesurfer_dir
            .join("surf")
            .join(format!("{}.{}", hemisphere.fs_prefix(), name))
    }

    /// `<fs>/label/<lh|rh>.<annotation>.annot`
    pub fn fs_annotation(&self, hemisphere: Hemisphere, annotation: &str) -> PathBuf {
        self.freesurfer_dir
            .join("label")
            .join(format!("{}.{}.annot", hemisphere.fs_prefix(), annotation))
    }

    // ---- output tree ----

    pub fn space_dir(&self, space: Space) -> PathBuf {
        self.subject_dir.join(space.folder())
    }

    /// Folder holding files on `mesh` within `space`.
    ///
    /// Native files live in `Native/`, the high-res mesh in the space root
    /// and every other standard mesh in `fsaverage_LR<k>k/`.
    pub fn mesh_dir(&self, space: Space, mesh: Mesh) -> PathBuf {
        match mesh {
            Mesh::Native => self.space_dir(space).join("Native"),
            Mesh::Standard(k) if k == self.high_res_mesh => self.space_dir(space),
            Mesh::Standard(k) => self.space_dir(space).join(format!("fsaverage_LR{}k", k)),
        }
    }

    pub fn xfms_dir(&self) -> PathBuf {
        self.space_dir(Space::Mni).join("xfms")
    }

    pub fn rois_dir(&self) -> PathBuf {
        self.space_dir(Space::Mni).join("ROIs")
    }

    /// Every directory the pipeline writes into.
    pub fn directories(&self, low_res_meshes: &[u32]) -> Vec<PathBuf> {
        let t1w = self.space_dir(Space::T1w);
        let mni = self.space_dir(Space::Mni);
        let mut dirs = vec![
            self.mesh_dir(Space::T1w, Mesh::Native),
            self.mesh_dir(Space::Mni, Mesh::Native),
            self.xfms_dir(),
            self.rois_dir(),
            mni.join("Results"),
            t1w.join("fsaverage"),
            mni.join("fsaverage"),
        ];
        for &k in low_res_meshes {
            dirs.push(self.mesh_dir(Space::T1w, Mesh::Standard(k)));
            dirs.push(self.mesh_dir(Space::Mni, Mesh::Standard(k)));
        }
        dirs
    }

    /// `<space>/<name>.nii.gz`
    pub fn volume(&self, space: Space, name: &str) -> PathBuf {
        self.space_dir(space).join(format!("{}.nii.gz", name))
    }

    pub fn surface(&self, space: Space, hemisphere: Hemisphere, kind: &str, mesh: Mesh) -> PathBuf {
        self.mesh_dir(space, mesh).join(format!(
            "{}.{}.{}.{}.surf.gii",
            self.subject, hemisphere, kind, mesh
        ))
    }

    pub fn shape(&self, space: Space, hemisphere: Hemisphere, name: &str, mesh: Mesh) -> PathBuf {
        self.mesh_dir(space, mesh).join(format!(
            "{}.{}.{}.{}.shape.gii",
            self.subject, hemisphere, name, mesh
        ))
    }

    pub fn label(&self, space: Space, hemisphere: Hemisphere, name: &str, mesh: Mesh) -> PathBuf {
        self.mesh_dir(space, mesh).join(format!(
            "{}.{}.{}.{}.label.gii",
            self.subject, hemisphere, name, mesh
        ))
    }

    /// `<mesh dir>/<subject>.<mesh>.wb.spec`
    pub fn spec_file(&self, space: Space, mesh: Mesh) -> PathBuf {
        self.mesh_dir(space, mesh)
            .join(format!("{}.{}.wb.spec", self.subject, mesh))
    }

    /// Dense CIFTI file, always written in MNI space.
    pub fn dense(&self, name: &str, mesh: Mesh, kind: DenseKind) -> PathBuf {
        self.mesh_dir(Space::Mni, mesh).join(format!(
            "{}.{}.{}.{}.nii",
            self.subject,
            name,
            mesh,
            kind.extension()
        ))
    }

    // ---- transforms ----

    pub fn linear_transform(&self) -> PathBuf {
        self.xfms_dir().join("T1w2StandardLinear.mat")
    }

    pub fn nonlinear_warp(&self) -> PathBuf {
        self.xfms_dir().join("T1w2Standard_warp_noaffine.nii.gz")
    }

    pub fn inverse_nonlinear_warp(&self) -> PathBuf {
        self.xfms_dir().join("Standard2T1w_warp_noaffine.nii.gz")
    }

    pub fn fnirt_log(&self) -> PathBuf {
        self.xfms_dir().join("NonlinearReg_fromlinear.txt")
    }

    /// `MNINonLinear/ROIs/<name>.<resolution>.nii.gz`
    pub fn roi_volume(&self, name: &str, resolution: u32) -> PathBuf {
        self.rois_dir()
            .join(format!("{}.{}.nii.gz", name, resolution))
    }

    pub fn checkpoint_file(&self) -> PathBuf {
        self.space_dir(Space::Mni).join(".fs2hcp-checkpoint.json")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenseKind {
    Scalar,
    Label,
}

impl DenseKind {
    pub fn extension(self) -> &'static str {
        match self {
            DenseKind::Scalar => "dscalar",
            DenseKind::Label => "dlabel",
        }
    }
}
