//! Common test utilities and helpers

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Builder for a FreeSurfer subject tree plus output and template roots
pub struct SubjectTreeBuilder {
    subject: String,
    hemispheres: Vec<&'static str>,
    annotations: Vec<&'static str>,
}

impl SubjectTreeBuilder {
    pub fn new(subject: &str) -> Self {
        Self {
            subject: subject.to_string(),
            hemispheres: vec!["lh", "rh"],
            annotations: vec!["aparc", "aparc.a2009s"],
        }
    }

    pub fn build(self) -> Result<SubjectTree> {
        let root = TempDir::new()?;
        let fs_subject = root.path().join("subjects").join(&self.subject);

        let mut files: Vec<PathBuf> = ["T1", "wmparc", "aparc+aseg", "brain.finalsurfs"]
            .iter()
            .map(|v| PathBuf::from(format!("mri/{}.mgz", v)))
            .collect();
        for h in &self.hemispheres {
            for surf in ["white", "pial", "sphere", "sphere.reg", "sulc", "thickness", "curv"] {
                files.push(PathBuf::from(format!("surf/{}.{}", h, surf)));
            }
            for annot in &self.annotations {
                files.push(PathBuf::from(format!("label/{}.{}.annot", h, annot)));
            }
        }

        for file in files {
            let path = fs_subject.join(file);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, b"")?;
        }
        fs::create_dir_all(root.path().join("fsl"))?;
        fs::create_dir_all(root.path().join("templates"))?;

        Ok(SubjectTree {
            subject: self.subject,
            root,
        })
    }
}

/// A synthetic subject on disk, removed on drop
pub struct SubjectTree {
    pub subject: String,
    root: TempDir,
}

impl SubjectTree {
    pub fn subjects_dir(&self) -> PathBuf {
        self.root.path().join("subjects")
    }

    pub fn hcp_data(&self) -> PathBuf {
        self.root.path().join("hcp")
    }

    pub fn fsl_dir(&self) -> PathBuf {
        self.root.path().join("fsl")
    }

    pub fn templates_dir(&self) -> PathBuf {
        self.root.path().join("templates")
    }

    pub fn root(&self) -> &Path {
        self.root.path()
    }

    /// Root directory flags for the CLI
    pub fn root_args(&self) -> Vec<String> {
        vec![
            "--hcp-data-dir".to_string(),
            self.hcp_data().display().to_string(),
            "--fs-subjects-dir".to_string(),
            self.subjects_dir().display().to_string(),
            "--fsl-dir".to_string(),
            self.fsl_dir().display().to_string(),
            "--templates-dir".to_string(),
            self.templates_dir().display().to_string(),
        ]
    }
}
