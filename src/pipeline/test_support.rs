use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

use crate::paths::{SubjectLayout, TemplatePaths};
use crate::settings::Settings;
use crate::subprocess::{CommandRunner, MockProcessRunner};

use super::context::PipelineContext;

pub const SUBJECT: &str = "sub-01";

/// A recon-all subject plus template tree laid out under one temp dir.
pub struct SyntheticSubject {
    pub root: TempDir,
}

impl SyntheticSubject {
    pub fn new() -> Self {
        let root = TempDir::new().unwrap();
        let subject = Self { root };

        for volume in ["T1", "wmparc", "aparc+aseg", "aparc.a2009s+aseg", "brain.finalsurfs"] {
            subject.touch(&format!("fs/{}/mri/{}.mgz", SUBJECT, volume));
        }
        for prefix in ["lh", "rh"] {
            for surf in ["white", "pial", "sphere", "sphere.reg", "sulc", "thickness", "curv"] {
                subject.touch(&format!("fs/{}/surf/{}.{}", SUBJECT, prefix, surf));
            }
            for annot in ["aparc", "aparc.a2009s"] {
                subject.touch(&format!("fs/{}/label/{}.{}.annot", SUBJECT, prefix, annot));
            }
        }
        // BA only on the left: no dense label file for it
        subject.touch(&format!("fs/{}/label/lh.BA.annot", SUBJECT));
        subject
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.root.path().join(relative)
    }

    pub fn touch(&self, relative: &str) {
        let path = self.path(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"").unwrap();
    }

    pub fn hcp_data(&self) -> PathBuf {
        self.path("hcp")
    }

    pub fn layout(&self, settings: &Settings) -> SubjectLayout {
        SubjectLayout::new(
            SUBJECT,
            &self.hcp_data(),
            &self.path("fs"),
            settings.high_res_mesh,
        )
    }

    pub fn templates(&self) -> TemplatePaths {
        TemplatePaths::new(&self.path("fsl"), &self.path("templates"))
    }

    pub fn context(&self, dry_run: bool) -> (PipelineContext, MockProcessRunner) {
        self.context_with(Settings::default(), dry_run)
    }

    pub fn context_with(
        &self,
        settings: Settings,
        dry_run: bool,
    ) -> (PipelineContext, MockProcessRunner) {
        let (runner, mock) = CommandRunner::mock(dry_run);
        let ctx = PipelineContext::new(
            runner,
            self.layout(&settings),
            self.templates(),
            settings,
        )
        .unwrap();
        (ctx, mock)
    }
}
