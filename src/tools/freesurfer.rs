use std::path::Path;

use crate::subprocess::{ProcessCommand, ProcessCommandBuilder};

/// `mri_convert <input> <output>`
pub fn mri_convert(input: &Path, output: &Path) -> ProcessCommand {
    ProcessCommandBuilder::new("mri_convert")
        .path(input)
        .path(output)
        .build()
}

/// Nearest-neighbour conversion resliced like `like`, for label volumes.
pub fn mri_convert_labels(input: &Path, like: &Path, output: &Path) -> ProcessCommand {
    ProcessCommandBuilder::new("mri_convert")
        .args(["-rt", "nearest", "-rl"])
        .path(like)
        .path(input)
        .path(output)
        .build()
}

/// `mri_info <volume>`; stdout only goes to the debug log.
pub fn mri_info(volume: &Path) -> ProcessCommand {
    ProcessCommandBuilder::new("mri_info")
        .path(volume)
        .suppress_stdout()
        .build()
}

/// Convert a FreeSurfer binary surface to GIFTI.
pub fn mris_convert(surface: &Path, output: &Path) -> ProcessCommand {
    ProcessCommandBuilder::new("mris_convert")
        .path(surface)
        .path(output)
        .build()
}

/// Convert per-vertex scalar data (curv, sulc, thickness) defined on `surface`.
pub fn mris_convert_metric(data: &Path, surface: &Path, output: &Path) -> ProcessCommand {
    ProcessCommandBuilder::new("mris_convert")
        .arg("-c")
        .path(data)
        .path(surface)
        .path(output)
        .build()
}

/// Convert an annotation defined on `surface` to a GIFTI label file.
pub fn mris_convert_annotation(
    annotation: &Path,
    surface: &Path,
    output: &Path,
) -> ProcessCommand {
    ProcessCommandBuilder::new("mris_convert")
        .arg("--annot")
        .path(annotation)
        .path(surface)
        .path(output)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_conversion_reslices_like_reference() {
        let cmd = mri_convert_labels(
            Path::new("fs/mri/wmparc.mgz"),
            Path::new("T1w/T1w.nii.gz"),
            Path::new("T1w/wmparc.nii.gz"),
        );
        assert_eq!(
            cmd.display(),
            "mri_convert -rt nearest -rl T1w/T1w.nii.gz fs/mri/wmparc.mgz T1w/wmparc.nii.gz"
        );
    }

    #[test]
    fn test_mri_info_suppresses_stdout() {
        assert!(mri_info(Path::new("brain.finalsurfs.mgz")).suppress_stdout);
    }
}
