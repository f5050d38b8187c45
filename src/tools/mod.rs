//! Command constructors for the external neuroimaging tools.
//!
//! Each function only assembles a [`ProcessCommand`](crate::subprocess::ProcessCommand);
//! running it is the caller's business.

pub mod freesurfer;
pub mod fsl;
pub mod workbench;
