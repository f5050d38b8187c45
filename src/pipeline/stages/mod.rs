pub mod dense;
pub mod fs_lr;
pub mod hemisphere;
pub mod registration;
pub mod volumes;

use crate::paths::Hemisphere;

use super::stage::Stage;

/// The conversion in execution order.
pub fn standard_stages() -> Vec<Box<dyn Stage>> {
    let mut stages: Vec<Box<dyn Stage>> = vec![
        Box::new(volumes::Scaffold),
        Box::new(volumes::ConvertT1w),
        Box::new(volumes::ImportSegmentations),
        Box::new(volumes::BrainMask),
        Box::new(registration::RegisterToMni),
        Box::new(volumes::WarpVolumes),
        Box::new(volumes::InitSpecFiles),
        Box::new(volumes::SubcorticalRois),
        Box::new(volumes::CrasOffset),
    ];
    for side in Hemisphere::ALL {
        stages.push(Box::new(hemisphere::NativeSurfaces(side)));
        stages.push(Box::new(hemisphere::Midthickness(side)));
        stages.push(Box::new(hemisphere::Spheres(side)));
        stages.push(Box::new(hemisphere::NativeMetrics(side)));
        stages.push(Box::new(hemisphere::NativeLabels(side)));
        stages.push(Box::new(fs_lr::RegisterFsLr(side)));
        stages.push(Box::new(fs_lr::ResampleHighRes(side)));
        stages.push(Box::new(fs_lr::ResampleLowRes(side)));
    }
    stages.push(Box::new(dense::DenseMaps));
    stages.push(Box::new(dense::SpecDenseMaps));
    stages
}
