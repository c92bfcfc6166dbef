//! Cloud Native Buildpacks lifecycle plumbing
//!
//! Everything the buildpack exchanges with the lifecycle lives here:
//! the detect build plan, the buildpack plan read during build, the layers
//! directory with its TOML descriptors and `env/` files, and SBOM output.
//! None of it knows about pipenv.

pub mod buildpack;
pub mod context;
pub mod environment;
pub mod errors;
pub mod layer;
pub mod plan;
pub mod sbom;

pub use buildpack::BuildpackInfo;
pub use context::{BuildContext, DetectContext, DetectOutcome, Platform, DETECT_FAIL_EXIT_CODE};
pub use environment::{EnvDelta, Environment};
pub use errors::LifecycleError;
pub use layer::{BuildResult, Layer, Layers};
pub use plan::{
    write_build_plan, BuildPlan, BuildPlanProvision, BuildPlanRequirement, BuildpackPlan,
    BuildpackPlanEntry,
};
pub use sbom::{FormattedSbom, Sbom, SbomError, SbomFormat, SbomPackage};
