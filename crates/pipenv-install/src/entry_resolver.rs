//! Buildpack plan entry merging

use pipenv_lifecycle::BuildpackPlanEntry;

/// Decides how the layer serving a dependency is exposed, from the plan
/// entries later buildpacks and the platform asked for.
pub trait EntryResolver {
    /// Returns `(launch, build)` for all entries named `name`
    fn merge_layer_types(&self, name: &str, entries: &[BuildpackPlanEntry]) -> (bool, bool);
}

/// Ors the `launch` and `build` flags of every matching entry
#[derive(Debug, Clone, Copy, Default)]
pub struct PlanEntryResolver;

impl PlanEntryResolver {
    pub fn new() -> Self {
        PlanEntryResolver
    }
}

impl EntryResolver for PlanEntryResolver {
    fn merge_layer_types(&self, name: &str, entries: &[BuildpackPlanEntry]) -> (bool, bool) {
        entries
            .iter()
            .filter(|entry| entry.name == name)
            .fold((false, false), |(launch, build), entry| {
                (launch || entry.flag("launch"), build || entry.flag("build"))
            })
    }
}
