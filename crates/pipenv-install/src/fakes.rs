//! Recording test doubles for every collaborator trait.
//!
//! Each fake is cheap to clone and clones share their call log, so a test
//! keeps one handle and boxes another into the code under test.

use crate::entry_resolver::EntryResolver;
use crate::errors::BuildError;
use crate::executable::{Executable, Execution, ExecutionError, ExecutionOutput};
use crate::install_process::InstallProcess;
use crate::sbom_generator::SbomGenerator;
use crate::site_process::SitePackagesProcess;
use crate::venv_locator::VenvDirLocator;
use pipenv_lifecycle::{BuildpackPlanEntry, Layer, Sbom};
use pipenv_manifest::{ManifestError, VersionParser};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

struct CallLog<T>(Arc<Mutex<Vec<T>>>);

impl<T: Clone> CallLog<T> {
    fn record(&self, call: T) {
        if let Ok(mut calls) = self.0.lock() {
            calls.push(call);
        }
    }

    fn all(&self) -> Vec<T> {
        self.0.lock().map(|calls| calls.clone()).unwrap_or_default()
    }
}

impl<T> Clone for CallLog<T> {
    fn clone(&self) -> Self {
        CallLog(Arc::clone(&self.0))
    }
}

impl<T> Default for CallLog<T> {
    fn default() -> Self {
        CallLog(Arc::new(Mutex::new(Vec::new())))
    }
}

type PathStub<R> = Arc<dyn Fn(&Path) -> R>;

#[derive(Clone)]
pub struct FakeVersionParser {
    calls: CallLog<PathBuf>,
    stub: Arc<dyn Fn() -> Result<Option<String>, ManifestError>>,
}

impl FakeVersionParser {
    pub fn returning(stub: impl Fn() -> Result<Option<String>, ManifestError> + 'static) -> Self {
        FakeVersionParser {
            calls: CallLog::default(),
            stub: Arc::new(stub),
        }
    }

    pub fn calls(&self) -> Vec<PathBuf> {
        self.calls.all()
    }
}

impl VersionParser for FakeVersionParser {
    fn parse_version(&self, dir: &Path) -> Result<Option<String>, ManifestError> {
        self.calls.record(dir.to_path_buf());
        (self.stub)()
    }
}

#[derive(Clone)]
pub struct FakeExecutable {
    calls: CallLog<Execution>,
    stub: Arc<dyn Fn(&Execution) -> Result<ExecutionOutput, ExecutionError>>,
}

impl FakeExecutable {
    pub fn returning(stub: impl Fn(&Execution) -> Result<ExecutionOutput, ExecutionError> + 'static) -> Self {
        FakeExecutable {
            calls: CallLog::default(),
            stub: Arc::new(stub),
        }
    }

    pub fn succeeding() -> Self {
        Self::returning(|_| Ok(ExecutionOutput::default()))
    }

    pub fn calls(&self) -> Vec<Execution> {
        self.calls.all()
    }
}

impl Executable for FakeExecutable {
    fn execute(&self, execution: &Execution) -> Result<ExecutionOutput, ExecutionError> {
        self.calls.record(execution.clone());
        (self.stub)(execution)
    }
}

#[derive(Clone)]
pub struct FakeEntryResolver {
    calls: CallLog<(String, Vec<BuildpackPlanEntry>)>,
    launch: bool,
    build: bool,
}

impl FakeEntryResolver {
    pub fn returning(launch: bool, build: bool) -> Self {
        FakeEntryResolver {
            calls: CallLog::default(),
            launch,
            build,
        }
    }

    pub fn calls(&self) -> Vec<(String, Vec<BuildpackPlanEntry>)> {
        self.calls.all()
    }
}

impl EntryResolver for FakeEntryResolver {
    fn merge_layer_types(&self, name: &str, entries: &[BuildpackPlanEntry]) -> (bool, bool) {
        self.calls.record((name.to_string(), entries.to_vec()));
        (self.launch, self.build)
    }
}

/// Paths an install was asked to work with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallCall {
    pub working_dir: PathBuf,
    pub target_path: PathBuf,
    pub cache_path: PathBuf,
}

#[derive(Clone)]
pub struct FakeInstallProcess {
    calls: CallLog<InstallCall>,
    stub: PathStub<Result<(), BuildError>>,
}

impl FakeInstallProcess {
    pub fn returning(stub: impl Fn(&Path) -> Result<(), BuildError> + 'static) -> Self {
        FakeInstallProcess {
            calls: CallLog::default(),
            stub: Arc::new(stub),
        }
    }

    pub fn succeeding() -> Self {
        Self::returning(|_| Ok(()))
    }

    pub fn calls(&self) -> Vec<InstallCall> {
        self.calls.all()
    }
}

impl InstallProcess for FakeInstallProcess {
    fn execute(&self, working_dir: &Path, target_layer: &mut Layer, cache_layer: &Layer) -> Result<(), BuildError> {
        self.calls.record(InstallCall {
            working_dir: working_dir.to_path_buf(),
            target_path: target_layer.path.clone(),
            cache_path: cache_layer.path.clone(),
        });
        (self.stub)(working_dir)
    }
}

#[derive(Clone)]
pub struct FakeVenvDirLocator {
    calls: CallLog<PathBuf>,
    stub: PathStub<Result<PathBuf, BuildError>>,
}

impl FakeVenvDirLocator {
    pub fn returning(stub: impl Fn(&Path) -> Result<PathBuf, BuildError> + 'static) -> Self {
        FakeVenvDirLocator {
            calls: CallLog::default(),
            stub: Arc::new(stub),
        }
    }

    pub fn calls(&self) -> Vec<PathBuf> {
        self.calls.all()
    }
}

impl VenvDirLocator for FakeVenvDirLocator {
    fn locate_venv_dir(&self, target: &Path) -> Result<PathBuf, BuildError> {
        self.calls.record(target.to_path_buf());
        (self.stub)(target)
    }
}

#[derive(Clone)]
pub struct FakeSitePackagesProcess {
    calls: CallLog<PathBuf>,
    stub: PathStub<Result<PathBuf, BuildError>>,
}

impl FakeSitePackagesProcess {
    pub fn returning(stub: impl Fn(&Path) -> Result<PathBuf, BuildError> + 'static) -> Self {
        FakeSitePackagesProcess {
            calls: CallLog::default(),
            stub: Arc::new(stub),
        }
    }

    pub fn calls(&self) -> Vec<PathBuf> {
        self.calls.all()
    }
}

impl SitePackagesProcess for FakeSitePackagesProcess {
    fn execute(&self, layer_path: &Path) -> Result<PathBuf, BuildError> {
        self.calls.record(layer_path.to_path_buf());
        (self.stub)(layer_path)
    }
}

#[derive(Clone)]
pub struct FakeSbomGenerator {
    calls: CallLog<PathBuf>,
    stub: PathStub<Result<Sbom, BuildError>>,
}

impl FakeSbomGenerator {
    pub fn returning(stub: impl Fn(&Path) -> Result<Sbom, BuildError> + 'static) -> Self {
        FakeSbomGenerator {
            calls: CallLog::default(),
            stub: Arc::new(stub),
        }
    }

    pub fn calls(&self) -> Vec<PathBuf> {
        self.calls.all()
    }
}

impl SbomGenerator for FakeSbomGenerator {
    fn generate(&self, dir: &Path) -> Result<Sbom, BuildError> {
        self.calls.record(dir.to_path_buf());
        (self.stub)(dir)
    }
}
