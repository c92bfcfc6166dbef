//! Build phase
//!
//! Installs the application's dependencies into the `packages` layer and
//! exposes them through `PATH` and `PYTHONPATH`. pipenv's download cache
//! lives in its own `cache` layer so it survives between builds.

use crate::clock::{format_duration, Clock};
use crate::constants::{CACHE_LAYER_NAME, PACKAGES_LAYER_NAME, PATH_DELIMITER, PATH_LIST_SEPARATOR, SITE_PACKAGES};
use crate::entry_resolver::EntryResolver;
use crate::errors::BuildError;
use crate::install_process::InstallProcess;
use crate::sbom_generator::SbomGenerator;
use crate::site_process::SitePackagesProcess;
use crate::venv_locator::VenvDirLocator;
use chrono::SecondsFormat;
use pipenv_config::venv_paths::venv_bin_dir;
use pipenv_lifecycle::{BuildContext, BuildResult, Layer};
use pipenv_logger::Emitter;
use std::fs;
use std::io;
use std::sync::Arc;
use tracing::{debug, info};

pub struct Build {
    entry_resolver: Box<dyn EntryResolver>,
    install_process: Box<dyn InstallProcess>,
    site_process: Box<dyn SitePackagesProcess>,
    venv_locator: Box<dyn VenvDirLocator>,
    sbom_generator: Box<dyn SbomGenerator>,
    clock: Clock,
    logger: Arc<Emitter>,
}

impl Build {
    pub fn new(
        entry_resolver: Box<dyn EntryResolver>,
        install_process: Box<dyn InstallProcess>,
        site_process: Box<dyn SitePackagesProcess>,
        venv_locator: Box<dyn VenvDirLocator>,
        sbom_generator: Box<dyn SbomGenerator>,
        clock: Clock,
        logger: Arc<Emitter>,
    ) -> Self {
        Build {
            entry_resolver,
            install_process,
            site_process,
            venv_locator,
            sbom_generator,
            clock,
            logger,
        }
    }

    pub fn run(&self, context: &BuildContext) -> Result<BuildResult, BuildError> {
        self.logger.title(&format!(
            "{} {}",
            context.buildpack_info.name, context.buildpack_info.version
        ));

        let mut packages_layer = context.layers.get(PACKAGES_LAYER_NAME)?;
        let mut cache_layer = context.layers.get(CACHE_LAYER_NAME)?;

        let (launch, build) = self
            .entry_resolver
            .merge_layer_types(SITE_PACKAGES, &context.plan.entries);
        packages_layer.launch = launch;
        packages_layer.build = build;
        packages_layer.cache = launch || build;
        cache_layer.cache = true;
        debug!("packages layer launch={} build={}", launch, build);

        self.logger.process("Executing build process");
        let (duration, installed) = self.clock.measure(|| {
            self.install_process
                .execute(&context.working_dir, &mut packages_layer, &cache_layer)
        });
        installed?;
        self.logger.action(&format!("Completed in {}", format_duration(duration)));
        self.logger.break_line();

        let venv_dir = self.venv_locator.locate_venv_dir(&packages_layer.path)?;
        let site_packages = self.site_process.execute(&packages_layer.path)?;
        info!("site-packages at {}", site_packages.display());

        self.logger
            .process(&format!("Generating SBOM for {}", context.working_dir.display()));
        let (duration, sbom) = self
            .clock
            .measure(|| self.sbom_generator.generate(&context.working_dir));
        let sbom = sbom?.with_created(self.clock.now());
        self.logger.action(&format!("Completed in {}", format_duration(duration)));
        self.logger.break_line();

        self.logger.process("Writing SBOM in the following format(s):");
        for format in &context.buildpack_info.sbom_formats {
            self.logger.subprocess(format);
        }
        self.logger.break_line();
        packages_layer.sbom = sbom.in_formats(&context.buildpack_info.sbom_formats)?;

        self.logger.process("Configuring environment");
        packages_layer.shared_env.prepend(
            "PATH",
            venv_bin_dir(&venv_dir).display().to_string(),
            PATH_DELIMITER,
        );
        packages_layer.shared_env.prepend(
            "PYTHONPATH",
            site_packages.display().to_string(),
            PATH_LIST_SEPARATOR,
        );
        self.logger.subprocess(&packages_layer.shared_env.formatted());
        self.logger.break_line();

        packages_layer.metadata.insert(
            "built_at".to_string(),
            toml::Value::String(self.clock.now().to_rfc3339_opts(SecondsFormat::Nanos, true)),
        );

        let mut layers = vec![packages_layer];
        if has_contents(&cache_layer)? {
            layers.push(cache_layer);
        } else {
            debug!("cache layer is empty, not exporting it");
        }

        Ok(BuildResult { layers })
    }
}

fn has_contents(layer: &Layer) -> Result<bool, BuildError> {
    let inspect_failed = |source| BuildError::CacheLayer {
        path: layer.path.clone(),
        source,
    };
    match fs::read_dir(&layer.path) {
        Ok(mut entries) => Ok(entries.next().transpose().map_err(inspect_failed)?.is_some()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(inspect_failed(e)),
    }
}
