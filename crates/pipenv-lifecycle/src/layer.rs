//! Layers and the layers directory
//!
//! A layer is `<layers>/<name>/` on disk plus a `<layers>/<name>.toml`
//! describing how the lifecycle should treat it. Descriptors handed out by
//! [`Layers::get`] always start clean; whatever a previous build recorded in
//! the TOML is discarded, while restored directory contents are left alone so
//! a cached layer can be reused.

use crate::environment::Environment;
use crate::errors::LifecycleError;
use crate::sbom::{FormattedSbom, SbomFormat};
use serde::Serialize;
use std::collections::HashSet;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// TOML files in the layers directory that are not layer descriptors
const RESERVED_TOML_FILES: &[&str] = &["launch.toml", "build.toml", "store.toml"];

#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    pub name: String,
    pub path: PathBuf,
    pub build: bool,
    pub launch: bool,
    pub cache: bool,
    /// Applied in both the build and launch environments
    pub shared_env: Environment,
    pub build_env: Environment,
    pub launch_env: Environment,
    pub metadata: toml::Table,
    pub sbom: Vec<FormattedSbom>,
}

impl Layer {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Layer {
            name: name.into(),
            path: path.into(),
            build: false,
            launch: false,
            cache: false,
            shared_env: Environment::new(),
            build_env: Environment::new(),
            launch_env: Environment::new(),
            metadata: toml::Table::new(),
            sbom: Vec::new(),
        }
    }
}

#[derive(Debug, Serialize)]
struct LayerDescriptor<'a> {
    types: LayerTypes,
    #[serde(skip_serializing_if = "is_empty_table")]
    metadata: &'a toml::Table,
}

fn is_empty_table(table: &&toml::Table) -> bool {
    table.is_empty()
}

#[derive(Debug, Serialize)]
struct LayerTypes {
    build: bool,
    launch: bool,
    cache: bool,
}

/// What a build hands back to the lifecycle
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuildResult {
    pub layers: Vec<Layer>,
}

/// The buildpack's layers directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layers {
    pub path: PathBuf,
}

impl Layers {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Layers { path: path.into() }
    }

    fn descriptor_path(&self, name: &str) -> PathBuf {
        self.path.join(format!("{}.toml", name))
    }

    /// Acquire a fresh descriptor for layer `name`. A descriptor left over
    /// from an earlier build is removed so stale flags and metadata cannot
    /// leak into this one.
    pub fn get(&self, name: &str) -> Result<Layer, LifecycleError> {
        let descriptor = self.descriptor_path(name);
        match fs::remove_file(&descriptor) {
            Ok(()) => debug!("Removed stale layer descriptor {}", descriptor.display()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(LifecycleError::io("failed to reset layer", descriptor)(e));
            }
        }
        Ok(Layer::new(name, self.path.join(name)))
    }

    /// Persist every layer of `result` and drop descriptors of layers that
    /// were not returned.
    pub fn write_result(&self, result: &BuildResult) -> Result<(), LifecycleError> {
        for layer in &result.layers {
            self.write_layer(layer)?;
        }

        let kept: HashSet<String> = result.layers.iter().map(|l| format!("{}.toml", l.name)).collect();
        let entries = fs::read_dir(&self.path).map_err(LifecycleError::io("failed to read layers directory", &self.path))?;
        for entry in entries {
            let entry = entry.map_err(LifecycleError::io("failed to read layers directory", &self.path))?;
            let file_name = entry.file_name().to_string_lossy().to_string();
            if !file_name.ends_with(".toml")
                || kept.contains(&file_name)
                || RESERVED_TOML_FILES.contains(&file_name.as_str())
            {
                continue;
            }
            let path = entry.path();
            fs::remove_file(&path).map_err(LifecycleError::io("failed to remove stale layer descriptor", &path))?;
            debug!("Removed descriptor of unused layer {}", path.display());
        }
        Ok(())
    }

    pub fn write_layer(&self, layer: &Layer) -> Result<(), LifecycleError> {
        fs::create_dir_all(&layer.path).map_err(LifecycleError::io("failed to create layer", &layer.path))?;

        for (dir_name, env) in [
            ("env", &layer.shared_env),
            ("env.build", &layer.build_env),
            ("env.launch", &layer.launch_env),
        ] {
            write_env_dir(&layer.path.join(dir_name), env)?;
        }

        let descriptor = LayerDescriptor {
            types: LayerTypes {
                build: layer.build,
                launch: layer.launch,
                cache: layer.cache,
            },
            metadata: &layer.metadata,
        };
        let content = toml::to_string_pretty(&descriptor).map_err(|source| LifecycleError::Serialize {
            what: format!("layer '{}'", layer.name),
            source,
        })?;
        write_atomic(&self.descriptor_path(&layer.name), content.as_bytes())?;

        for format in SbomFormat::all() {
            let path = self.sbom_path(&layer.name, format);
            if path.exists() {
                fs::remove_file(&path).map_err(LifecycleError::io("failed to remove stale SBOM", &path))?;
            }
        }
        for sbom in &layer.sbom {
            let path = self.sbom_path(&layer.name, sbom.format);
            fs::write(&path, &sbom.content).map_err(LifecycleError::io("failed to write SBOM", &path))?;
        }

        debug!(
            "Wrote layer '{}' (build={}, launch={}, cache={})",
            layer.name, layer.build, layer.launch, layer.cache
        );
        Ok(())
    }

    pub fn sbom_path(&self, layer_name: &str, format: SbomFormat) -> PathBuf {
        self.path
            .join(format!("{}.sbom.{}", layer_name, format.extension()))
    }
}

/// Replace `dir` with one file per environment key
fn write_env_dir(dir: &Path, env: &Environment) -> Result<(), LifecycleError> {
    if dir.exists() {
        fs::remove_dir_all(dir).map_err(LifecycleError::io("failed to clear layer environment", dir))?;
    }
    if env.is_empty() {
        return Ok(());
    }
    fs::create_dir_all(dir).map_err(LifecycleError::io("failed to create layer environment", dir))?;
    for (key, value) in env.iter() {
        let path = dir.join(key);
        fs::write(&path, value).map_err(LifecycleError::io("failed to write layer environment", &path))?;
    }
    Ok(())
}

/// Write to a temp file then rename over the target
fn write_atomic(path: &Path, content: &[u8]) -> Result<(), LifecycleError> {
    let temp_path = path.with_extension("toml.tmp");
    {
        let mut file =
            fs::File::create(&temp_path).map_err(LifecycleError::io("failed to write layer descriptor", &temp_path))?;
        file.write_all(content)
            .and_then(|()| file.flush())
            .map_err(LifecycleError::io("failed to write layer descriptor", &temp_path))?;
    }
    fs::rename(&temp_path, path).map_err(LifecycleError::io("failed to write layer descriptor", path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sbom::Sbom;
    use tempfile::TempDir;

    #[test]
    fn test_get_returns_fresh_descriptor() -> Result<(), Box<dyn std::error::Error>> {
        let layers_dir = TempDir::new()?;
        fs::write(
            layers_dir.path().join("packages.toml"),
            "[types]\nlaunch = true\n[metadata]\nbuilt_at = \"yesterday\"\n",
        )?;
        fs::create_dir_all(layers_dir.path().join("packages").join("venv"))?;

        let layers = Layers::new(layers_dir.path());
        let layer = layers.get("packages")?;

        assert_eq!(layer.name, "packages");
        assert_eq!(layer.path, layers_dir.path().join("packages"));
        assert!(!layer.launch && !layer.build && !layer.cache);
        assert!(layer.metadata.is_empty());
        assert!(!layers_dir.path().join("packages.toml").exists());
        // restored contents survive
        assert!(layers_dir.path().join("packages").join("venv").is_dir());
        Ok(())
    }

    #[test]
    fn test_get_does_not_create_the_directory() -> Result<(), Box<dyn std::error::Error>> {
        let layers_dir = TempDir::new()?;
        let layer = Layers::new(layers_dir.path()).get("cache")?;
        assert!(!layer.path.exists());
        Ok(())
    }

    #[test]
    fn test_write_layer() -> Result<(), Box<dyn std::error::Error>> {
        let layers_dir = TempDir::new()?;
        let layers = Layers::new(layers_dir.path());
        let mut layer = layers.get("packages")?;
        layer.launch = true;
        layer.cache = true;
        layer.shared_env.prepend("PATH", "/layers/packages/venv/bin", ":");
        layer.launch_env.set_default("PYTHONUSERBASE", "/layers/packages/venv");
        layer
            .metadata
            .insert("built_at".to_string(), toml::Value::String("2024-05-01T10:00:00Z".to_string()));
        layer.sbom = Sbom::default().in_formats(&["application/vnd.cyclonedx+json".to_string()])?;

        // leftovers from a previous build
        fs::create_dir_all(layer.path.join("env.build"))?;
        fs::write(layer.path.join("env.build").join("OLD.override"), "x")?;

        layers.write_layer(&layer)?;

        let descriptor: toml::Table = toml::from_str(&fs::read_to_string(layers_dir.path().join("packages.toml"))?)?;
        let types = descriptor.get("types").and_then(toml::Value::as_table);
        assert_eq!(types.and_then(|t| t.get("launch")).and_then(toml::Value::as_bool), Some(true));
        assert_eq!(types.and_then(|t| t.get("build")).and_then(toml::Value::as_bool), Some(false));
        assert_eq!(types.and_then(|t| t.get("cache")).and_then(toml::Value::as_bool), Some(true));
        assert_eq!(
            descriptor
                .get("metadata")
                .and_then(|m| m.get("built_at"))
                .and_then(toml::Value::as_str),
            Some("2024-05-01T10:00:00Z")
        );

        let env_dir = layer.path.join("env");
        assert_eq!(fs::read_to_string(env_dir.join("PATH.prepend"))?, "/layers/packages/venv/bin");
        assert_eq!(fs::read_to_string(env_dir.join("PATH.delim"))?, ":");
        assert_eq!(
            fs::read_to_string(layer.path.join("env.launch").join("PYTHONUSERBASE.default"))?,
            "/layers/packages/venv"
        );
        assert!(!layer.path.join("env.build").exists());
        assert!(layers_dir.path().join("packages.sbom.cdx.json").is_file());
        assert!(!layers_dir.path().join("packages.toml.tmp").exists());
        Ok(())
    }

    #[test]
    fn test_write_result_drops_unused_descriptors() -> Result<(), Box<dyn std::error::Error>> {
        let layers_dir = TempDir::new()?;
        fs::write(layers_dir.path().join("cache.toml"), "[types]\ncache = true\n")?;
        fs::write(layers_dir.path().join("launch.toml"), "")?;

        let layers = Layers::new(layers_dir.path());
        let mut packages = Layer::new("packages", layers_dir.path().join("packages"));
        packages.build = true;
        layers.write_result(&BuildResult { layers: vec![packages] })?;

        assert!(layers_dir.path().join("packages.toml").is_file());
        assert!(!layers_dir.path().join("cache.toml").exists());
        assert!(layers_dir.path().join("launch.toml").exists());
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn test_get_fails_when_layers_dir_is_unreadable() -> Result<(), Box<dyn std::error::Error>> {
        use std::os::unix::fs::PermissionsExt;

        let layers_dir = TempDir::new()?;
        fs::write(layers_dir.path().join("packages.toml"), "")?;
        fs::set_permissions(layers_dir.path(), fs::Permissions::from_mode(0o000))?;
        let enforced = fs::read_dir(layers_dir.path()).is_err();

        let result = Layers::new(layers_dir.path()).get("packages");
        fs::set_permissions(layers_dir.path(), fs::Permissions::from_mode(0o755))?;

        if enforced {
            assert!(result.is_err_and(|e| e.to_string().contains("ermission denied")));
        }
        Ok(())
    }
}
