//! Software bill of materials rendering
//!
//! A buildpack declares in `buildpack.toml` which SBOM media types it emits.
//! Each one is written next to the layer as `<layer>.sbom.<extension>`.

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{json, Value};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub const CYCLONEDX_MEDIA_TYPE: &str = "application/vnd.cyclonedx+json";
pub const SPDX_MEDIA_TYPE: &str = "application/spdx+json";
pub const SYFT_MEDIA_TYPE: &str = "application/vnd.syft+json";

const TOOL_NAME: &str = "pipenv-install";

#[derive(Error, Debug)]
pub enum SbomError {
    #[error("unsupported SBOM format: '{0}'")]
    UnsupportedFormat(String),

    #[error("failed to render {format} SBOM: {source}")]
    Render {
        format: SbomFormat,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SbomFormat {
    CycloneDx,
    Spdx,
    Syft,
}

impl SbomFormat {
    pub fn media_type(self) -> &'static str {
        match self {
            SbomFormat::CycloneDx => CYCLONEDX_MEDIA_TYPE,
            SbomFormat::Spdx => SPDX_MEDIA_TYPE,
            SbomFormat::Syft => SYFT_MEDIA_TYPE,
        }
    }

    /// File extension the lifecycle expects, e.g. `cdx.json`
    pub fn extension(self) -> &'static str {
        match self {
            SbomFormat::CycloneDx => "cdx.json",
            SbomFormat::Spdx => "spdx.json",
            SbomFormat::Syft => "syft.json",
        }
    }

    pub fn all() -> [SbomFormat; 3] {
        [SbomFormat::CycloneDx, SbomFormat::Spdx, SbomFormat::Syft]
    }
}

impl FromStr for SbomFormat {
    type Err = SbomError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SbomFormat::all()
            .into_iter()
            .find(|f| f.media_type() == s)
            .ok_or_else(|| SbomError::UnsupportedFormat(s.to_string()))
    }
}

impl fmt::Display for SbomFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.media_type())
    }
}

/// One installed Python distribution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SbomPackage {
    pub name: String,
    pub version: Option<String>,
    /// File the package was found in, relative to the scanned directory
    pub location: Option<String>,
}

impl SbomPackage {
    pub fn new(name: impl Into<String>, version: Option<String>) -> Self {
        SbomPackage {
            name: name.into(),
            version,
            location: None,
        }
    }

    /// PEP 503 form of the name: lowercase, with each run of `-`, `_` and
    /// `.` collapsed to a single `-`
    pub fn normalized_name(&self) -> String {
        let mut normalized = String::with_capacity(self.name.len());
        let mut in_separator = false;
        for c in self.name.chars() {
            if matches!(c, '-' | '_' | '.') {
                if !in_separator {
                    normalized.push('-');
                }
                in_separator = true;
            } else {
                normalized.extend(c.to_lowercase());
                in_separator = false;
            }
        }
        normalized
    }

    /// Package URL, `pkg:pypi/<name>@<version>`
    pub fn purl(&self) -> String {
        let name = self.normalized_name();
        match &self.version {
            Some(version) => format!("pkg:pypi/{}@{}", name, version),
            None => format!("pkg:pypi/{}", name),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sbom {
    pub packages: Vec<SbomPackage>,
    /// Creation timestamp recorded in formats that require one
    pub created: Option<DateTime<Utc>>,
}

/// An SBOM rendered in one format, ready to be written next to a layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormattedSbom {
    pub format: SbomFormat,
    pub content: String,
}

impl FormattedSbom {
    pub fn extension(&self) -> &'static str {
        self.format.extension()
    }
}

impl Sbom {
    pub fn new(packages: Vec<SbomPackage>) -> Self {
        Sbom {
            packages,
            created: None,
        }
    }

    pub fn with_created(mut self, created: DateTime<Utc>) -> Self {
        self.created = Some(created);
        self
    }

    /// Render into each requested media type, in the order requested.
    /// Every name is validated before anything is rendered.
    pub fn in_formats(&self, media_types: &[String]) -> Result<Vec<FormattedSbom>, SbomError> {
        let formats = media_types
            .iter()
            .map(|m| m.parse::<SbomFormat>())
            .collect::<Result<Vec<_>, _>>()?;

        formats
            .into_iter()
            .map(|format| {
                Ok(FormattedSbom {
                    format,
                    content: self.render(format)?,
                })
            })
            .collect()
    }

    pub fn render(&self, format: SbomFormat) -> Result<String, SbomError> {
        let document = match format {
            SbomFormat::CycloneDx => self.cyclonedx(),
            SbomFormat::Spdx => self.spdx(),
            SbomFormat::Syft => self.syft(),
        };
        serde_json::to_string_pretty(&document).map_err(|source| SbomError::Render { format, source })
    }

    fn created_timestamp(&self) -> String {
        self.created
            .unwrap_or(DateTime::UNIX_EPOCH)
            .to_rfc3339_opts(SecondsFormat::Secs, true)
    }

    fn cyclonedx(&self) -> Value {
        let components: Vec<Value> = self
            .packages
            .iter()
            .map(|p| {
                let mut component = json!({
                    "type": "library",
                    "name": p.name,
                    "purl": p.purl(),
                });
                if let Some(version) = &p.version {
                    component["version"] = json!(version);
                }
                component
            })
            .collect();

        json!({
            "bomFormat": "CycloneDX",
            "specVersion": "1.4",
            "version": 1,
            "metadata": {
                "timestamp": self.created_timestamp(),
                "tools": [{ "vendor": "paketo-buildpacks", "name": TOOL_NAME }],
            },
            "components": components,
        })
    }

    fn spdx(&self) -> Value {
        let packages: Vec<Value> = self
            .packages
            .iter()
            .enumerate()
            .map(|(index, p)| {
                json!({
                    "SPDXID": format!("SPDXRef-Package-pypi-{}-{}", spdx_id_fragment(&p.name), index),
                    "name": p.name,
                    "versionInfo": p.version.as_deref().unwrap_or("NOASSERTION"),
                    "downloadLocation": "NOASSERTION",
                    "filesAnalyzed": false,
                    "licenseConcluded": "NOASSERTION",
                    "licenseDeclared": "NOASSERTION",
                    "copyrightText": "NOASSERTION",
                    "externalRefs": [{
                        "referenceCategory": "PACKAGE_MANAGER",
                        "referenceType": "purl",
                        "referenceLocator": p.purl(),
                    }],
                })
            })
            .collect();

        json!({
            "spdxVersion": "SPDX-2.2",
            "dataLicense": "CC0-1.0",
            "SPDXID": "SPDXRef-DOCUMENT",
            "name": "pipenv-install-sbom",
            "documentNamespace": format!("https://paketo.io/{}/sbom", TOOL_NAME),
            "creationInfo": {
                "created": self.created_timestamp(),
                "creators": [format!("Tool: {}", TOOL_NAME)],
            },
            "packages": packages,
        })
    }

    fn syft(&self) -> Value {
        let artifacts: Vec<Value> = self
            .packages
            .iter()
            .map(|p| {
                let locations: Vec<Value> = p
                    .location
                    .iter()
                    .map(|path| json!({ "path": path }))
                    .collect();
                json!({
                    "id": p.purl(),
                    "name": p.name,
                    "version": p.version.as_deref().unwrap_or(""),
                    "type": "python",
                    "foundBy": TOOL_NAME,
                    "locations": locations,
                    "licenses": [],
                    "language": "python",
                    "purl": p.purl(),
                })
            })
            .collect();

        json!({
            "artifacts": artifacts,
            "descriptor": { "name": TOOL_NAME, "version": env!("CARGO_PKG_VERSION") },
            "schema": {
                "version": "3.0.1",
                "url": "https://raw.githubusercontent.com/anchore/syft/main/schema/json/schema-3.0.1.json",
            },
        })
    }
}

fn spdx_id_fragment(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '.' || c == '-' { c } else { '-' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Sbom {
        let mut flask = SbomPackage::new("Flask", Some("2.0.1".to_string()));
        flask.location = Some("Pipfile.lock".to_string());
        Sbom::new(vec![flask, SbomPackage::new("my_lib", None)])
    }

    #[test]
    fn test_media_type_round_trip() {
        for format in SbomFormat::all() {
            assert_eq!(format.media_type().parse::<SbomFormat>().ok(), Some(format));
        }
        assert_eq!(SbomFormat::CycloneDx.extension(), "cdx.json");
        assert_eq!(SbomFormat::Spdx.extension(), "spdx.json");
        assert_eq!(SbomFormat::Syft.extension(), "syft.json");
    }

    #[test]
    fn test_unsupported_format_names_the_format() {
        let result = sample().in_formats(&[
            CYCLONEDX_MEDIA_TYPE.to_string(),
            "random-format".to_string(),
        ]);
        assert!(result.is_err_and(|e| e.to_string() == "unsupported SBOM format: 'random-format'"));
    }

    #[test]
    fn test_in_formats_preserves_order() -> Result<(), SbomError> {
        let formatted = sample().in_formats(&[SPDX_MEDIA_TYPE.to_string(), CYCLONEDX_MEDIA_TYPE.to_string()])?;
        let extensions: Vec<_> = formatted.iter().map(|f| f.extension()).collect();
        assert_eq!(extensions, vec!["spdx.json", "cdx.json"]);
        Ok(())
    }

    #[test]
    fn test_purl() {
        let packages = sample().packages;
        assert_eq!(packages[0].purl(), "pkg:pypi/flask@2.0.1");
        assert_eq!(packages[1].purl(), "pkg:pypi/my-lib");
    }

    #[test]
    fn test_cyclonedx_components() -> Result<(), Box<dyn std::error::Error>> {
        let rendered = sample().render(SbomFormat::CycloneDx)?;
        let doc: Value = serde_json::from_str(&rendered)?;

        assert_eq!(doc["bomFormat"], "CycloneDX");
        assert_eq!(doc["specVersion"], "1.4");
        assert_eq!(doc["components"][0]["name"], "Flask");
        assert_eq!(doc["components"][0]["version"], "2.0.1");
        assert!(doc["components"][1].get("version").is_none());
        assert_eq!(doc["metadata"]["timestamp"], "1970-01-01T00:00:00Z");
        Ok(())
    }

    #[test]
    fn test_spdx_packages() -> Result<(), Box<dyn std::error::Error>> {
        let created = DateTime::parse_from_rfc3339("2024-05-01T10:00:00Z")?.with_timezone(&Utc);
        let rendered = sample().with_created(created).render(SbomFormat::Spdx)?;
        let doc: Value = serde_json::from_str(&rendered)?;

        assert_eq!(doc["spdxVersion"], "SPDX-2.2");
        assert_eq!(doc["creationInfo"]["created"], "2024-05-01T10:00:00Z");
        assert_eq!(doc["packages"][0]["SPDXID"], "SPDXRef-Package-pypi-Flask-0");
        assert_eq!(doc["packages"][1]["SPDXID"], "SPDXRef-Package-pypi-my-lib-1");
        assert_eq!(doc["packages"][1]["versionInfo"], "NOASSERTION");
        assert_eq!(
            doc["packages"][0]["externalRefs"][0]["referenceLocator"],
            "pkg:pypi/flask@2.0.1"
        );
        Ok(())
    }

    #[test]
    fn test_normalized_name() {
        let name = |n: &str| SbomPackage::new(n, None).normalized_name();
        assert_eq!(name("Flask"), "flask");
        assert_eq!(name("zope.interface"), "zope-interface");
        assert_eq!(name("a__b-.c"), "a-b-c");
    }

    #[test]
    fn test_spdx_ids_stay_unique_for_similar_names() -> Result<(), Box<dyn std::error::Error>> {
        let sbom = Sbom::new(vec![SbomPackage::new("a_b", None), SbomPackage::new("a-b", None)]);
        let doc: Value = serde_json::from_str(&sbom.render(SbomFormat::Spdx)?)?;

        let first = doc["packages"][0]["SPDXID"].as_str().ok_or("missing SPDXID")?;
        let second = doc["packages"][1]["SPDXID"].as_str().ok_or("missing SPDXID")?;
        assert_eq!(first, "SPDXRef-Package-pypi-a-b-0");
        assert_eq!(second, "SPDXRef-Package-pypi-a-b-1");
        Ok(())
    }

    #[test]
    fn test_syft_artifacts() -> Result<(), Box<dyn std::error::Error>> {
        let rendered = sample().render(SbomFormat::Syft)?;
        let doc: Value = serde_json::from_str(&rendered)?;

        assert_eq!(doc["artifacts"][0]["type"], "python");
        assert_eq!(doc["artifacts"][0]["locations"][0]["path"], "Pipfile.lock");
        assert_eq!(doc["artifacts"][1]["locations"], json!([]));
        Ok(())
    }

    #[test]
    fn test_empty_sbom_renders_in_every_format() -> Result<(), SbomError> {
        let media_types: Vec<String> = SbomFormat::all().iter().map(|f| f.media_type().to_string()).collect();
        let formatted = Sbom::default().in_formats(&media_types)?;
        assert_eq!(formatted.len(), 3);
        Ok(())
    }
}
