//! Audit run configuration and catalog source loading.
//!
//! A run is described by one [`AuditConfig`] document plus any number of
//! catalog sources. Config and catalogs load from YAML (JSON is accepted for
//! the same types); catalogs additionally load from a flat properties form.
//!
//! ## Example YAML configuration
//!
//! ```yaml
//! # Lichen audit configuration
//! version: "1.0"
//! name: "backend tree"
//!
//! filter: approved
//! window: 50
//! threshold: 0
//!
//! transform: plain
//! output: "audit.txt"
//!
//! approve: ["YAL"]
//! unapprove: ["GPL1"]
//!
//! use_default_catalog: true
//! catalogs:
//!   - "licenses.yaml"
//!   - "corporate.properties"
//! ```
//!
//! ## Flat catalog form
//!
//! One `key=value` pair per line, `#` comments, blank lines ignored. Keys:
//!
//! ```text
//! family.<cat>.name=<family name>
//! license.<id>.family=<cat>
//! license.<id>.notes=<free text>
//! license.<id>.text.<n>=<full text fragment>
//! license.<id>.copyright=<start>,<end>,<owner>   # empty slots allowed
//! license.<id>.spdx=<tag>
//! license.<id>.derived-from=<license id>
//! approved=<cat>[,<cat>...]
//! ```
//!
//! All patterns declared for one license are alternatives: the license
//! matches when any of its texts, its SPDX tag or its copyright line is
//! seen. Values are single-line.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use license::{ApprovalFilter, CatalogDef, FamilyDef, LicenseDef};
use matcher::MatcherSpec;
use report::TransformKind;
use scan::DEFAULT_HEADER_LINES;

/// Errors raised while loading configuration or catalog sources.
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A line of a flat catalog source did not parse.
    #[error("line {line}: {reason}")]
    KeyValue { line: usize, reason: String },

    #[error("validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Catalog(#[from] license::CatalogError),
}

/// Top-level configuration for one audit run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct AuditConfig {
    /// Configuration format version.
    pub version: String,

    /// Optional run name, echoed in logs only.
    #[serde(default)]
    pub name: Option<String>,

    /// Which slice of the catalog to scan with. Every known license by
    /// default; approval decides pass/fail, not what gets scanned.
    #[serde(default = "default_filter")]
    pub filter: ApprovalFilter,

    /// Leading lines of each document offered to the matchers.
    #[serde(default = "default_window")]
    pub window: usize,

    /// Maximum unapproved documents before the run fails.
    #[serde(default)]
    pub threshold: u64,

    /// Built-in transform name: `xml`, `plain`, `missing-headers`,
    /// `unapproved`.
    #[serde(default = "default_transform")]
    pub transform: String,

    /// Report destination; stdout when absent.
    #[serde(default)]
    pub output: Option<PathBuf>,

    /// Family categories approved in addition to the catalog's set.
    #[serde(default)]
    pub approve: Vec<String>,

    /// Family categories removed from the approved set. Wins over `approve`.
    #[serde(default)]
    pub unapprove: Vec<String>,

    /// Extra catalog sources merged into the registry.
    #[serde(default)]
    pub catalogs: Vec<PathBuf>,

    /// Start from the built-in catalog before merging `catalogs`.
    #[serde(default = "default_true")]
    pub use_default_catalog: bool,
}

fn default_filter() -> ApprovalFilter {
    ApprovalFilter::All
}

fn default_window() -> usize {
    DEFAULT_HEADER_LINES
}

fn default_transform() -> String {
    "xml".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for AuditConfig {
    fn default() -> Self {
        AuditConfig {
            version: "1.0".to_string(),
            name: None,
            filter: default_filter(),
            window: default_window(),
            threshold: 0,
            transform: default_transform(),
            output: None,
            approve: Vec::new(),
            unapprove: Vec::new(),
            catalogs: Vec::new(),
            use_default_catalog: true,
        }
    }
}

impl AuditConfig {
    /// Load a configuration file, YAML or JSON by extension.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigLoadError> {
        let content = fs::read_to_string(&path)?;
        match extension(path.as_ref()) {
            Some("json") => Self::from_json(&content),
            _ => Self::from_yaml(&content),
        }
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigLoadError> {
        let config: AuditConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigLoadError> {
        let config: AuditConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigLoadError> {
        match self.version.as_str() {
            "1.0" | "1" => {}
            v => {
                return Err(ConfigLoadError::Validation(format!(
                    "unsupported config version: {v}"
                )));
            }
        }
        if self.window == 0 {
            return Err(ConfigLoadError::Validation(
                "window must be at least 1".to_string(),
            ));
        }
        self.transform_kind()?;
        Ok(())
    }

    /// The parsed transform selection.
    pub fn transform_kind(&self) -> Result<TransformKind, ConfigLoadError> {
        self.transform
            .parse()
            .map_err(|err: report::UnknownTransform| ConfigLoadError::Validation(err.to_string()))
    }

    /// The scan-side options this configuration asks for.
    pub fn options(&self) -> crate::AuditOptions {
        crate::AuditOptions {
            filter: self.filter,
            approve: self.approve.clone(),
            unapprove: self.unapprove.clone(),
            window: self.window,
            threshold: self.threshold,
        }
    }
}

fn extension(path: &Path) -> Option<&str> {
    path.extension().and_then(|ext| ext.to_str())
}

/// Load one catalog source: `.json` as JSON, `.properties` as the flat
/// form, anything else as YAML.
pub fn load_catalog<P: AsRef<Path>>(path: P) -> Result<CatalogDef, ConfigLoadError> {
    let content = fs::read_to_string(&path)?;
    match extension(path.as_ref()) {
        Some("json") => Ok(serde_json::from_str(&content)?),
        Some("properties") => catalog_from_properties(&content),
        _ => Ok(serde_yaml::from_str(&content)?),
    }
}

#[derive(Default)]
struct FlatLicense {
    family: Option<String>,
    notes: Option<String>,
    texts: BTreeMap<u32, String>,
    copyright: Option<MatcherSpec>,
    spdx: Option<String>,
    derived_from: Option<String>,
}

/// Parse the flat key-value catalog form.
pub fn catalog_from_properties(text: &str) -> Result<CatalogDef, ConfigLoadError> {
    let mut families: BTreeMap<String, String> = BTreeMap::new();
    let mut licenses: BTreeMap<String, FlatLicense> = BTreeMap::new();
    let mut approved: Vec<String> = Vec::new();

    for (index, raw) in text.lines().enumerate() {
        let line = index + 1;
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let (key, value) = trimmed
            .split_once('=')
            .ok_or_else(|| key_value_error(line, "expected `key=value`".to_string()))?;
        let key = key.trim();
        let value = value.trim();

        if key == "approved" {
            approved.extend(
                value
                    .split(',')
                    .map(str::trim)
                    .filter(|cat| !cat.is_empty())
                    .map(str::to_string),
            );
        } else if let Some(rest) = key.strip_prefix("family.") {
            let category = rest
                .strip_suffix(".name")
                .ok_or_else(|| key_value_error(line, format!("unrecognized key `{key}`")))?;
            if families
                .insert(category.to_string(), value.to_string())
                .is_some()
            {
                return Err(key_value_error(line, format!("duplicate key `{key}`")));
            }
        } else if let Some(rest) = key.strip_prefix("license.") {
            parse_license_key(&mut licenses, line, key, rest, value)?;
        } else {
            return Err(key_value_error(line, format!("unrecognized key `{key}`")));
        }
    }

    let families = families
        .into_iter()
        .map(|(category, name)| FamilyDef { category, name })
        .collect();
    let licenses = licenses
        .into_iter()
        .map(|(id, flat)| flat_license_def(id, flat))
        .collect();
    Ok(CatalogDef {
        families,
        matchers: Vec::new(),
        licenses,
        approved,
    })
}

fn key_value_error(line: usize, reason: String) -> ConfigLoadError {
    ConfigLoadError::KeyValue { line, reason }
}

/// Route one `license.<id>.<field>` line. Fields are matched from the
/// right so license ids may contain dots (`CDDL-1.0`).
fn parse_license_key(
    licenses: &mut BTreeMap<String, FlatLicense>,
    line: usize,
    key: &str,
    rest: &str,
    value: &str,
) -> Result<(), ConfigLoadError> {
    let duplicate = || key_value_error(line, format!("duplicate key `{key}`"));

    if let Some(id) = rest.strip_suffix(".family") {
        let entry = licenses.entry(id.to_string()).or_default();
        if entry.family.replace(value.to_string()).is_some() {
            return Err(duplicate());
        }
    } else if let Some(id) = rest.strip_suffix(".notes") {
        let entry = licenses.entry(id.to_string()).or_default();
        if entry.notes.replace(value.to_string()).is_some() {
            return Err(duplicate());
        }
    } else if let Some(id) = rest.strip_suffix(".spdx") {
        let entry = licenses.entry(id.to_string()).or_default();
        if entry.spdx.replace(value.to_string()).is_some() {
            return Err(duplicate());
        }
    } else if let Some(id) = rest.strip_suffix(".derived-from") {
        let entry = licenses.entry(id.to_string()).or_default();
        if entry.derived_from.replace(value.to_string()).is_some() {
            return Err(duplicate());
        }
    } else if let Some(id) = rest.strip_suffix(".copyright") {
        let spec = parse_copyright(line, value)?;
        let entry = licenses.entry(id.to_string()).or_default();
        if entry.copyright.replace(spec).is_some() {
            return Err(duplicate());
        }
    } else if let Some((head, index)) = rest.rsplit_once('.') {
        let id = head
            .strip_suffix(".text")
            .ok_or_else(|| key_value_error(line, format!("unrecognized key `{key}`")))?;
        let index: u32 = index
            .parse()
            .map_err(|_| key_value_error(line, format!("`{key}` needs a numeric text index")))?;
        let entry = licenses.entry(id.to_string()).or_default();
        if entry.texts.insert(index, value.to_string()).is_some() {
            return Err(duplicate());
        }
    } else {
        return Err(key_value_error(line, format!("unrecognized key `{key}`")));
    }
    Ok(())
}

/// `<start>,<end>,<owner>`, each slot optional; a bare value is the owner.
fn parse_copyright(line: usize, value: &str) -> Result<MatcherSpec, ConfigLoadError> {
    let parts: Vec<&str> = value.splitn(3, ',').map(str::trim).collect();
    let slot = |index: usize| parts.get(index).copied().filter(|part| !part.is_empty());
    match parts.len() {
        3 => Ok(MatcherSpec::copyright(slot(0), slot(1), slot(2))),
        1 => Ok(MatcherSpec::copyright(None, None, slot(0))),
        _ => Err(key_value_error(
            line,
            "copyright takes `start,end,owner`".to_string(),
        )),
    }
}

fn flat_license_def(id: String, flat: FlatLicense) -> LicenseDef {
    let mut alternatives: Vec<MatcherSpec> = flat
        .texts
        .into_values()
        .map(|text| MatcherSpec::text(&text))
        .collect();
    if let Some(tag) = flat.spdx {
        alternatives.push(MatcherSpec::spdx(&tag));
    }
    if let Some(copyright) = flat.copyright {
        alternatives.push(copyright);
    }
    let matcher = match alternatives.len() {
        0 => None,
        1 => alternatives.pop(),
        _ => Some(MatcherSpec::or(alternatives)),
    };
    LicenseDef {
        id,
        family: flat.family,
        notes: flat.notes,
        derived_from: flat.derived_from,
        matcher,
    }
}
