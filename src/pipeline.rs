//! Build Pipeline - Single Entry Point
//!
//! CRITICAL: pack MUST validate internally. No bypass.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::archive::{collect_assets, AssetFile, BundleWriter, MANIFEST_ENTRY};
use crate::hashing::{compute_bundle_digest, sha256_hex};
use crate::manifest::Manifest;
use crate::rules::{FontSet, RenderedPage, RulesRenderer};
use crate::validation::{BundleInput, ValidationResult, Validator};
use crate::ENGINE_VERSION;

#[cfg(feature = "test-hooks")]
use std::sync::atomic::{AtomicU32, Ordering};

#[cfg(feature = "test-hooks")]
static VALIDATION_CALL_COUNT: AtomicU32 = AtomicU32::new(0);

#[cfg(feature = "test-hooks")]
pub fn get_validation_call_count() -> u32 {
    VALIDATION_CALL_COUNT.load(Ordering::SeqCst)
}

#[cfg(feature = "test-hooks")]
pub fn reset_validation_call_count() {
    VALIDATION_CALL_COUNT.store(0, Ordering::SeqCst);
}

/// Fixed build layout, relative to the build root.
pub const TEMPLATE_FILE: &str = "template.json";
pub const IMAGES_DIR: &str = "images";
pub const RULES_FILE: &str = "rules.md";
pub const FONTS_DIR: &str = "fonts";
pub const OUTPUT_FILE: &str = "output.pcio";

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Failed to read template {path}: {source}")]
    ManifestRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Malformed template JSON: {0}")]
    ManifestJson(#[from] serde_json::Error),

    #[error("Failed to read image directory {path}: {source}")]
    AssetDirRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to read asset {path}: {source}")]
    AssetRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to read rules document {path}: {source}")]
    RulesRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to read font {path}: {source}")]
    FontRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write page {path}: {source}")]
    PageWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("Failed to write bundle {path}: {source}")]
    BundleWrite {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// One archive entry row in the build report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntrySummary {
    pub path: String,
    pub size: u64,
    pub sha256: String,
}

/// Summary of one finished build, printed by the CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildReport {
    pub id: String,
    pub engine_version: String,
    pub created_at: DateTime<Utc>,
    pub bundle_path: PathBuf,
    pub manifest_hash: String,
    pub bundle_digest: String,
    pub pages_rendered: usize,
    pub validation: ValidationResult,
    pub entries: Vec<EntrySummary>,
}

/// The build pipeline - single entry point for rendering and packaging
pub struct BuildPipeline {
    root: PathBuf,
    validator: Validator,
}

impl BuildPipeline {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            validator: Validator::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Render the rules document into per-page SVG files in the image
    /// directory, so the packer picks them up as ordinary assets.
    pub fn render_rules(&self) -> Result<Vec<RenderedPage>, BuildError> {
        let rules_path = self.root.join(RULES_FILE);
        let document = fs::read_to_string(&rules_path).map_err(|source| BuildError::RulesRead {
            path: rules_path.clone(),
            source,
        })?;
        let fonts = FontSet::load(&self.root.join(FONTS_DIR))?;
        let renderer = RulesRenderer::new(fonts);
        renderer.render_document(&document, &self.root.join(IMAGES_DIR))
    }

    /// Package the template and image directory into the output bundle.
    ///
    /// CRITICAL: This ALWAYS validates first. No bypass possible.
    pub fn pack(&self) -> Result<BuildReport, BuildError> {
        self.pack_with_pages(0)
    }

    /// Full build: optionally render the rules pages, then pack.
    pub fn build(&self, render: bool) -> Result<BuildReport, BuildError> {
        let pages_rendered = if render { self.render_rules()?.len() } else { 0 };
        self.pack_with_pages(pages_rendered)
    }

    /// Validate what the archive is about to contain.
    ///
    /// This is the ONLY validation entry point.
    pub fn validate(&self, manifest: &Manifest, assets: &[AssetFile]) -> ValidationResult {
        #[cfg(feature = "test-hooks")]
        VALIDATION_CALL_COUNT.fetch_add(1, Ordering::SeqCst);

        let mut entry_paths = Vec::with_capacity(assets.len() + 1);
        entry_paths.push(MANIFEST_ENTRY.to_string());
        entry_paths.extend(assets.iter().map(AssetFile::entry_path));
        self.validator.validate(&BundleInput {
            manifest: manifest.value(),
            entry_paths,
            asset_count: assets.len(),
        })
    }

    fn pack_with_pages(&self, pages_rendered: usize) -> Result<BuildReport, BuildError> {
        let manifest = Manifest::load(&self.root.join(TEMPLATE_FILE))?;
        let assets = collect_assets(&self.root.join(IMAGES_DIR))?;

        // MANDATORY: validation runs on every pack. This is non-negotiable.
        let validation = self.validate(&manifest, &assets);
        if !validation.valid {
            let messages: Vec<_> = validation
                .violations
                .iter()
                .map(|v| format!("{}: {}", v.rule, v.message))
                .collect();
            return Err(BuildError::ValidationFailed(messages.join("; ")));
        }
        for violation in validation.warnings() {
            warn!("{}: {}", violation.rule, violation.message);
        }

        let mut writer = BundleWriter::new();
        writer.add_manifest(&manifest)?;
        let manifest_json = manifest.to_entry_json()?;
        let mut entries = vec![EntrySummary {
            path: MANIFEST_ENTRY.to_string(),
            size: manifest_json.len() as u64,
            sha256: sha256_hex(manifest_json.as_bytes()),
        }];

        for asset in &assets {
            let bytes = fs::read(&asset.path).map_err(|source| BuildError::AssetRead {
                path: asset.path.clone(),
                source,
            })?;
            writer.add_asset(&asset.name, &bytes)?;
            entries.push(EntrySummary {
                path: asset.entry_path(),
                size: bytes.len() as u64,
                sha256: sha256_hex(&bytes),
            });
        }

        let bytes = writer.finish_to_bytes()?;
        let bundle_path = self.root.join(OUTPUT_FILE);
        fs::write(&bundle_path, &bytes).map_err(|source| BuildError::BundleWrite {
            path: bundle_path.clone(),
            source,
        })?;
        info!(
            "wrote {} ({} entries, {} bytes)",
            bundle_path.display(),
            entries.len(),
            bytes.len()
        );

        Ok(BuildReport {
            id: Uuid::new_v4().to_string(),
            engine_version: ENGINE_VERSION.to_string(),
            created_at: Utc::now(),
            bundle_path,
            manifest_hash: manifest.hash()?,
            bundle_digest: compute_bundle_digest(&entries, ENGINE_VERSION)?,
            pages_rendered,
            validation,
            entries,
        })
    }
}
