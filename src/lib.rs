//! CardPack Core - Card Game Bundle Compiler
//!
//! # The Build Contract (Non-Negotiable)
//! 1. The Manifest Round-Trips Untouched
//! 2. Every Regular Image File Ships Exactly Once
//! 3. Rules Pages Render Deterministically
//! 4. The Bundle Lands Whole Or Not At All
//! 5. Packing Always Validates

pub mod archive;
pub mod hashing;
pub mod manifest;
pub mod pipeline;
pub mod rules;
pub mod style;
pub mod validation;

pub use archive::{AssetFile, BundleWriter, ASSET_PREFIX, MANIFEST_ENTRY};
pub use hashing::{canonical_json, compute_bundle_digest, compute_manifest_hash};
pub use manifest::Manifest;
pub use pipeline::{BuildError, BuildPipeline, BuildReport, EntrySummary};
pub use rules::{FontSet, RenderedPage, RulesRenderer, PAGE_SEPARATOR};
pub use style::{BlockKind, BlockStyle, FontWeight, SizeTier};
pub use validation::{ValidationResult, ValidationRule, ValidationViolation, ViolationSeverity};

pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");
