//! Core types for market-dl

use serde::{Deserialize, Serialize};

/// Role of a downloadable artifact within a delivery
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    /// The base application package
    Base,
    /// A configuration/feature split package
    Split,
    /// An expansion ("main") data file
    Expansion,
    /// A patch data file
    Patch,
}

impl std::fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ArtifactKind::Base => "base",
            ArtifactKind::Split => "split",
            ArtifactKind::Expansion => "expansion",
            ArtifactKind::Patch => "patch",
        };
        write!(f, "{label}")
    }
}

/// One downloadable artifact from a delivery manifest
///
/// A successful delivery always yields at least one [`ArtifactKind::Base`]
/// artifact; splits, expansions, and patches are appended per the manifest's
/// descriptors.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    /// Local filename for the artifact (`{package}.apk`, `{split}.apk`,
    /// `main.{vc}.{package}.obb`, `patch.{vc}.{package}.obb`)
    pub name: String,

    /// Source URL to download the artifact from
    pub url: String,

    /// Size in bytes as reported by the manifest
    pub size: u64,

    /// Role of the artifact within the delivery
    pub kind: ArtifactKind,
}
