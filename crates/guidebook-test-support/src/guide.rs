//! The sample campaign guide shipped in `guides/`.

use guidebook_script::CampaignGuide;

/// Source of the Night of the Zealot sample guide.
pub const SAMPLE_GUIDE_YAML: &str = include_str!("../../../guides/night_of_the_zealot.yaml");

/// Parses the sample guide.
///
/// # Panics
///
/// Panics if the bundled guide no longer parses or validates.
#[must_use]
pub fn sample_guide() -> CampaignGuide {
    CampaignGuide::from_yaml_str(SAMPLE_GUIDE_YAML).expect("sample guide is valid")
}
