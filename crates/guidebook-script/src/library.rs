//! Read-only access to campaign guides by id.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use crate::error::ScriptError;
use crate::guide::CampaignGuide;

/// The script source consumed by the interpreter.
pub trait GuideSource: Send + Sync {
    /// Returns the guide registered under `guide_id`.
    fn guide(&self, guide_id: &str) -> Option<Arc<CampaignGuide>>;

    /// Returns the version hash of the guide registered under `guide_id`.
    fn version_hash(&self, guide_id: &str) -> Option<String>;
}

/// A registered guide and the hash computed when it was registered.
#[derive(Debug, Clone)]
pub struct LoadedGuide {
    pub guide: Arc<CampaignGuide>,
    pub version_hash: String,
}

/// An in-memory set of guides keyed by guide id.
#[derive(Debug, Default, Clone)]
pub struct GuideLibrary {
    guides: BTreeMap<String, LoadedGuide>,
}

impl GuideLibrary {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a guide.
    ///
    /// # Errors
    ///
    /// Returns `ScriptError::DuplicateGuide` if the id is already taken.
    pub fn insert(&mut self, guide: CampaignGuide) -> Result<(), ScriptError> {
        if self.guides.contains_key(&guide.id) {
            return Err(ScriptError::DuplicateGuide(guide.id));
        }
        let version_hash = guide.version_hash();
        self.guides.insert(
            guide.id.clone(),
            LoadedGuide {
                guide: Arc::new(guide),
                version_hash,
            },
        );
        Ok(())
    }

    /// Loads every `.yaml`, `.yml` and `.json` document in `dir`.
    ///
    /// # Errors
    ///
    /// Returns the first read, parse, validation or duplicate-id error.
    pub fn load_dir(dir: &Path) -> Result<Self, ScriptError> {
        let io_error = |source| ScriptError::Io {
            path: dir.to_path_buf(),
            source,
        };
        let mut paths = Vec::new();
        for entry in std::fs::read_dir(dir).map_err(io_error)? {
            paths.push(entry.map_err(io_error)?.path());
        }
        paths.sort();

        let mut library = Self::new();
        for path in paths {
            let guide = match path.extension().and_then(|e| e.to_str()) {
                Some("yaml" | "yml") => CampaignGuide::from_yaml_str(&read(&path)?)?,
                Some("json") => CampaignGuide::from_json_str(&read(&path)?)?,
                _ => continue,
            };
            tracing::info!(
                guide_id = %guide.id,
                version = guide.version,
                path = %path.display(),
                "loaded campaign guide"
            );
            library.insert(guide)?;
        }
        Ok(library)
    }

    /// All registered guides, ordered by id.
    pub fn iter(&self) -> impl Iterator<Item = &LoadedGuide> {
        self.guides.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.guides.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.guides.is_empty()
    }
}

impl GuideSource for GuideLibrary {
    fn guide(&self, guide_id: &str) -> Option<Arc<CampaignGuide>> {
        self.guides.get(guide_id).map(|loaded| Arc::clone(&loaded.guide))
    }

    fn version_hash(&self, guide_id: &str) -> Option<String> {
        self.guides
            .get(guide_id)
            .map(|loaded| loaded.version_hash.clone())
    }
}

fn read(path: &Path) -> Result<String, ScriptError> {
    std::fs::read_to_string(path).map_err(|source| ScriptError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn guide(id: &str) -> CampaignGuide {
        CampaignGuide {
            id: id.to_owned(),
            name: id.to_owned(),
            version: 1,
            min_compatible_version: 0,
            scenarios: Vec::new(),
            log_sections: Vec::new(),
            achievements: Vec::new(),
            chaos_bags: BTreeMap::new(),
        }
    }

    #[test]
    fn test_insert_rejects_duplicate_ids() {
        let mut library = GuideLibrary::new();
        library.insert(guide("core")).unwrap();

        let result = library.insert(guide("core"));

        assert!(matches!(result, Err(ScriptError::DuplicateGuide(id)) if id == "core"));
        assert_eq!(library.len(), 1);
    }

    #[test]
    fn test_guide_source_returns_registered_guide() {
        let mut library = GuideLibrary::new();
        library.insert(guide("dunwich")).unwrap();

        assert_eq!(library.guide("dunwich").unwrap().id, "dunwich");
        assert!(library.guide("carcosa").is_none());
    }

    #[test]
    fn test_version_hash_is_computed_at_registration() {
        let mut library = GuideLibrary::new();
        library.insert(guide("dunwich")).unwrap();

        assert_eq!(
            library.version_hash("dunwich"),
            Some(guide("dunwich").version_hash())
        );
        assert!(library.version_hash("carcosa").is_none());
    }

    #[test]
    fn test_load_dir_reports_missing_directory() {
        let result = GuideLibrary::load_dir(Path::new("/definitely/not/here"));

        assert!(matches!(result, Err(ScriptError::Io { .. })));
    }
}
