//! Translation source identity and discovery.

use std::path::{Path, PathBuf};

use crate::config::Settings;
use crate::host::Workspace;

/// How a source contributes to the table, derived from its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// A structured key/value document (`.json`).
    Data,
    /// An executable module whose export surface is merged (`.js`, `.ts`).
    Script,
}

impl SourceKind {
    pub fn from_path(path: &Path) -> Option<SourceKind> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Some(SourceKind::Data),
            Some("js") | Some("ts") => Some(SourceKind::Script),
            _ => None,
        }
    }
}

/// One discovered translation source.
///
/// Sources are re-read on every table rebuild and not retained after their
/// exports are merged.
#[derive(Debug, Clone)]
pub struct TranslationSource {
    pub path: PathBuf,
    pub kind: SourceKind,
    /// Language tag derived from the file stem, e.g. `en` for
    /// `locales/en.json`.
    pub locale: Option<String>,
}

impl TranslationSource {
    pub fn classify(path: PathBuf) -> Option<Self> {
        let kind = SourceKind::from_path(&path)?;
        let locale = extract_locale(&path);
        Some(Self { path, kind, locale })
    }
}

/// Extracts the language tag from a source's filename.
///
/// Examples:
/// - "en.json" -> Some("en")
/// - "zh-CN.json" -> Some("zh-CN")
/// - "/path/to/locales/ja.ts" -> Some("ja")
pub fn extract_locale(path: impl AsRef<Path>) -> Option<String> {
    path.as_ref()
        .file_stem()
        .and_then(|stem| stem.to_str())
        .map(|stem| stem.to_string())
}

/// Discover the ordered source list for the current settings.
///
/// The order of the returned list is the order the workspace's matcher
/// produced, and decides merge precedence (later wins). The configured
/// locale is a substring filter on the path; paths whose extension maps to
/// no [`SourceKind`] are skipped with a debug log line.
pub fn discover<W: Workspace>(workspace: &W, settings: &Settings) -> Vec<TranslationSource> {
    let files = match workspace.find_files(&settings.sources) {
        Ok(files) => files,
        Err(err) => {
            log::warn!("translation source discovery failed: {:#}", err);
            return Vec::new();
        }
    };

    files
        .into_iter()
        .filter(|path| {
            settings.locale.is_empty() || path.to_string_lossy().contains(&settings.locale)
        })
        .filter_map(|path| {
            let display = path.display().to_string();
            let source = TranslationSource::classify(path);
            if source.is_none() {
                log::debug!("ignoring {}: not a recognized source kind", display);
            }
            source
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use crate::config::Settings;
    use crate::core::source::*;
    use crate::host::memory::MemoryWorkspace;

    #[test]
    fn test_kind_from_extension() {
        assert_eq!(SourceKind::from_path(Path::new("locales/en.json")), Some(SourceKind::Data));
        assert_eq!(SourceKind::from_path(Path::new("locales/en.js")), Some(SourceKind::Script));
        assert_eq!(SourceKind::from_path(Path::new("locales/en.ts")), Some(SourceKind::Script));
        assert_eq!(SourceKind::from_path(Path::new("locales/en.yaml")), None);
        assert_eq!(SourceKind::from_path(Path::new("locales/en")), None);
    }

    #[test]
    fn test_extract_locale() {
        assert_eq!(extract_locale("locales/en.json"), Some("en".to_string()));
        assert_eq!(extract_locale("locales/zh-CN.ts"), Some("zh-CN".to_string()));
    }

    #[test]
    fn test_discover_applies_locale_filter() {
        let workspace = MemoryWorkspace::new()
            .with_file("locales/de.json", "{}")
            .with_file("locales/en.json", "{}")
            .with_file("locales/en.ts", "export default {}");

        let settings = Settings::default();
        let sources = discover(&workspace, &settings);
        let paths: Vec<String> = sources
            .iter()
            .map(|s| s.path.to_string_lossy().to_string())
            .collect();

        assert_eq!(paths, vec!["locales/en.json", "locales/en.ts"]);
    }

    #[test]
    fn test_discover_empty_locale_keeps_all() {
        let workspace = MemoryWorkspace::new()
            .with_file("locales/de.json", "{}")
            .with_file("locales/en.json", "{}");

        let settings = Settings {
            locale: String::new(),
            ..Default::default()
        };
        assert_eq!(discover(&workspace, &settings).len(), 2);
    }

    #[test]
    fn test_discover_skips_unknown_kinds() {
        let workspace = MemoryWorkspace::new().with_file("locales/en.txt", "hello");
        let settings = Settings {
            sources: "locales/*.{json,js,ts,txt}".to_string(),
            ..Default::default()
        };
        assert!(discover(&workspace, &settings).is_empty());
    }
}
