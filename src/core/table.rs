//! Wholesale construction of the translation table.

use std::path::Path;

use serde_json::Value;

use crate::config::Settings;
use crate::core::error::LoadError;
use crate::core::loader;
use crate::core::resolve;
use crate::core::sandbox::{self, ExportBucket, PendingExport};
use crate::core::source::{self, SourceKind, TranslationSource};
use crate::host::Workspace;

pub type TableMap = serde_json::Map<String, Value>;

/// The merged key/value lookup built from all matched sources.
///
/// A table is only ever replaced wholesale: each rebuild starts empty and
/// reprocesses every matched source, so readers never observe a partial
/// merge and entries of vanished sources disappear on their own.
#[derive(Debug, Clone, Default)]
pub struct TranslationTable {
    entries: TableMap,
}

impl TranslationTable {
    pub fn entries(&self) -> &TableMap {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolve a dotted key path against this table.
    pub fn resolve(&self, key: &str) -> Option<&Value> {
        resolve::resolve_key(&self.entries, key)
    }

    fn merge_document(&mut self, document: TableMap) {
        for (key, value) in document {
            self.entries.insert(key, value);
        }
    }

    fn merge_module_export(&mut self, source: &Path, value: Value) {
        match value {
            Value::Object(entries) => self.merge_document(entries),
            _ => log::debug!(
                "{}: module export is not a mapping, nothing to merge",
                source.display()
            ),
        }
    }

    /// A mapping spreads its entries into the table; anything else keeps
    /// its export name as the key.
    fn merge_named_export(&mut self, name: String, value: Value) {
        match value {
            Value::Object(entries) => self.merge_document(entries),
            other => {
                self.entries.insert(name, other);
            }
        }
    }

    pub(crate) fn apply_settled(&mut self, source: &Path, bucket: ExportBucket, value: Value) {
        match bucket {
            ExportBucket::Module => self.merge_module_export(source, value),
            ExportBucket::Named(name) => self.merge_named_export(name, value),
        }
    }
}

/// A completed build pass: the table plus any exports still settling.
pub struct TableBuild {
    pub table: TranslationTable,
    pub pending: Vec<PendingExport>,
}

/// Build the table from scratch over every matched source, in discovery
/// order, later sources overriding earlier ones on key collision.
///
/// Failures are per-source: logged, skipped, never fatal to the pass.
pub fn build_table<W: Workspace>(workspace: &W, settings: &Settings) -> TableBuild {
    let sources = source::discover(workspace, settings);
    let mut table = TranslationTable::default();
    let mut pending = Vec::new();

    for source in &sources {
        if let Err(err) = load_source(workspace, source, &mut table, &mut pending) {
            log::warn!("skipping translation source: {}", err);
        }
    }

    log::debug!(
        "translation table built: {} top-level keys from {} sources ({} pending)",
        table.len(),
        sources.len(),
        pending.len()
    );

    TableBuild { table, pending }
}

fn load_source<W: Workspace>(
    workspace: &W,
    source: &TranslationSource,
    table: &mut TranslationTable,
    pending: &mut Vec<PendingExport>,
) -> Result<(), LoadError> {
    log::debug!(
        "loading translation source {} (locale: {})",
        source.path.display(),
        source.locale.as_deref().unwrap_or("unknown")
    );
    let content = loader::read_source(workspace, &source.path)?;
    match source.kind {
        SourceKind::Data => {
            let document = loader::parse_data(&source.path, &content)?;
            table.merge_document(document);
        }
        SourceKind::Script => {
            let mut exports = sandbox::execute(workspace, &source.path, &content)?;
            if let Some(value) = exports.module.take() {
                table.merge_module_export(&source.path, value);
            }
            for (name, value) in std::mem::take(&mut exports.named) {
                table.merge_named_export(name, value);
            }
            pending.append(&mut exports.pending);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use crate::config::Settings;
    use crate::core::table::*;
    use crate::host::memory::MemoryWorkspace;

    fn settings() -> Settings {
        Settings::default()
    }

    #[test]
    fn test_later_source_wins() {
        let workspace = MemoryWorkspace::new()
            .with_file("locales/en-a.json", r#"{"k":"A","only_a":"a"}"#)
            .with_file("locales/en-b.json", r#"{"k":"B"}"#);

        let build = build_table(&workspace, &settings());
        assert_eq!(build.table.resolve("k"), Some(&json!("B")));
        assert_eq!(build.table.resolve("only_a"), Some(&json!("a")));
    }

    #[test]
    fn test_override_order_follows_discovery_order() {
        // Same file set, opposite contents: the later path still wins.
        let workspace = MemoryWorkspace::new()
            .with_file("locales/en-a.json", r#"{"k":"B"}"#)
            .with_file("locales/en-b.json", r#"{"k":"A"}"#);

        let build = build_table(&workspace, &settings());
        assert_eq!(build.table.resolve("k"), Some(&json!("A")));
    }

    #[test]
    fn test_script_source_matches_data_source() {
        let from_data =
            MemoryWorkspace::new().with_file("locales/en.json", r#"{"hello":"hi"}"#);
        let from_script = MemoryWorkspace::new()
            .with_file("locales/en.js", r#"export default { hello: "hi" };"#);

        let data_build = build_table(&from_data, &settings());
        let script_build = build_table(&from_script, &settings());
        assert_eq!(data_build.table.entries(), script_build.table.entries());
    }

    #[test]
    fn test_named_exports_spread_or_keep_name() {
        let workspace = MemoryWorkspace::new().with_file(
            "locales/en.js",
            r#"
            export const greetings = { hello: "hi" };
            export const farewell = "bye";
            "#,
        );

        let build = build_table(&workspace, &settings());
        // A mapping spreads its entries; a plain value keeps its name.
        assert_eq!(build.table.resolve("hello"), Some(&json!("hi")));
        assert_eq!(build.table.resolve("farewell"), Some(&json!("bye")));
        assert_eq!(build.table.resolve("greetings"), None);
    }

    #[test]
    fn test_broken_source_is_skipped_not_fatal() {
        let workspace = MemoryWorkspace::new()
            .with_file("locales/en-bad.json", "{not json")
            .with_file("locales/en-broken.js", "for (;;) {}")
            .with_file("locales/en-good.json", r#"{"hi":"Hello"}"#);

        let build = build_table(&workspace, &settings());
        assert_eq!(build.table.resolve("hi"), Some(&json!("Hello")));
        assert_eq!(build.table.len(), 1);
    }

    #[test]
    fn test_rebuild_drops_vanished_sources() {
        let mut workspace = MemoryWorkspace::new();
        workspace.insert("locales/en.json", r#"{"hi":"Hello"}"#);

        let build = build_table(&workspace, &settings());
        assert_eq!(build.table.resolve("hi"), Some(&json!("Hello")));

        workspace.remove(std::path::Path::new("locales/en.json"));
        let rebuilt = build_table(&workspace, &settings());
        assert!(rebuilt.table.is_empty());
    }

    #[test]
    fn test_locale_filter_excludes_paths() {
        let workspace = MemoryWorkspace::new()
            .with_file("locales/de.json", r#"{"hi":"Hallo"}"#)
            .with_file("locales/en.json", r#"{"hi":"Hello"}"#);

        let build = build_table(&workspace, &settings());
        assert_eq!(build.table.resolve("hi"), Some(&json!("Hello")));
    }

    #[test]
    fn test_pending_exports_are_collected_not_merged() {
        let workspace = MemoryWorkspace::new().with_file(
            "locales/en.js",
            r#"export default Promise.resolve({ hello: "later" });"#,
        );

        let build = build_table(&workspace, &settings());
        assert!(build.table.is_empty());
        assert_eq!(build.pending.len(), 1);
    }

    #[tokio::test]
    async fn test_settled_pending_merges() {
        let workspace = MemoryWorkspace::new().with_file(
            "locales/en.js",
            r#"export default Promise.resolve({ hello: "later" });"#,
        );

        let mut build = build_table(&workspace, &settings());
        for pending in std::mem::take(&mut build.pending) {
            let source = pending.source.clone();
            let (bucket, value) = pending.settle().await.unwrap();
            build.table.apply_settled(&source, bucket, value);
        }
        assert_eq!(build.table.resolve("hello"), Some(&json!("later")));
    }
}
