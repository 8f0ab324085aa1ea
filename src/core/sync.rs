//! The annotation synchronizer.
//!
//! Owns the only shared mutable state in the system: the current
//! translation table and the painted annotation set. Both are replaced
//! wholesale, never mutated in place, so observers always see either the
//! old or the new complete value.

use std::ops::Range;
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::config::Settings;
use crate::core::resolve;
use crate::core::sandbox::PendingExport;
use crate::core::scan::CallSiteScanner;
use crate::core::table::{self, TranslationTable};
use crate::host::{EditorHost, Workspace};

/// One painted inline annotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    /// Byte range of the key text (quotes excluded) in the scanned
    /// snapshot.
    pub range: Range<usize>,
    /// The resolved translation shown inline.
    pub display: String,
    /// Hover text: the function name and original key.
    pub hover: String,
}

/// A trigger that requires reconciling the annotations with reality.
#[derive(Debug, Clone)]
pub enum SyncEvent {
    /// The active buffer switched.
    BufferActivated,
    /// The active buffer's text changed.
    BufferEdited,
    /// A file was saved. Only saves matching the source pattern reload the
    /// table.
    SourceSaved(PathBuf),
    /// One of the recognized options changed.
    SettingsChanged(Settings),
}

pub struct AnnotationSynchronizer<W, E> {
    workspace: W,
    editor: E,
    settings: Settings,
    scanner: CallSiteScanner,
    table: TranslationTable,
    table_version: u64,
    pending: Vec<PendingExport>,
}

impl<W: Workspace, E: EditorHost> AnnotationSynchronizer<W, E> {
    pub fn new(workspace: W, editor: E, settings: Settings) -> Result<Self> {
        let scanner = CallSiteScanner::new(&settings.function_names())
            .context("Failed to compile translation-function pattern")?;
        Ok(Self {
            workspace,
            editor,
            settings,
            scanner,
            table: TranslationTable::default(),
            table_version: 0,
            pending: Vec::new(),
        })
    }

    pub fn editor(&self) -> &E {
        &self.editor
    }

    pub fn editor_mut(&mut self) -> &mut E {
        &mut self.editor
    }

    pub fn table(&self) -> &TranslationTable {
        &self.table
    }

    /// Monotonic counter, bumped by every reload and by settled pending
    /// exports. The annotation pass always paints against the latest
    /// completed version.
    pub fn table_version(&self) -> u64 {
        self.table_version
    }

    /// Initial pass: load, paint, settle.
    pub async fn activate(&mut self) {
        self.reload();
        self.resync();
        self.settle_pending().await;
    }

    pub async fn handle_event(&mut self, event: SyncEvent) -> Result<()> {
        match event {
            SyncEvent::BufferActivated | SyncEvent::BufferEdited => self.resync(),
            SyncEvent::SourceSaved(path) => {
                if self.workspace.matches(&self.settings.sources, &path) {
                    self.reload();
                    self.resync();
                    self.settle_pending().await;
                }
            }
            SyncEvent::SettingsChanged(settings) => {
                self.scanner = CallSiteScanner::new(&settings.function_names())
                    .context("Failed to compile translation-function pattern")?;
                self.settings = settings;
                self.reload();
                self.resync();
                self.settle_pending().await;
            }
        }
        Ok(())
    }

    /// Rebuild the table wholesale from the current file set.
    pub fn reload(&mut self) {
        let build = table::build_table(&self.workspace, &self.settings);
        self.table = build.table;
        self.pending = build.pending;
        self.table_version += 1;
    }

    /// Recompute and repaint the full annotation set for the active buffer.
    ///
    /// Idempotent, and a no-op when no buffer is active.
    pub fn resync(&mut self) {
        let Some(buffer) = self.editor.active_buffer() else {
            return;
        };
        let annotations = self.annotate(&buffer.text);
        self.editor.replace_annotations(annotations);
    }

    /// Await exports that were still settling after the last reload, merge
    /// them, and repaint. Returns true if the table changed.
    pub async fn settle_pending(&mut self) -> bool {
        if self.pending.is_empty() {
            return false;
        }
        let mut settled = false;
        for pending in std::mem::take(&mut self.pending) {
            let source = pending.source.clone();
            match pending.settle().await {
                Some((bucket, value)) => {
                    self.table.apply_settled(&source, bucket, value);
                    settled = true;
                }
                None => log::warn!("pending export from {} never settled", source.display()),
            }
        }
        if settled {
            self.table_version += 1;
            self.resync();
        }
        settled
    }

    fn annotate(&self, text: &str) -> Vec<Annotation> {
        self.scanner
            .scan(text)
            .filter_map(|site| {
                let value = self.table.resolve(site.key)?;
                let display = resolve::display_text(value)?;
                Some(Annotation {
                    range: site.key_range.clone(),
                    display,
                    hover: format!("{}(\"{}\")", site.function, site.key),
                })
            })
            .collect()
    }
}
