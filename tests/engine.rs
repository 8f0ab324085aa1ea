//! End-to-end engine tests against a real filesystem workspace.

use std::fs;

use keylens::config::Settings;
use keylens::core::sync::{AnnotationSynchronizer, SyncEvent};
use keylens::host::fs::FsWorkspace;
use keylens::host::memory::BufferEditor;
use tempfile::tempdir;

#[tokio::test]
async fn annotates_from_mixed_sources() {
    let dir = tempdir().unwrap();
    fs::create_dir_all(dir.path().join("locales")).unwrap();
    fs::write(
        dir.path().join("locales/en.json"),
        r#"{"hi":"Hello","menu":{"file":"File"}}"#,
    )
    .unwrap();
    fs::write(
        dir.path().join("locales/en.ts"),
        r#"export default { hi: "Hello again" };"#,
    )
    .unwrap();

    let buffer = r#"const a = t("hi"); const b = t("menu.file");"#;
    let mut sync = AnnotationSynchronizer::new(
        FsWorkspace::new(dir.path()),
        BufferEditor::with_text(buffer),
        Settings::default(),
    )
    .unwrap();
    sync.activate().await;

    let annotations = sync.editor().annotations();
    assert_eq!(annotations.len(), 2);
    // en.json merges before en.ts, so the script source wins on "hi".
    assert_eq!(annotations[0].display, "Hello again");
    assert_eq!(annotations[1].display, "File");
    assert_eq!(&buffer[annotations[1].range.clone()], "menu.file");
}

#[tokio::test]
async fn saved_source_updates_annotations() {
    let dir = tempdir().unwrap();
    fs::create_dir_all(dir.path().join("locales")).unwrap();
    fs::write(dir.path().join("locales/en.json"), r#"{"hi":"Hello"}"#).unwrap();

    let mut sync = AnnotationSynchronizer::new(
        FsWorkspace::new(dir.path()),
        BufferEditor::with_text(r#"t("hi")"#),
        Settings::default(),
    )
    .unwrap();
    sync.activate().await;
    assert_eq!(sync.editor().annotations()[0].display, "Hello");

    fs::write(dir.path().join("locales/en.json"), r#"{"hi":"Howdy"}"#).unwrap();
    sync.handle_event(SyncEvent::SourceSaved(dir.path().join("locales/en.json")))
        .await
        .unwrap();

    assert_eq!(sync.editor().annotations()[0].display, "Howdy");
}

#[tokio::test]
async fn locale_switch_changes_annotations() {
    let dir = tempdir().unwrap();
    fs::create_dir_all(dir.path().join("locales")).unwrap();
    fs::write(dir.path().join("locales/en.json"), r#"{"hi":"Hello"}"#).unwrap();
    fs::write(dir.path().join("locales/de.json"), r#"{"hi":"Hallo"}"#).unwrap();

    let mut sync = AnnotationSynchronizer::new(
        FsWorkspace::new(dir.path()),
        BufferEditor::with_text(r#"t("hi")"#),
        Settings::default(),
    )
    .unwrap();
    sync.activate().await;
    assert_eq!(sync.editor().annotations()[0].display, "Hello");

    let german = Settings {
        locale: "de".to_string(),
        ..Default::default()
    };
    sync.handle_event(SyncEvent::SettingsChanged(german))
        .await
        .unwrap();

    assert_eq!(sync.editor().annotations()[0].display, "Hallo");
}

#[tokio::test]
async fn pending_script_export_corrects_annotations() {
    let dir = tempdir().unwrap();
    fs::create_dir_all(dir.path().join("locales")).unwrap();
    fs::write(
        dir.path().join("locales/en.js"),
        r#"export default Promise.resolve({ hi: "Hello" });"#,
    )
    .unwrap();

    let mut sync = AnnotationSynchronizer::new(
        FsWorkspace::new(dir.path()),
        BufferEditor::with_text(r#"t("hi")"#),
        Settings::default(),
    )
    .unwrap();

    sync.reload();
    sync.resync();
    assert!(sync.editor().annotations().is_empty());

    assert!(sync.settle_pending().await);
    assert_eq!(sync.editor().annotations()[0].display, "Hello");
}
