//! CLI integration tests.

use std::{
    fs,
    path::PathBuf,
    process::Command,
};

use anyhow::{Context, Result};
use tempfile::TempDir;

const BIN: &str = env!("CARGO_BIN_EXE_keylens");

struct CliTest {
    _temp_dir: TempDir,
    project_dir: PathBuf,
}

impl CliTest {
    fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let project_dir = temp_dir.path().canonicalize()?;
        Ok(Self {
            _temp_dir: temp_dir,
            project_dir,
        })
    }

    fn write_file(&self, path: &str, content: &str) -> Result<()> {
        let file_path = self.project_dir.join(path);

        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        fs::write(&file_path, content)
            .with_context(|| format!("Failed to write file: {}", file_path.display()))?;

        Ok(())
    }

    fn run(&self, args: &[&str]) -> Result<(i32, String, String)> {
        let output = Command::new(BIN)
            .args(args)
            .current_dir(&self.project_dir)
            .env("NO_COLOR", "1")
            .output()?;
        Ok((
            output.status.code().unwrap_or(-1),
            String::from_utf8_lossy(&output.stdout).to_string(),
            String::from_utf8_lossy(&output.stderr).to_string(),
        ))
    }
}

#[test]
fn test_annotate_end_to_end() -> Result<()> {
    let test = CliTest::new()?;
    test.write_file("locales/en.json", r#"{"hi":"Hello"}"#)?;
    test.write_file("src/app.ts", r#"const msg = t("hi");"#)?;

    let (code, stdout, _) = test.run(&["annotate", "src/app.ts"])?;
    assert_eq!(code, 0);
    assert!(stdout.contains("Hello"), "stdout: {stdout}");
    assert!(stdout.contains("t(\"hi\")"), "stdout: {stdout}");
    Ok(())
}

#[test]
fn test_annotate_script_source_with_function_override() -> Result<()> {
    let test = CliTest::new()?;
    test.write_file(
        "locales/en.ts",
        r#"export default { greeting: "Good day" };"#,
    )?;
    test.write_file("src/app.ts", r#"translate("greeting")"#)?;

    let (code, stdout, _) = test.run(&[
        "annotate",
        "src/app.ts",
        "--functions",
        "t, translate",
    ])?;
    assert_eq!(code, 0);
    assert!(stdout.contains("Good day"), "stdout: {stdout}");
    Ok(())
}

#[test]
fn test_annotate_unresolved_calls_exit_failure() -> Result<()> {
    let test = CliTest::new()?;
    test.write_file("src/app.ts", r#"t("missing.key")"#)?;

    let (code, stdout, _) = test.run(&["annotate", "src/app.ts"])?;
    assert_eq!(code, 1);
    assert!(stdout.contains("No translation calls resolved"), "stdout: {stdout}");
    Ok(())
}

#[test]
fn test_annotate_missing_file_is_an_error() -> Result<()> {
    let test = CliTest::new()?;
    let (code, _, stderr) = test.run(&["annotate", "src/nope.ts"])?;
    assert_eq!(code, 2);
    assert!(stderr.contains("Failed to read"), "stderr: {stderr}");
    Ok(())
}

#[test]
fn test_keys_lists_merged_table() -> Result<()> {
    let test = CliTest::new()?;
    test.write_file(
        "locales/en.json",
        r#"{"menu":{"file":"File"},"hi":"Hello"}"#,
    )?;

    let (code, stdout, _) = test.run(&["keys"])?;
    assert_eq!(code, 0);
    assert!(stdout.contains("menu.file"), "stdout: {stdout}");
    assert!(stdout.contains("File"), "stdout: {stdout}");
    assert!(stdout.contains("hi"), "stdout: {stdout}");
    Ok(())
}

#[test]
fn test_keys_respects_locale_flag() -> Result<()> {
    let test = CliTest::new()?;
    test.write_file("locales/en.json", r#"{"hi":"Hello"}"#)?;
    test.write_file("locales/de.json", r#"{"hi":"Hallo"}"#)?;

    let (code, stdout, _) = test.run(&["keys", "--locale", "de"])?;
    assert_eq!(code, 0);
    assert!(stdout.contains("Hallo"), "stdout: {stdout}");
    assert!(!stdout.contains("Hello"), "stdout: {stdout}");
    Ok(())
}

#[test]
fn test_init_writes_config_once() -> Result<()> {
    let test = CliTest::new()?;

    let (code, stdout, _) = test.run(&["init"])?;
    assert_eq!(code, 0);
    assert!(stdout.contains("Created"), "stdout: {stdout}");

    let config = fs::read_to_string(test.project_dir.join(".keylensrc.json"))?;
    assert!(config.contains("locales/**/*.{json,js,ts}"));

    let (code, stdout, _) = test.run(&["init"])?;
    assert_eq!(code, 0);
    assert!(stdout.contains("already exists"), "stdout: {stdout}");
    Ok(())
}

#[test]
fn test_config_file_is_respected() -> Result<()> {
    let test = CliTest::new()?;
    test.write_file(".keylensrc.json", r#"{ "locale": "de" }"#)?;
    test.write_file("locales/de.json", r#"{"hi":"Hallo"}"#)?;
    test.write_file("src/app.ts", r#"t("hi")"#)?;

    let (code, stdout, _) = test.run(&["annotate", "src/app.ts"])?;
    assert_eq!(code, 0);
    assert!(stdout.contains("Hallo"), "stdout: {stdout}");
    Ok(())
}
