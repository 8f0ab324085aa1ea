//! Command dispatch.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use super::args::{AnnotateCommand, Arguments, Command, CommonArgs, KeysCommand};
use super::{ExitStatus, report};
use crate::config::{self, CONFIG_FILE_NAME, Settings};
use crate::core::scan::CallSiteScanner;
use crate::core::sync::AnnotationSynchronizer;
use crate::core::table;
use crate::host::fs::FsWorkspace;
use crate::host::memory::BufferEditor;

pub fn run(args: Arguments) -> Result<ExitStatus> {
    match args.command {
        Some(Command::Annotate(cmd)) => annotate(&cmd),
        Some(Command::Keys(cmd)) => keys(&cmd),
        Some(Command::Init) => init(),
        None => Ok(ExitStatus::Success),
    }
}

fn effective_settings(common: &CommonArgs) -> Result<Settings> {
    let cwd = std::env::current_dir().context("Failed to determine working directory")?;
    let mut settings = config::load_settings(&cwd)?.settings;
    if let Some(sources) = &common.sources {
        settings.sources = sources.clone();
    }
    if let Some(locale) = &common.locale {
        settings.locale = locale.clone();
    }
    if let Some(functions) = &common.functions {
        settings.functions = functions.clone();
    }
    settings.validate()?;
    Ok(settings)
}

fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")
}

fn annotate(cmd: &AnnotateCommand) -> Result<ExitStatus> {
    let settings = effective_settings(&cmd.common)?;
    let text = fs::read_to_string(&cmd.file)
        .with_context(|| format!("Failed to read {}", cmd.file.display()))?;

    let scanner = CallSiteScanner::new(&settings.function_names())
        .context("Failed to compile translation-function pattern")?;
    let call_sites = scanner.scan(&text).count();

    let cwd = std::env::current_dir()?;
    let mut sync = AnnotationSynchronizer::new(
        FsWorkspace::new(cwd),
        BufferEditor::with_text(text.clone()),
        settings,
    )?;
    runtime()?.block_on(sync.activate());

    let annotations = sync.editor().annotations();
    report::print_annotations(&cmd.file, &text, annotations);

    if call_sites > 0 && annotations.is_empty() {
        return Ok(ExitStatus::Failure);
    }
    Ok(ExitStatus::Success)
}

fn keys(cmd: &KeysCommand) -> Result<ExitStatus> {
    let settings = effective_settings(&cmd.common)?;
    let cwd = std::env::current_dir()?;
    let workspace = FsWorkspace::new(cwd);

    let mut build = table::build_table(&workspace, &settings);
    runtime()?.block_on(async {
        for pending in std::mem::take(&mut build.pending) {
            let source = pending.source.clone();
            if let Some((bucket, value)) = pending.settle().await {
                build.table.apply_settled(&source, bucket, value);
            }
        }
    });

    report::print_keys(&build.table);
    Ok(ExitStatus::Success)
}

fn init() -> Result<ExitStatus> {
    let path = Path::new(CONFIG_FILE_NAME);
    if path.exists() {
        println!("{} already exists, leaving it untouched.", CONFIG_FILE_NAME);
        return Ok(ExitStatus::Success);
    }
    let mut content = config::default_settings_json()?;
    content.push('\n');
    fs::write(path, content).with_context(|| format!("Failed to write {}", CONFIG_FILE_NAME))?;
    println!("Created {}.", CONFIG_FILE_NAME);
    Ok(ExitStatus::Success)
}
