//! Keylens - inline translation annotations for i18n keys
//!
//! Keylens scans source text for calls to translation functions (such as
//! `t("key.path")`), resolves each key against a merged table built from the
//! project's translation sources (JSON data files and JS/TS script modules),
//! and produces inline annotations showing the resolved strings.
//!
//! ## Module Structure
//!
//! - `cli`: Command-line interface layer (user-facing commands)
//! - `config`: Configuration file loading and parsing
//! - `core`: Resolution engine (loading, merging, scanning, synchronizing)
//! - `host`: Editor/workspace collaborator traits and bundled implementations
//! - `logger`: Diagnostic log setup for the binary

pub mod cli;
pub mod config;
pub mod core;
pub mod host;
pub mod logger;
