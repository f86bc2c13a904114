//! File processing API
//!
//! Runs the whole pipeline for one file: read, parse, optionally sort lists, render.
//! Rendering goes through the [`FormatRegistry`], so the same entry point produces
//! canonical source (`bp`), a JSON dump (`json`) or a tree view (`treeviz`).
//!
//! ```rust,ignore
//! use blueprint::bp::config::FormatConfig;
//! use blueprint::bp::processor::format_source;
//!
//! let out = format_source("Android.bp", "foo{name:\"abc\"}", &FormatConfig::default())?;
//! assert_eq!(out, "foo {\n    name: \"abc\",\n}\n");
//! ```
//!
//! Parsing here is lenient about dangling comments: a reformatting tool should still
//! produce output when some comment cannot be placed.

use crate::bp::ast::{DanglingPolicy, SyntaxTree};
use crate::bp::config::{Config, FormatConfig, ParseConfig};
use crate::bp::formats::{BlueprintFormatter, FormatError, FormatRegistry};
use crate::bp::parsing::{parse_with_config, ParseError};
use crate::bp::scope::Scope;
use crate::bp::sort::sort_lists;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ProcessingError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{}", join_errors(.0))]
    Parse(Vec<ParseError>),
    #[error(transparent)]
    Format(#[from] FormatError),
}

fn join_errors(errors: &[ParseError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Parse `source` for processing; errors fail the whole operation
pub fn parse_source(
    filename: &str,
    source: &str,
    config: ParseConfig,
) -> Result<SyntaxTree, ProcessingError> {
    let mut scope = Scope::new();
    let (tree, errors) = parse_with_config(filename, source, &mut scope, config);
    if !errors.is_empty() {
        debug!(filename, errors = errors.len(), "parse failed");
        return Err(ProcessingError::Parse(errors));
    }
    Ok(tree)
}

/// Render a tree with one of the registered formats
pub fn render(tree: &SyntaxTree, format: &str) -> Result<String, ProcessingError> {
    Ok(FormatRegistry::with_defaults().serialize(tree, format)?)
}

/// Parse, optionally sort, and render `source` in the named format
pub fn process_source(
    filename: &str,
    source: &str,
    format: &str,
    config: &Config,
) -> Result<String, ProcessingError> {
    let mut tree = parse_source(filename, source, config.parse)?;
    if config.format.sort_lists {
        sort_lists(&mut tree);
    }
    let mut registry = FormatRegistry::with_defaults();
    registry.register(BlueprintFormatter {
        config: config.format,
    });
    Ok(registry.serialize(&tree, format)?)
}

/// Reformat Blueprint source into canonical form
pub fn format_source(
    filename: &str,
    source: &str,
    config: &FormatConfig,
) -> Result<String, ProcessingError> {
    let config = Config {
        parse: ParseConfig {
            dangling: DanglingPolicy::Lenient,
            ..ParseConfig::default()
        },
        format: *config,
    };
    process_source(filename, source, "bp", &config)
}

/// Read and reformat a file
pub fn format_file(path: impl AsRef<Path>, config: &FormatConfig) -> Result<String, ProcessingError> {
    let path = path.as_ref();
    let source = fs::read_to_string(path).map_err(|source| ProcessingError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    format_source(&path.to_string_lossy(), &source, config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_source_canonicalizes() {
        let out = format_source("Android.bp", "foo{name:\"abc\"}", &FormatConfig::default())
            .unwrap();
        assert_eq!(out, "foo {\n    name: \"abc\",\n}\n");
    }

    #[test]
    fn test_format_source_sorts_when_asked() {
        let source = "foo {\n    srcs: [\n        \"img2\",\n        \"img10\",\n        \"img1\",\n    ],\n}\n";
        let config = FormatConfig {
            sort_lists: true,
            ..FormatConfig::default()
        };
        let out = format_source("Android.bp", source, &config).unwrap();
        assert_eq!(
            out,
            "foo {\n    srcs: [\n        \"img1\",\n        \"img2\",\n        \"img10\",\n    ],\n}\n"
        );
    }

    #[test]
    fn test_parse_errors_are_reported() {
        let err = format_source("Android.bp", "foo {", &FormatConfig::default()).unwrap_err();
        match err {
            ProcessingError::Parse(errors) => {
                assert_eq!(errors.len(), 1);
                assert!(err_string(&errors).starts_with("Android.bp:1:6: "));
            }
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    fn err_string(errors: &[ParseError]) -> String {
        join_errors(errors)
    }

    #[test]
    fn test_render_formats() {
        let tree = parse_source("Android.bp", "x = 1\n", ParseConfig::default()).unwrap();
        assert_eq!(render(&tree, "bp").unwrap(), "x = 1\n");
        assert!(render(&tree, "treeviz").unwrap().starts_with("⧉ Android.bp\n"));
        assert!(render(&tree, "json").unwrap().contains("\"name\": \"x\""));
        assert!(matches!(
            render(&tree, "xml"),
            Err(ProcessingError::Format(FormatError::FormatNotFound(_)))
        ));
    }

    #[test]
    fn test_format_file_missing() {
        let err = format_file("/nonexistent/Android.bp", &FormatConfig::default()).unwrap_err();
        assert!(matches!(err, ProcessingError::Io { .. }));
    }
}
