//! Asset minification before compression.
//!
//! Three strategies:
//! - `None`: content is compressed as-is (icons, pre-minified JS)
//! - `External`: a command-line minifier writes an intermediate file
//! - `Builtin`: in-process minification, oxc for JS, lightningcss for CSS,
//!   serde_json for JSON

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow, bail};
use lightningcss::stylesheet::{ParserOptions, PrinterOptions, StyleSheet};
use oxc::allocator::Allocator;
use oxc::codegen::{Codegen, CodegenOptions, CommentOptions};
use oxc::mangler::MangleOptions;
use oxc::minifier::{CompressOptions, Minifier as OxcMinifier, MinifierOptions};
use oxc::parser::Parser;
use oxc::span::SourceType;

use super::AssetRoute;
use crate::debug;
use crate::utils::exec::Cmd;

/// Placeholder replaced with the source path in external minifier args.
pub const INPUT_PLACEHOLDER: &str = "{input}";
/// Placeholder replaced with the intermediate path in external minifier args.
pub const OUTPUT_PLACEHOLDER: &str = "{output}";

/// How an asset is minified before it is compressed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Minifier {
    None,
    Builtin,
    External { program: String, args: Vec<String> },
}

/// Content ready for the compress step.
#[derive(Debug)]
pub struct Minified {
    /// Bytes to compress
    pub bytes: Vec<u8>,
    /// File the bytes were read from (shown in diagnostics)
    pub input: PathBuf,
    /// Intermediate file to remove once the artifact is recorded
    pub intermediate: Option<PathBuf>,
}

impl Minified {
    /// Remove the intermediate file, if any.
    pub fn cleanup(&self) -> Result<()> {
        let Some(path) = &self.intermediate else {
            return Ok(());
        };
        match fs::remove_file(path) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e)
                .with_context(|| format!("Failed to remove intermediate '{}'", path.display())),
            _ => Ok(()),
        }
    }
}

impl Minifier {
    /// The clean-css CLI with level 1 optimizations and special comments stripped.
    pub fn cleancss() -> Self {
        Self::External {
            program: "cleancss".into(),
            args: [
                "-O1",
                "specialComments:0",
                INPUT_PLACEHOLDER,
                "-o",
                OUTPUT_PLACEHOLDER,
            ]
            .map(String::from)
            .to_vec(),
        }
    }

    /// Produce the bytes to compress for `route`.
    ///
    /// `root` is the working directory for external minifiers.
    pub fn apply(&self, route: &AssetRoute, root: &Path) -> Result<Minified> {
        match self {
            Self::None => Ok(Minified {
                bytes: read_source(&route.source)?,
                input: route.source.clone(),
                intermediate: None,
            }),
            Self::Builtin => {
                let bytes = read_source(&route.source)?;
                let bytes = minify_by_ext(route.extension().as_deref(), bytes)
                    .with_context(|| format!("Failed to minify '{}'", route.source.display()))?;
                Ok(Minified {
                    bytes,
                    input: route.source.clone(),
                    intermediate: None,
                })
            }
            Self::External { program, args } => run_external(program, args, route, root),
        }
    }
}

fn read_source(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("Failed to read source '{}'", path.display()))
}

// ============================================================================
// External minifier
// ============================================================================

/// Substitute `{input}` / `{output}` in minifier arguments.
pub fn resolve_args(args: &[String], input: &Path, output: &Path) -> Vec<String> {
    let input = input.display().to_string();
    let output = output.display().to_string();
    args.iter()
        .map(|arg| {
            arg.replace(INPUT_PLACEHOLDER, &input)
                .replace(OUTPUT_PLACEHOLDER, &output)
        })
        .collect()
}

fn run_external(
    program: &str,
    args: &[String],
    route: &AssetRoute,
    root: &Path,
) -> Result<Minified> {
    if !route.source.is_file() {
        bail!("Source '{}' does not exist", route.source.display());
    }

    let path = std::env::var_os("PATH");
    let resolved = which::which_in(program, path, root).map_err(|_| {
        let hint = if program == "cleancss" {
            " (install it with `npm install clean-css-cli -g`)"
        } else {
            ""
        };
        anyhow!("Minifier `{program}` not found{hint}")
    })?;

    let intermediate = &route.intermediate;
    if let Some(parent) = intermediate.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory '{}'", parent.display()))?;
    }
    // A leftover from an earlier run must not pass for fresh output.
    if intermediate.exists() {
        fs::remove_file(intermediate).with_context(|| {
            format!("Failed to remove stale intermediate '{}'", intermediate.display())
        })?;
    }

    debug!("minify"; "{} -> {}", route.source.display(), intermediate.display());
    let status = Cmd::new(&resolved)
        .args(resolve_args(args, &route.source, intermediate))
        .cwd(root)
        .run();
    if let Err(e) = status {
        // Partial output from a failed run is never left behind.
        if let Err(rm) = fs::remove_file(intermediate)
            && rm.kind() != io::ErrorKind::NotFound
        {
            debug!("minify"; "failed to remove '{}': {rm}", intermediate.display());
        }
        return Err(e).with_context(|| format!("Failed to minify '{}'", route.source.display()));
    }

    let bytes = fs::read(intermediate).with_context(|| {
        format!(
            "Minifier `{program}` produced no output at '{}'",
            intermediate.display()
        )
    })?;

    Ok(Minified {
        bytes,
        input: intermediate.clone(),
        intermediate: Some(intermediate.clone()),
    })
}

// ============================================================================
// Builtin minifiers
// ============================================================================

/// Minify content based on file extension; unknown kinds pass through.
pub fn minify_by_ext(ext: Option<&str>, bytes: Vec<u8>) -> Result<Vec<u8>> {
    let minify: fn(&str) -> Result<String> = match ext {
        Some("js" | "mjs") => minify_js,
        Some("css") => minify_css,
        Some("json") => minify_json,
        _ => return Ok(bytes),
    };
    let source = String::from_utf8(bytes).context("Source is not valid UTF-8")?;
    Ok(minify(&source)?.into_bytes())
}

/// Minify JavaScript source code.
pub fn minify_js(source: &str) -> Result<String> {
    let allocator = Allocator::default();
    let source_type = SourceType::mjs();
    let ret = Parser::new(&allocator, source, source_type).parse();
    if let Some(first) = ret.errors.first() {
        bail!("{} JavaScript parse error(s): {:?}", ret.errors.len(), first);
    }
    let mut program = ret.program;
    let options = MinifierOptions {
        mangle: Some(MangleOptions::default()),
        compress: Some(CompressOptions::smallest()),
    };
    let ret = OxcMinifier::new(options).minify(&allocator, &mut program);
    let code = Codegen::new()
        .with_options(CodegenOptions {
            minify: true,
            comments: CommentOptions::disabled(),
            ..CodegenOptions::default()
        })
        .with_scoping(ret.scoping)
        .build(&program)
        .code;
    Ok(code)
}

/// Minify CSS source code.
pub fn minify_css(source: &str) -> Result<String> {
    let stylesheet = StyleSheet::parse(source, ParserOptions::default())
        .map_err(|e| anyhow!("CSS parse error: {e}"))?;
    let result = stylesheet
        .to_css(PrinterOptions {
            minify: true,
            ..PrinterOptions::default()
        })
        .map_err(|e| anyhow!("CSS print error: {e}"))?;
    Ok(result.code)
}

/// Re-serialize JSON without whitespace, keeping key order.
pub fn minify_json(source: &str) -> Result<String> {
    let value: serde_json::Value = serde_json::from_str(source).context("JSON parse error")?;
    Ok(serde_json::to_string(&value)?)
}
