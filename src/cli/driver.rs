//! Batch resolution driver.
//!
//! Collects source files, resolves each to the requested pass, and gathers
//! diagnostics and optional outputs (regenerated sources, declaration
//! dumps, unused-import warnings). A fatal diagnostic stops the offending
//! unit but not the batch.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use jaz_common::{Diagnostic, codes};
use jaz_emitter::emit_unit;
use jaz_resolver::{
    NumberedDecl, ResolutionContext, ResolvePass, UnitId, number_unit, resolve, unused_imports,
};
use walkdir::WalkDir;

use crate::cli::args::CliArgs;

const SOURCE_EXT: &str = "jav";

/// Everything one driver run produced.
#[derive(Debug, Default)]
pub struct ResolveResult {
    pub diagnostics: Vec<Diagnostic>,
    /// (file, regenerated source) per successfully resolved unit.
    pub emitted_sources: Vec<(String, String)>,
    /// (file, numbering) per successfully resolved unit.
    pub declaration_dumps: Vec<(String, Vec<NumberedDecl>)>,
    /// (file, text) of every source read, for diagnostic rendering.
    pub sources: Vec<(String, String)>,
}

impl ResolveResult {
    pub fn error_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.is_error()).count()
    }
}

pub fn run(args: &CliArgs) -> Result<ResolveResult> {
    let pass = ResolvePass::from_level(args.pass)
        .unwrap_or_else(|| unreachable!("clap bounds the pass level"));
    if args.dump_decls && pass != ResolvePass::Names {
        bail!("--dump-decls requires --pass 2");
    }
    if args.check_imports && pass != ResolvePass::Names {
        bail!("--check-imports requires --pass 2");
    }

    let files = collect_files(&args.files)?;
    if files.is_empty() {
        bail!("no source files found");
    }
    tracing::info!(files = files.len(), ?pass, "starting resolution");

    let mut ctx = ResolutionContext::new(args.sourcepath.clone());
    let mut result = ResolveResult::default();

    let mut units: Vec<UnitId> = Vec::new();
    for path in &files {
        let name = path.display().to_string();
        let source = match std::fs::read_to_string(path) {
            Ok(s) => s,
            Err(err) => {
                result.diagnostics.push(Diagnostic::error(
                    &name,
                    codes::LOAD_FAILED,
                    format!("cannot read source: {err}"),
                ));
                continue;
            }
        };
        result.sources.push((name.clone(), source.clone()));
        match ctx.add_unit(&name, &source) {
            Ok(unit) => units.push(unit),
            Err(diagnostic) => result.diagnostics.push(diagnostic),
        }
    }

    for unit in units {
        if let Err(diagnostic) = resolve(&mut ctx, unit, pass) {
            result.diagnostics.push(diagnostic);
            continue;
        }
        if args.check_imports {
            result.diagnostics.extend(unused_imports::check(&ctx, unit));
        }
        if args.emit {
            let u = ctx.unit(unit);
            result
                .emitted_sources
                .push((u.file.clone(), emit_unit(&u.arena, u.root)));
        }
        if args.dump_decls {
            result
                .declaration_dumps
                .push((ctx.unit(unit).file.clone(), number_unit(&ctx, unit)));
        }
    }
    tracing::info!(
        errors = result.error_count(),
        warnings = result.diagnostics.len() - result.error_count(),
        "resolution finished"
    );
    Ok(result)
}

/// Expand the file arguments: directories are walked recursively for
/// source files, in sorted order so runs are deterministic.
fn collect_files(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for input in inputs {
        if input.is_dir() {
            let mut found: Vec<PathBuf> = WalkDir::new(input)
                .sort_by_file_name()
                .into_iter()
                .filter_map(|e| e.ok())
                .filter(|e| e.file_type().is_file() && has_source_ext(e.path()))
                .map(|e| e.into_path())
                .collect();
            files.append(&mut found);
        } else {
            std::fs::metadata(input)
                .with_context(|| format!("cannot access `{}`", input.display()))?;
            files.push(input.clone());
        }
    }
    Ok(files)
}

fn has_source_ext(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some(SOURCE_EXT)
}
