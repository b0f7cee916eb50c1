//! Shared helper functions for CLI commands

use console::style;
use miette::{IntoDiagnostic, Result};
use serde_yml::Value;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::bom::QuantityMultipliers;
use crate::core::{BatchReport, Config, HarnessInput};
use crate::yaml::{harness_name, load_document};

/// Input options shared by `build` and `bom`
#[derive(clap::Args, Debug, Clone)]
pub struct InputArgs {
    /// Harness files or directories containing them
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Fragment to prepend to every harness (repeatable)
    #[arg(long, short = 'p')]
    pub prepend: Vec<PathBuf>,

    /// Scale the shared BOM with per-harness quantity multipliers
    #[arg(long, short = 'u')]
    pub use_multipliers: bool,

    /// Multiplier file name, looked up in the output directory
    #[arg(long, short = 'm')]
    pub multiplier_file: Option<String>,
}

fn is_harness_file(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yml") | Some("yaml")
    )
}

/// Expand directories into the harness files below them, keeping argument order
pub fn collect_inputs(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            let mut found: Vec<PathBuf> = WalkDir::new(path)
                .into_iter()
                .filter_map(|e| e.ok())
                .filter(|e| e.file_type().is_file() && is_harness_file(e.path()))
                .map(|e| e.path().to_path_buf())
                .collect();
            found.sort();
            files.extend(found);
        } else if path.exists() {
            files.push(path.clone());
        } else {
            return Err(miette::miette!("{} does not exist", path.display()));
        }
    }
    if files.is_empty() {
        return Err(miette::miette!("no harness files found"));
    }
    Ok(files)
}

/// Load files into pipeline inputs, numbering sheets in file order
pub fn load_inputs(files: &[PathBuf], prepend: &[PathBuf]) -> Result<Vec<HarnessInput>> {
    let fragments = prepend
        .iter()
        .map(|p| load_document(p))
        .collect::<Result<Vec<Value>, _>>()?;
    let total = u32::try_from(files.len()).into_diagnostic()?;

    let mut inputs = Vec::with_capacity(files.len());
    for (index, file) in files.iter().enumerate() {
        let document = load_document(file)?;
        let current = u32::try_from(index + 1).into_diagnostic()?;
        inputs.push(
            HarnessInput::new(harness_name(file), document)
                .with_prepend(fragments.clone())
                .with_sheet(current, total),
        );
    }
    Ok(inputs)
}

/// Prepend files from the command line, or from config when none are given
pub fn prepend_files(args: &InputArgs, config: &Config) -> Vec<PathBuf> {
    if args.prepend.is_empty() {
        config.prepend.clone()
    } else {
        args.prepend.clone()
    }
}

/// Read the multiplier table when multipliers are enabled
pub fn load_multipliers(
    args: &InputArgs,
    config: &Config,
    dir: &Path,
) -> Result<QuantityMultipliers> {
    if !(args.use_multipliers || config.use_multipliers()) {
        return Ok(QuantityMultipliers::disabled());
    }
    let name = args
        .multiplier_file
        .as_deref()
        .unwrap_or_else(|| config.multiplier_file());
    let path = dir.join(name);
    let text = std::fs::read_to_string(&path)
        .map_err(|e| miette::miette!("cannot read multiplier file {}: {}", path.display(), e))?;
    log::info!("using quantity multipliers from {}", path.display());
    QuantityMultipliers::from_yaml(&text).map_err(miette::Report::new)
}

/// Directory outputs for `file` are written to
pub fn output_dir_for(file: &Path, output_dir: Option<&Path>) -> PathBuf {
    match output_dir {
        Some(dir) => dir.to_path_buf(),
        None => file
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(".")),
    }
}

/// Print which harnesses completed and which one failed
pub fn print_batch_status(report: &BatchReport, quiet: bool) {
    if !quiet {
        for name in report.completed() {
            println!("{} {}", style("✓").green(), name);
        }
    }
    if let Some((name, error)) = &report.failure {
        eprintln!(
            "{} {} {}",
            style("✗").red(),
            name,
            style(format!("[{}]", error.kind())).dim()
        );
    }
}

/// Turn a batch failure into the command's error
pub fn batch_result(report: &BatchReport) -> Result<()> {
    match &report.failure {
        None => Ok(()),
        Some((name, error)) => Err(miette::Report::new(error.clone())
            .wrap_err(format!("{} failed after {} completed", name, report.outputs.len()))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_collect_inputs() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("b.yml"), "{}").unwrap();
        std::fs::write(dir.path().join("a.yaml"), "{}").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "").unwrap();

        let files = collect_inputs(&[dir.path().to_path_buf()]).unwrap();
        let names: Vec<String> = files.iter().map(|f| harness_name(f)).collect();
        assert_eq!(names, vec!["a", "b"]);

        assert!(collect_inputs(&[dir.path().join("missing.yml")]).is_err());
    }

    #[test]
    fn test_load_inputs_numbers_sheets() {
        let dir = tempdir().unwrap();
        let first = dir.path().join("first.yml");
        let second = dir.path().join("second.yml");
        std::fs::write(&first, "connectors:\n  X1: {pincount: 1}\n").unwrap();
        std::fs::write(&second, "connectors:\n  X2: {pincount: 1}\n").unwrap();

        let inputs = load_inputs(&[first, second], &[]).unwrap();
        assert_eq!(inputs[0].name, "first");
        assert_eq!(inputs[0].sheet, Some((1, 2)));
        assert_eq!(inputs[1].sheet, Some((2, 2)));
    }

    #[test]
    fn test_output_dir_for() {
        assert_eq!(
            output_dir_for(Path::new("harness.yml"), None),
            PathBuf::from(".")
        );
        assert_eq!(
            output_dir_for(Path::new("a/harness.yml"), Some(Path::new("out"))),
            PathBuf::from("out")
        );
    }
}
