//! `harnessviz build` command - write diagrams and BOMs

use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::bom::BomEntry;
use crate::cli::helpers::{
    batch_result, collect_inputs, load_inputs, load_multipliers, output_dir_for, prepend_files,
    print_batch_status, InputArgs,
};
use crate::cli::table::render;
use crate::cli::{FormatArg, GlobalOpts};
use crate::core::{process_batch, Config, HarnessOutput, OutputFormat};
use crate::entities::Metadata;
use crate::graph::dot::to_dot;
use crate::graph::Graph;

/// File name of the shared BOM
pub const SHARED_BOM_FILE: &str = "shared_bom.tsv";

#[derive(clap::Args, Debug)]
pub struct BuildArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Output directory (default: next to each input file)
    #[arg(long, short = 'o')]
    pub output_dir: Option<PathBuf>,

    /// Base name for output files (single input only; default: input file stem)
    #[arg(long, short = 'O')]
    pub output_name: Option<String>,

    /// Output formats, comma separated (gv, json, tsv)
    #[arg(long, value_delimiter = ',')]
    pub formats: Option<Vec<String>>,
}

/// JSON document written per harness
#[derive(Serialize)]
struct JsonOutput<'a> {
    name: &'a str,
    metadata: &'a Metadata,
    graph: &'a Graph,
    bom: &'a [BomEntry],
}

pub fn run(args: BuildArgs, global: &GlobalOpts) -> Result<()> {
    let mut config = Config::load()?;
    if args.formats.is_some() {
        config.formats = args.formats.clone();
    }
    let formats = config.output_formats().map_err(|e| miette::miette!("{}", e))?;
    let output_dir = args.output_dir.clone().or_else(|| config.output_dir.clone());

    let files = collect_inputs(&args.input.inputs)?;
    if args.output_name.is_some() && files.len() > 1 {
        return Err(miette::miette!(
            "--output-name needs a single input, but {} harness files were given",
            files.len()
        ));
    }
    let prepend = prepend_files(&args.input, &config);
    let inputs = load_inputs(&files, &prepend)?;

    // shared outputs and the multiplier file live next to the first input
    let shared_dir = output_dir_for(&files[0], output_dir.as_deref());
    let multipliers = load_multipliers(&args.input, &config, &shared_dir)?;

    let report = process_batch(&inputs, &multipliers);

    // outputs are the completed prefix of the inputs
    for (output, file) in report.outputs.iter().zip(&files) {
        let dir = output_dir_for(file, output_dir.as_deref());
        let stem = args.output_name.as_deref().unwrap_or(&output.name);
        write_outputs(output, stem, &dir, &formats)?;
    }

    if !report.outputs.is_empty() && formats.contains(&OutputFormat::Tsv) {
        fs::create_dir_all(&shared_dir).into_diagnostic()?;
        let shared = render(&report.shared.table(), FormatArg::Tsv)?;
        fs::write(shared_dir.join(SHARED_BOM_FILE), shared).into_diagnostic()?;
        log::info!("wrote {}", shared_dir.join(SHARED_BOM_FILE).display());
    }

    print_batch_status(&report, global.quiet);
    batch_result(&report)
}

fn write_outputs(
    output: &HarnessOutput,
    stem: &str,
    dir: &Path,
    formats: &[OutputFormat],
) -> Result<()> {
    fs::create_dir_all(dir).into_diagnostic()?;
    for format in formats {
        let (path, contents) = match format {
            OutputFormat::Gv => (dir.join(format!("{}.gv", stem)), to_dot(&output.graph)),
            OutputFormat::Json => {
                let json = JsonOutput {
                    name: &output.name,
                    metadata: &output.metadata,
                    graph: &output.graph,
                    bom: output.bom.entries(),
                };
                (
                    dir.join(format!("{}.json", stem)),
                    serde_json::to_string_pretty(&json).into_diagnostic()?,
                )
            }
            OutputFormat::Tsv => (
                dir.join(format!("{}.bom.tsv", stem)),
                render(&output.bom.table(), FormatArg::Tsv)?,
            ),
        };
        fs::write(&path, contents).into_diagnostic()?;
        log::info!("wrote {}", path.display());
    }
    Ok(())
}
