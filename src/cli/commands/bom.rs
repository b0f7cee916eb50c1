//! `harnessviz bom` command - print per-harness or shared bills of materials

use console::style;
use miette::Result;
use std::path::PathBuf;

use crate::cli::helpers::{
    batch_result, collect_inputs, load_inputs, load_multipliers, output_dir_for, prepend_files,
    print_batch_status, InputArgs,
};
use crate::cli::table::render;
use crate::cli::{FormatArg, GlobalOpts};
use crate::core::{process_batch, Config};

#[derive(clap::Args, Debug)]
pub struct BomArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Print one BOM accumulated over all inputs
    #[arg(long)]
    pub shared: bool,

    /// Output format
    #[arg(long, short = 'f', value_enum, default_value_t = FormatArg::Table)]
    pub format: FormatArg,

    /// Directory holding the multiplier file (default: next to the first input)
    #[arg(long, short = 'o')]
    pub output_dir: Option<PathBuf>,
}

pub fn run(args: BomArgs, global: &GlobalOpts) -> Result<()> {
    let config = Config::load()?;
    let files = collect_inputs(&args.input.inputs)?;
    let prepend = prepend_files(&args.input, &config);
    let inputs = load_inputs(&files, &prepend)?;

    let output_dir = args.output_dir.clone().or_else(|| config.output_dir.clone());
    let multiplier_dir = output_dir_for(&files[0], output_dir.as_deref());
    let multipliers = load_multipliers(&args.input, &config, &multiplier_dir)?;

    let report = process_batch(&inputs, &multipliers);
    if report.failure.is_some() {
        print_batch_status(&report, true);
        return batch_result(&report);
    }

    if args.shared {
        println!("{}", render(&report.shared.table(), args.format)?);
        return Ok(());
    }

    // per-harness tables; headings only where a human reads them
    let headed = args.format == FormatArg::Table && report.outputs.len() > 1;
    for output in &report.outputs {
        if headed && !global.quiet {
            println!("{}", style(&output.name).bold());
        }
        println!("{}", render(&output.bom.table(), args.format)?);
    }
    Ok(())
}
