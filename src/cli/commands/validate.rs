//! `harnessviz validate` command - check harness files without writing output

use console::style;
use miette::Result;
use std::path::PathBuf;

use crate::bom::{QuantityMultipliers, SharedBom};
use crate::cli::helpers::collect_inputs;
use crate::cli::GlobalOpts;
use crate::core::{process_harness, Config, HarnessInput};
use crate::yaml::{harness_name, load_document};

#[derive(clap::Args, Debug)]
pub struct ValidateArgs {
    /// Harness files or directories to check
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Fragment to prepend to every harness (repeatable; default: from config)
    #[arg(long, short = 'p')]
    pub prepend: Vec<PathBuf>,

    /// Stop at the first failing file
    #[arg(long)]
    pub fail_fast: bool,
}

#[derive(Default)]
struct ValidationStats {
    files_checked: usize,
    files_passed: usize,
    files_failed: usize,
}

pub fn run(args: ValidateArgs, global: &GlobalOpts) -> Result<()> {
    let config = Config::load()?;
    let files = collect_inputs(&args.paths)?;
    let prepend_paths = if args.prepend.is_empty() {
        &config.prepend
    } else {
        &args.prepend
    };
    let prepend = prepend_paths
        .iter()
        .map(|p| load_document(p))
        .collect::<Result<Vec<_>, _>>()?;

    let mut stats = ValidationStats::default();

    for file in &files {
        stats.files_checked += 1;
        let name = harness_name(file);

        // each file is checked on its own; nothing is shared between them
        let outcome = load_document(file)
            .map_err(miette::Report::new)
            .and_then(|document| {
                let input = HarnessInput::new(&name, document).with_prepend(prepend.clone());
                process_harness(&input, &mut SharedBom::new(), &QuantityMultipliers::disabled())
                    .map_err(miette::Report::new)
            });

        match outcome {
            Ok(output) => {
                stats.files_passed += 1;
                if !global.quiet {
                    println!(
                        "{} {} {}",
                        style("✓").green(),
                        file.display(),
                        style(format!(
                            "({} connectors, {} cables, {} connections)",
                            output.harness.connectors().len(),
                            output.harness.cables().len(),
                            output.harness.connections().len()
                        ))
                        .dim()
                    );
                }
            }
            Err(report) => {
                stats.files_failed += 1;
                println!("{} {}", style("✗").red(), file.display());
                eprintln!("{:?}", report);
                if args.fail_fast {
                    break;
                }
            }
        }
    }

    if !global.quiet {
        println!();
        println!("{}", style("─".repeat(60)).dim());
        println!("{}", style("Validation Summary").bold());
        println!("{}", style("─".repeat(60)).dim());
        println!("  Files checked:  {}", style(stats.files_checked).cyan());
        println!("  Files passed:   {}", style(stats.files_passed).green());
        println!("  Files failed:   {}", style(stats.files_failed).red());
        println!();
    }

    match stats.files_failed {
        0 => {
            if !global.quiet {
                println!("{} All files passed validation!", style("✓").green().bold());
            }
            Ok(())
        }
        1 => Err(miette::miette!("Validation failed: 1 file has errors")),
        n => Err(miette::miette!("Validation failed: {} files have errors", n)),
    }
}
