use clap::Parser;
use env_logger::Env;
use harnessviz::cli::{Cli, Commands};
use miette::Result;

fn main() -> Result<()> {
    // Reset SIGPIPE to default behavior so piping into `head` exits quietly
    #[cfg(unix)]
    {
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }
    }
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    let global = cli.global;

    // RUST_LOG wins over -v/-q
    let env = Env::default().default_filter_or(global.log_level().to_string());
    env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .init();

    match cli.command {
        Commands::Build(args) => harnessviz::cli::commands::build::run(args, &global),
        Commands::Validate(args) => harnessviz::cli::commands::validate::run(args, &global),
        Commands::Bom(args) => harnessviz::cli::commands::bom::run(args, &global),
        Commands::Completions(args) => harnessviz::cli::commands::completions::run(args),
    }
}
