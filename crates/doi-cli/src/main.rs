//! doi-sync CLI.

use clap::Parser;
use doi_cli::cli::{Cli, Command};
use doi_cli::commands::{run_patch_related, run_prune, run_publish};
use doi_cli::logging::init_logging;
use doi_cli::summary::{print_patch_summary, print_prune_summary, print_publish_summary};

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    if let Err(error) = init_logging(&cli.log_config()) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    let result = match &cli.command {
        Command::Publish(args) => run_publish(args).map(|summary| print_publish_summary(&summary)),
        Command::PruneDrafts(args) => run_prune(args).map(|summary| print_prune_summary(&summary)),
        Command::PatchRelated(args) => {
            run_patch_related(args).map(|summary| print_patch_summary(&summary))
        }
    };
    let exit_code = match result {
        Ok(()) => 0,
        Err(error) => {
            tracing::error!("{error:#}");
            eprintln!("error: {error:#}");
            1
        }
    };
    std::process::exit(exit_code);
}
