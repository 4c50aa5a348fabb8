mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();
    texinvoice_observability::init(cli.log_format);

    let result = match cli.command {
        Commands::Render {
            invoice,
            template_dir,
            template,
            output_dir,
            name,
            no_clean,
            latex,
            latex_args,
        } => commands::render::run(commands::render::RenderArgs {
            invoice,
            template_dir,
            template,
            output_dir,
            name,
            clean: !no_clean,
            latex,
            latex_args,
        }),
        Commands::Check { invoice } => commands::check::run(&invoice),
        Commands::Sample {
            lines,
            variable_vat,
        } => commands::sample::run(lines, variable_vat),
    };

    if let Err(e) = result {
        tracing::error!(error = %format!("{e:#}"), "command failed");
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
