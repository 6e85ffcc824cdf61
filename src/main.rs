mod cli;
mod db;
mod error;
mod fmt;
mod importer;
mod insights;
mod models;
mod parser;
mod settings;
mod view;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cli::{Cli, Commands};

fn init_tracing(verbose: bool) {
    let default = if verbose { "intake=debug" } else { "intake=warn" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Init { data_dir } => cli::init::run(data_dir),
        Commands::Parse {
            file,
            json,
            explain,
        } => cli::parse::run(&file, json, explain),
        Commands::Import { file } => cli::import::run(&file),
        Commands::List {
            search,
            sort,
            desc,
            page,
            rows,
        } => cli::list::run(search, sort, desc, page, rows),
        Commands::Export { output, format } => cli::export::run(output, format),
        Commands::Insights { file } => cli::insights::run(&file),
        Commands::Status => cli::status::run(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
