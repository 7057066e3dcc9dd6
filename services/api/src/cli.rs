use crate::report::{run_explain, run_generations, ExplainArgs, GenerationsArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use silson_guide::error::AppError;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "Silson Guide",
    about = "Explain Korean indemnity health insurance (실손보험) generations by enrollment date",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Classify an enrollment date and print the explanation report
    Explain(ExplainArgs),
    /// List the generations in the reference catalog
    Generations(GenerationsArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Override the reference catalog location (SILSON_CATALOG_PATH)
    #[arg(long)]
    pub(crate) catalog: Option<PathBuf>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Explain(args) => run_explain(args).await,
        Command::Generations(args) => run_generations(args),
    }
}
