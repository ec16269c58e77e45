use crate::intake_run::{print_form_types, run_intake, IntakeArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use doc_intake::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Document Intake",
    about = "Run the tax document extraction service or drive an intake batch against it",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP extraction service (default command)
    Serve(ServeArgs),
    /// Classify local files, submit them for extraction, and download the CSV results
    Intake(IntakeArgs),
    /// List the accepted form type labels
    FormTypes,
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Intake(args) => run_intake(args).await,
        Command::FormTypes => {
            print_form_types();
            Ok(())
        }
    }
}
