mod cli;
mod infra;
mod intake_run;
mod routes;
mod server;

use doc_intake::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
