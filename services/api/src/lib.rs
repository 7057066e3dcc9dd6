mod cli;
mod infra;
mod report;
mod routes;
mod server;

use silson_guide::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
