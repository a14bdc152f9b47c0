mod cli;
mod infra;
mod review;
mod routes;
mod server;

use interview_access::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
