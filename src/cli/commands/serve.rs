use crate::api::{self, Config};
use crate::cli::error::CliResult;
use crate::cli::utils::open_database;

/// Open the configured database (if any) and run the HTTP service.
pub async fn serve(config: Config) -> CliResult<()> {
    let db = match &config.db_path {
        Some(path) => Some(open_database(path).await?),
        None => None,
    };

    api::run(config, db).await?;
    Ok(())
}
