use miette::Diagnostic;
use thiserror::Error;

use crate::api::ApiError;
use crate::db::DbError;

#[derive(Error, Diagnostic, Debug)]
pub enum CliError {
    #[error("No database configured")]
    #[diagnostic(
        code(leadgress::cli::no_database),
        help("Pass --db <PATH> or set the LEADGRESS_DB environment variable.")
    )]
    NoDatabase,

    #[error("Unknown output format '{format}'")]
    #[diagnostic(code(leadgress::cli::unknown_format), help("Use 'table' or 'json'."))]
    UnknownFormat { format: String },

    #[error("Failed to create data directory: {0}")]
    #[diagnostic(code(leadgress::cli::io))]
    Io(#[from] std::io::Error),

    #[error("Failed to render JSON output: {0}")]
    #[diagnostic(code(leadgress::cli::output))]
    Output(#[from] serde_json::Error),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Database(#[from] DbError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Api(#[from] ApiError),
}

pub type CliResult<T> = Result<T, CliError>;
