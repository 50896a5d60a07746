use thiserror::Error;

#[derive(Debug, Error)]
pub enum JobError {
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("failed to write log file {path}: {source}")]
    LogFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Db(#[from] crm_db::DbError),
}
