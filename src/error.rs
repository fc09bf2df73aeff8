use std::path::PathBuf;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use isahc::Error as rError;
use maxminddb::MaxMindDbError;
use serde::Serialize;
use tokio::task::JoinError;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid ip address: {0}")]
    InvalidIp(String),
    #[error("MaxMindDbError: {0}")]
    MaxMind(#[from] MaxMindDbError),
    #[error("Isahc Error: {0}")]
    Isahc(#[from] rError),
    #[error("download of {} failed with status {status}", path.display())]
    Download { path: PathBuf, status: u16 },
    #[error("download of {} failed after {attempts} attempts: {source}", path.display())]
    RetriesExhausted {
        path: PathBuf,
        attempts: usize,
        #[source]
        source: Box<Error>,
    },
    #[error("prefix length {prefix} exceeds address width {max}")]
    InvalidPrefix { prefix: u8, max: u8 },
    #[error("Tokio JoinError: {0}")]
    Join(#[from] JoinError),
    #[error("{0}")]
    IOError(#[from] std::io::Error),
}

#[derive(Serialize)]
struct ErrorJson {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<String>,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!("{}", self);
        } else {
            warn!("{}", self);
        }

        let code = self.code().map(str::to_owned);
        (
            status,
            Json(ErrorJson {
                error: self.to_string(),
                code,
            }),
        )
            .into_response()
    }
}

impl Error {
    pub fn invalid_ip(input: impl Into<String>) -> Self {
        Self::InvalidIp(input.into())
    }

    fn status_code(&self) -> StatusCode {
        match self {
            Error::InvalidIp(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> Option<&'static str> {
        match self {
            Error::InvalidIp(_) => Some("invalid_ip"),
            Error::MaxMind(_) => Some("database_error"),
            Error::Isahc(_) => Some("http_client_error"),
            Error::Download { .. } | Error::RetriesExhausted { .. } => Some("download_error"),
            Error::InvalidPrefix { .. } => Some("invalid_network"),
            Error::Join(_) => Some("internal_error"),
            Error::IOError(_) => Some("io_error"),
        }
    }
}
