use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Metrics(#[from] reqmeter_core::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    pub fn client_code(&self) -> &'static str {
        match self {
            AppError::Metrics(e) => e.code(),
            AppError::Io(_) => "IO",
        }
    }
}

// HTTP mapping. Every error reaching a handler is a server-side failure.
use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            self.to_string(),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn export_error_maps_to_500_with_detail() {
        let err = AppError::from(reqmeter_core::Error::Export("collector offline".into()));
        assert_eq!(err.client_code(), "EXPORT");
        assert_eq!(err.to_string(), "export failed: collector offline");

        let resp = err.into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
