use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;
use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{message}")]
    Validation {
        message: String,
        fields: Vec<FieldError>,
    },

    #[error("{0} not found")]
    NotFound(&'static str),

    /// A call into the relational store failed. `context` is the only thing
    /// the client ever sees.
    #[error("{context}")]
    Backend {
        context: &'static str,
        #[source]
        source: sqlx::Error,
    },

    #[error("{context}")]
    Storage {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn backend(context: &'static str) -> impl FnOnce(sqlx::Error) -> AppError {
        move |source| AppError::Backend { context, source }
    }

    pub fn storage(context: &'static str) -> impl FnOnce(std::io::Error) -> AppError {
        move |source| AppError::Storage { context, source }
    }

    pub fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        let message = message.into();
        AppError::Validation {
            message: message.clone(),
            fields: vec![FieldError::new(field, message)],
        }
    }

    pub fn from_fields(fields: Vec<FieldError>) -> Self {
        let message = fields
            .first()
            .map(|field| field.message.clone())
            .unwrap_or_else(|| "Invalid input".to_string());
        AppError::Validation { message, fields }
    }

    fn is_foreign_key_violation(&self) -> bool {
        match self {
            AppError::Backend { source, .. } => source
                .as_database_error()
                .map(|err| matches!(err.kind(), sqlx::error::ErrorKind::ForeignKeyViolation))
                .unwrap_or(false),
            _ => false,
        }
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: String,
    #[serde(skip_serializing_if = "no_fields")]
    fields: &'a [FieldError],
}

fn no_fields(fields: &&[FieldError]) -> bool {
    fields.is_empty()
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Backend { .. } if self.is_foreign_key_violation() => StatusCode::CONFLICT,
            AppError::Backend { .. } | AppError::Storage { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let fields: &[FieldError] = match self {
            AppError::Validation { fields, .. } => fields,
            AppError::Backend { context, source } => {
                log::error!("{context}: {source}");
                &[]
            }
            AppError::Storage { context, source } => {
                log::error!("{context}: {source}");
                &[]
            }
            AppError::NotFound(_) => &[],
        };

        HttpResponse::build(self.status_code()).json(ErrorBody {
            error: self.to_string(),
            fields,
        })
    }
}
