use std::io;

use axum::{
    extract::{multipart::MultipartError, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};

pub type Result<T> = core::result::Result<T, Error>;

/// 面向 HTTP 的业务错误
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Not Found")]
    NotFound,

    /// 资源已存在，例如同名文件或相同 `(published_on, slug)` 的文章
    #[error("Conflict")]
    Conflict,

    #[error("{0}")]
    BadRequest(String),
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),

    #[error(transparent)]
    Mongo(#[from] mongodb::error::Error),

    #[error(transparent)]
    Multipart(#[from] MultipartError),

    /// 请求体不是合法的 JSON 或字段不符合要求
    #[error(transparent)]
    Json(#[from] JsonRejection),

    /// 实体校验失败
    #[error("{0}")]
    Validation(String),

    #[error("config: {0}")]
    Config(String),

    #[error(transparent)]
    ApiError(#[from] ApiError),

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl Error {
    /// 将 `posts_uk` 唯一约束冲突转换为 [`ApiError::Conflict`]，其他错误原样返回
    pub fn from_write(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                tracing::warn!(constraint = ?db.constraint(), "unique violation");
                Error::ApiError(ApiError::Conflict)
            }
            _ => Error::Sqlx(e),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::Sqlx(e) => {
                tracing::error!(%e, "sqlx error");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
            }
            Error::Mongo(e) => {
                tracing::error!(%e, "mongodb error");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
            }
            Error::Io(e) => {
                tracing::error!(%e, "io error");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
            }
            Error::Config(s) => {
                tracing::error!(%s, "config error");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
            }
            Error::Multipart(e) => (e.status(), e.body_text()).into_response(),
            Error::Json(e) => match e {
                e @ (JsonRejection::BytesRejection(_) | JsonRejection::MissingJsonContentType(_)) => {
                    (e.status(), e.body_text()).into_response()
                }
                e => (StatusCode::BAD_REQUEST, e.body_text()).into_response(),
            },
            Error::Validation(s) => (StatusCode::BAD_REQUEST, s).into_response(),
            Error::ApiError(api_error) => match api_error {
                ApiError::NotFound => (StatusCode::NOT_FOUND, "NOT FOUND").into_response(),
                ApiError::Conflict => StatusCode::CONFLICT.into_response(),
                ApiError::BadRequest(s) => (StatusCode::BAD_REQUEST, s).into_response(),
            },
        }
    }
}
