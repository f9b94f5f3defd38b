use axum::{
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::response::{ApiResponse, Meta};

/// Pages a request is sent back to instead of failing outright.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectTo {
    Home,
    Login,
    Profile,
}

impl RedirectTo {
    pub fn location(&self) -> &'static str {
        match self {
            RedirectTo::Home => "/",
            RedirectTo::Login => "/login",
            RedirectTo::Profile => "/profile",
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not Found")]
    NotFound,

    #[error("Bad Request {0}")]
    BadRequest(String),

    #[error("Forbidden")]
    Forbidden,

    #[error("Redirect to {}", .0.location())]
    Redirect(RedirectTo),

    #[error("ORM error")]
    OrmError(#[from] sea_orm::DbErr),

    #[error("Internal Server Error")]
    Internal(#[from] anyhow::Error),
}

#[derive(Serialize)]
struct ErrorData {
    error: String,
}

#[derive(Serialize)]
struct RedirectData {
    location: &'static str,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let AppError::Redirect(target) = &self {
            let location = target.location();
            let body = ApiResponse::success(
                "Redirect",
                RedirectData { location },
                Some(Meta::empty()),
            );
            return (
                StatusCode::SEE_OTHER,
                [(header::LOCATION, location)],
                axum::Json(body),
            )
                .into_response();
        }

        let status = match &self {
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::Redirect(_) => StatusCode::SEE_OTHER,
            AppError::OrmError(err) => {
                tracing::error!(error = %err, "database error");
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "internal error");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = ApiResponse {
            message: self.to_string(),
            data: Some(ErrorData {
                error: self.to_string(),
            }),
            meta: Some(Meta::empty()),
        };

        (status, axum::Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
