use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use utoipa::ToSchema;

pub type AppResult<T> = Result<T, AppError>;

/// Why a draw found nobody to pick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum NoCandidatesReason {
    /// No taken tickets in the active round at all
    EmptyPot,
    /// Taken tickets exist but every owner has already won this round
    NoUniqueWinnersLeft,
}

impl std::fmt::Display for NoCandidatesReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NoCandidatesReason::EmptyPot => write!(f, "No tickets to draw from in the active round"),
            NoCandidatesReason::NoUniqueWinnersLeft => {
                write!(f, "No unique winners left in the active round")
            }
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sea_orm::DbErr),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("No active lottery round")]
    NoActiveRound,

    #[error("The active round is locked for claiming")]
    RoundLocked,

    #[error("Another round was started at the same time, reload and try again")]
    RoundConflict,

    #[error("Tickets already taken: {}", format_numbers(.0))]
    AlreadyTaken(Vec<i32>),

    #[error("{0}")]
    NoCandidates(NoCandidatesReason),

    #[error("Auth error: {0}")]
    AuthError(String),

    #[error("Forbidden")]
    Forbidden,

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("Internal server error: {0}")]
    InternalError(String),

    #[error("JWT error: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

fn format_numbers(numbers: &[i32]) -> String {
    numbers
        .iter()
        .map(|n| n.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

impl AppError {
    /// Stable machine readable code carried in the error envelope
    pub fn code(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) => "VALIDATION_ERROR",
            AppError::NoActiveRound => "NO_ACTIVE_ROUND",
            AppError::RoundLocked => "ROUND_LOCKED",
            AppError::RoundConflict => "ROUND_CONFLICT",
            AppError::AlreadyTaken(_) => "ALREADY_TAKEN",
            AppError::NoCandidates(_) => "NO_CANDIDATES",
            AppError::AuthError(_) | AppError::JwtError(_) => "AUTH_ERROR",
            AppError::Forbidden => "FORBIDDEN",
            AppError::DatabaseError(_) => "DATABASE_ERROR",
            AppError::ConfigError(_) | AppError::InternalError(_) => "INTERNAL_ERROR",
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::NoActiveRound => StatusCode::NOT_FOUND,
            AppError::RoundLocked => StatusCode::LOCKED,
            AppError::AlreadyTaken(_) | AppError::NoCandidates(_) | AppError::RoundConflict => {
                StatusCode::CONFLICT
            }
            AppError::AuthError(_) | AppError::JwtError(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status_code = self.status_code();
        let code = self.code();

        let error = match self {
            AppError::ValidationError(msg) => {
                log::warn!("Validation error: {msg}");
                json!({ "code": code, "message": msg })
            }
            AppError::NoActiveRound | AppError::RoundLocked | AppError::RoundConflict => {
                json!({ "code": code, "message": self.to_string() })
            }
            AppError::AlreadyTaken(numbers) => {
                log::warn!("Claim rejected, unavailable numbers: {numbers:?}");
                json!({ "code": code, "message": self.to_string(), "numbers": numbers })
            }
            AppError::NoCandidates(reason) => {
                json!({ "code": code, "message": reason.to_string(), "reason": reason })
            }
            AppError::AuthError(msg) => {
                log::warn!("Authentication error: {msg}");
                json!({ "code": code, "message": msg })
            }
            AppError::JwtError(err) => {
                log::warn!("Invalid token: {err}");
                json!({ "code": code, "message": "Invalid access token" })
            }
            AppError::Forbidden => {
                log::warn!("Forbidden access");
                json!({ "code": code, "message": "Forbidden" })
            }
            AppError::DatabaseError(err) => {
                log::error!("Database error: {err}");
                json!({ "code": code, "message": "Database error" })
            }
            _ => {
                log::error!("Internal error: {self}");
                json!({ "code": code, "message": "Internal server error" })
            }
        };

        HttpResponse::build(status_code).json(json!({
            "success": false,
            "error": error
        }))
    }
}
