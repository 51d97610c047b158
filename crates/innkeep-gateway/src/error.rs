use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use innkeep_core::{BookingError, CatalogError, CoreError};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    /// Rejected by the current state of a room or booking.
    #[error("{message}")]
    Conflict { code: &'static str, message: String },

    #[error("{0}")]
    Unavailable(String),

    #[error("{0}")]
    Internal(String),
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: String,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict { .. } => StatusCode::CONFLICT,
            AppError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::InvalidInput(_) => "invalid_input",
            AppError::Unauthorized(_) => "unauthorized",
            AppError::Forbidden(_) => "forbidden",
            AppError::NotFound(_) => "not_found",
            AppError::Conflict { code, .. } => *code,
            AppError::Unavailable(_) => "unavailable",
            AppError::Internal(_) => "internal",
        }
    }

    fn conflict(code: &'static str, message: impl Into<String>) -> Self {
        AppError::Conflict {
            code,
            message: message.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(status = status.as_u16(), error = %self, "request failed");
        }

        let body = ErrorBody {
            error: self.code(),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

impl From<CoreError> for AppError {
    fn from(value: CoreError) -> Self {
        let message = value.to_string();
        match value {
            CoreError::InvalidRange { .. }
            | CoreError::InvalidDate(_)
            | CoreError::AmountOverflow { .. } => AppError::InvalidInput(message),
            CoreError::RoomUnavailable(_) => AppError::conflict("room_unavailable", message),
            CoreError::Conflict { .. } | CoreError::DuplicateReservation { .. } => {
                AppError::conflict("conflict", message)
            }
            CoreError::InvalidTransition { .. } => {
                AppError::conflict("invalid_transition", message)
            }
            CoreError::UnknownReservation { .. } => AppError::Internal(message),
        }
    }
}

impl From<CatalogError> for AppError {
    fn from(value: CatalogError) -> Self {
        let message = value.to_string();
        match value {
            CatalogError::InvalidInput(_) => AppError::InvalidInput(message),
            CatalogError::HotelNotFound(_) | CatalogError::RoomNotFound(_) => {
                AppError::NotFound(message)
            }
            CatalogError::Conflict(_) => AppError::conflict("conflict", message),
            CatalogError::Unavailable(_) => AppError::Unavailable(message),
            CatalogError::Storage(_) => AppError::Internal(message),
        }
    }
}

impl From<BookingError> for AppError {
    fn from(value: BookingError) -> Self {
        let message = value.to_string();
        match value {
            BookingError::InvalidInput(_) => AppError::InvalidInput(message),
            BookingError::HotelNotFound(_)
            | BookingError::RoomNotFound(_)
            | BookingError::BookingNotFound(_) => AppError::NotFound(message),
            BookingError::Domain(err) => err.into(),
            BookingError::Duplicate(_) => AppError::conflict("conflict", message),
            BookingError::Unavailable(_) => AppError::Unavailable(message),
            BookingError::Storage(_) => AppError::Internal(message),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(value: JsonRejection) -> Self {
        AppError::InvalidInput(value.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(value: QueryRejection) -> Self {
        AppError::InvalidInput(value.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use innkeep_core::{BookingId, ReservationStatus, RoomId};

    #[test]
    fn kernel_errors_map_to_statuses() {
        let conflict: AppError = BookingError::Domain(CoreError::Conflict {
            room: RoomId::new("rm-1"),
            booking: BookingId::new("bk-1"),
        })
        .into();
        assert_eq!(conflict.status(), StatusCode::CONFLICT);
        assert_eq!(conflict.code(), "conflict");

        let transition: AppError = BookingError::Domain(CoreError::InvalidTransition {
            from: ReservationStatus::Completed,
            to: ReservationStatus::Cancelled,
        })
        .into();
        assert_eq!(transition.code(), "invalid_transition");

        let closed: AppError = CoreError::RoomUnavailable(RoomId::new("rm-1")).into();
        assert_eq!(closed.code(), "room_unavailable");
    }

    #[test]
    fn service_errors_map_to_statuses() {
        let missing: AppError = BookingError::BookingNotFound(BookingId::new("bk-1")).into();
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);

        let down: AppError = CatalogError::Unavailable("pool closed".to_string()).into();
        assert_eq!(down.status(), StatusCode::SERVICE_UNAVAILABLE);

        let broken: AppError = CatalogError::Storage("bad row".to_string()).into();
        assert_eq!(broken.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
