use axum::extract::{FromRequest, FromRequestParts};
use axum::http::request::Parts;
use innkeep_core::GuestRef;

use crate::error::AppError;

pub const GUEST_HEADER: &str = "x-guest-id";
pub const STAFF_HEADER: &str = "x-staff";

/// `axum::Json` with rejections reported as [`AppError`].
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

/// `axum::extract::Query` with rejections reported as [`AppError`].
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct AppQuery<T>(pub T);

/// Who is calling, as declared by the request headers.
///
/// The gateway trusts these headers; it expects to sit behind a proxy that
/// authenticates callers and sets them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Caller {
    pub guest: Option<GuestRef>,
    pub staff: bool,
}

impl Caller {
    /// The caller's own guest reference.
    pub fn guest(&self) -> Result<&GuestRef, AppError> {
        self.guest.as_ref().ok_or_else(|| {
            AppError::Unauthorized(format!("missing {GUEST_HEADER} header"))
        })
    }

    pub fn require_staff(&self) -> Result<(), AppError> {
        if self.staff {
            return Ok(());
        }
        Err(AppError::Forbidden("staff only".to_string()))
    }

    /// Staff, or the guest who owns the record.
    pub fn require_owner_or_staff(&self, owner: &GuestRef) -> Result<(), AppError> {
        if self.staff || self.guest()? == owner {
            return Ok(());
        }
        Err(AppError::Forbidden(
            "booking belongs to another guest".to_string(),
        ))
    }
}

fn header<'a>(parts: &'a Parts, name: &str) -> Result<Option<&'a str>, AppError> {
    parts
        .headers
        .get(name)
        .map(|value| {
            value
                .to_str()
                .map(str::trim)
                .map_err(|_| AppError::InvalidInput(format!("{name} header is not valid text")))
        })
        .transpose()
}

impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let guest = header(parts, GUEST_HEADER)?
            .filter(|value| !value.is_empty())
            .map(GuestRef::new);
        let staff = match header(parts, STAFF_HEADER)? {
            None => false,
            Some(value) => match value.to_ascii_lowercase().as_str() {
                "true" | "1" => true,
                "false" | "0" | "" => false,
                other => {
                    return Err(AppError::InvalidInput(format!(
                        "{STAFF_HEADER} must be true or false, got '{other}'"
                    )))
                }
            },
        };

        Ok(Caller { guest, staff })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn caller(headers: &[(&str, &str)]) -> Result<Caller, AppError> {
        let mut request = Request::builder();
        for (name, value) in headers {
            request = request.header(*name, *value);
        }
        let (mut parts, ()) = request.body(()).unwrap().into_parts();
        Caller::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn reads_guest_and_staff_headers() {
        let got = caller(&[(GUEST_HEADER, " guest-1 "), (STAFF_HEADER, "TRUE")])
            .await
            .unwrap();
        assert_eq!(got.guest, Some(GuestRef::new("guest-1")));
        assert!(got.staff);

        let anonymous = caller(&[]).await.unwrap();
        assert_eq!(anonymous, Caller::default());
        assert!(matches!(anonymous.guest(), Err(AppError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn rejects_malformed_staff_flag() {
        let err = caller(&[(STAFF_HEADER, "maybe")]).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn owner_checks() {
        let owner = GuestRef::new("guest-1");

        let me = caller(&[(GUEST_HEADER, "guest-1")]).await.unwrap();
        assert!(me.require_owner_or_staff(&owner).is_ok());
        assert!(matches!(me.require_staff(), Err(AppError::Forbidden(_))));

        let other = caller(&[(GUEST_HEADER, "guest-2")]).await.unwrap();
        assert!(matches!(
            other.require_owner_or_staff(&owner),
            Err(AppError::Forbidden(_))
        ));

        let nobody = caller(&[]).await.unwrap();
        assert!(matches!(
            nobody.require_owner_or_staff(&owner),
            Err(AppError::Unauthorized(_))
        ));

        let staff = caller(&[(STAFF_HEADER, "true")]).await.unwrap();
        assert!(staff.require_owner_or_staff(&owner).is_ok());
    }
}
