//! Signed-cookie pseudo-identity middleware.
//!
//! Every request is attributed to a user ID carried in two cookies:
//!
//! ```text
//! Cookie: user_id_id=<uuid>; user_id_sign=<hex hmac-sha256 of the id>
//! ```
//!
//! The ID is an opaque string to the rest of the service.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{
        HeaderMap, HeaderValue,
        header::{COOKIE, SET_COOKIE},
        request::Parts,
    },
    middleware::Next,
    response::Response,
};
use hmac::{Hmac, Mac};
use serde_json::json;
use sha2::Sha256;
use uuid::Uuid;

use crate::{error::AppError, state::AppState};

type HmacSha256 = Hmac<Sha256>;

pub const ID_COOKIE: &str = "user_id_id";
pub const SIGN_COOKIE: &str = "user_id_sign";

/// Signs and verifies user ID cookies with HMAC-SHA256.
pub struct CookieSigner {
    secret: Vec<u8>,
}

impl CookieSigner {
    pub fn new(secret: &str) -> Self {
        Self {
            secret: secret.as_bytes().to_vec(),
        }
    }

    fn mac(&self) -> HmacSha256 {
        HmacSha256::new_from_slice(&self.secret).expect("HMAC accepts any key length")
    }

    /// Returns the lowercase hex signature of `user_id`.
    pub fn sign(&self, user_id: &str) -> String {
        let mut mac = self.mac();
        mac.update(user_id.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    /// Checks `signature` against `user_id` in constant time.
    pub fn verify(&self, user_id: &str, signature: &str) -> bool {
        let Ok(raw) = hex::decode(signature) else {
            return false;
        };
        let mut mac = self.mac();
        mac.update(user_id.as_bytes());
        mac.verify_slice(&raw).is_ok()
    }
}

/// Identity attached to every request by [`layer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserId {
    pub id: String,
    /// False when the ID was minted for this request.
    pub from_cookie: bool,
}

/// Resolves the caller's identity and makes it available as [`UserId`].
///
/// # Flow
///
/// 1. Read `user_id_id` and `user_id_sign` cookies
/// 2. If both are present and the signature matches, reuse the ID
/// 3. Otherwise mint a new UUIDv4 and set both cookies on the response
///
/// Never rejects a request. Routes needing an established identity use the
/// [`RequireUser`] extractor.
pub async fn layer(State(st): State<AppState>, mut req: Request, next: Next) -> Response {
    let existing = read_cookie(req.headers(), ID_COOKIE)
        .zip(read_cookie(req.headers(), SIGN_COOKIE))
        .filter(|(id, sign)| !id.is_empty() && st.cookie_signer.verify(id, sign))
        .map(|(id, _)| id);

    let user = match existing {
        Some(id) => UserId {
            id,
            from_cookie: true,
        },
        None => UserId {
            id: Uuid::new_v4().to_string(),
            from_cookie: false,
        },
    };

    req.extensions_mut().insert(user.clone());
    let mut response = next.run(req).await;

    if !user.from_cookie {
        let signature = st.cookie_signer.sign(&user.id);
        for cookie in [
            format!("{ID_COOKIE}={}; Path=/; HttpOnly", user.id),
            format!("{SIGN_COOKIE}={signature}; Path=/; HttpOnly"),
        ] {
            if let Ok(value) = HeaderValue::from_str(&cookie) {
                response.headers_mut().append(SET_COOKIE, value);
            }
        }
    }

    response
}

fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|header| header.to_str().ok())
        .flat_map(|cookies| cookies.split(';'))
        .find_map(|cookie| {
            let mut parts = cookie.trim().splitn(2, '=');
            match (parts.next(), parts.next()) {
                (Some(key), Some(value)) if key == name => Some(value.to_string()),
                _ => None,
            }
        })
}

/// Extracts the caller's ID for any request passing through [`layer`].
pub struct CurrentUser(pub String);

/// Extracts the caller's ID only if it came from a valid existing cookie.
///
/// Rejects with 401 when the identity was minted for this request.
pub struct RequireUser(pub String);

fn user_from_parts(parts: &Parts) -> Result<UserId, AppError> {
    parts.extensions.get::<UserId>().cloned().ok_or_else(|| {
        AppError::internal(
            "User identity unavailable",
            json!({"reason": "identity middleware is not installed"}),
        )
    })
}

impl<S: Send + Sync> FromRequestParts<S> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(user_from_parts(parts)?.id))
    }
}

impl<S: Send + Sync> FromRequestParts<S> for RequireUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = user_from_parts(parts)?;
        if !user.from_cookie {
            return Err(AppError::unauthorized(
                "Unauthorized",
                json!({"reason": "Identity cookie is missing or invalid"}),
            ));
        }
        Ok(Self(user.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_and_verify() {
        let signer = CookieSigner::new("secret");
        let signature = signer.sign("user-1");

        assert_eq!(signature.len(), 64);
        assert!(signer.verify("user-1", &signature));
        assert!(!signer.verify("user-2", &signature));
        assert!(!signer.verify("user-1", "not-hex"));
    }

    #[test]
    fn test_signature_depends_on_secret() {
        let a = CookieSigner::new("secret-a");
        let b = CookieSigner::new("secret-b");

        assert!(!b.verify("user-1", &a.sign("user-1")));
    }

    #[test]
    fn test_read_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("theme=dark; user_id_id=abc; user_id_sign=ff"),
        );

        assert_eq!(read_cookie(&headers, ID_COOKIE).as_deref(), Some("abc"));
        assert_eq!(read_cookie(&headers, SIGN_COOKIE).as_deref(), Some("ff"));
        assert_eq!(read_cookie(&headers, "missing"), None);
    }
}
