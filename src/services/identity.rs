use axum::http::HeaderMap;

#[derive(Debug, Clone)]
pub struct UserIdentity {
    pub id: String,
    pub name: Option<String>,
    pub email: Option<String>,
}

/// Resolves the current user from a request. Authentication itself is the
/// session provider's job; this service only attaches the opaque identity
/// it is handed to bookings and reviews.
pub trait IdentityProvider: Send + Sync {
    fn current_user(&self, headers: &HeaderMap) -> Option<UserIdentity>;
}

/// Trusts identity headers injected by the auth proxy in front of this
/// service (`x-user-id`, optionally `x-user-name` / `x-user-email`).
pub struct GatewayIdentity;

impl IdentityProvider for GatewayIdentity {
    fn current_user(&self, headers: &HeaderMap) -> Option<UserIdentity> {
        let id = headers
            .get("x-user-id")
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())?;

        let header_str = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .filter(|v| !v.is_empty())
                .map(|v| v.to_string())
        };

        Some(UserIdentity {
            id: id.to_string(),
            name: header_str("x-user-name"),
            email: header_str("x-user-email"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_header_means_anonymous() {
        let headers = HeaderMap::new();
        assert!(GatewayIdentity.current_user(&headers).is_none());
    }

    #[test]
    fn test_identity_from_headers() {
        let mut headers = HeaderMap::new();
        headers.insert("x-user-id", "u-42".parse().unwrap());
        headers.insert("x-user-name", "Asha Menon".parse().unwrap());

        let user = GatewayIdentity.current_user(&headers).unwrap();
        assert_eq!(user.id, "u-42");
        assert_eq!(user.name.as_deref(), Some("Asha Menon"));
        assert!(user.email.is_none());
    }

    #[test]
    fn test_empty_header_is_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert("x-user-id", "".parse().unwrap());
        assert!(GatewayIdentity.current_user(&headers).is_none());
    }
}
