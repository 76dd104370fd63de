use anyhow::Result;
use session_auth::jwt::verify_jwt;
use tokio::io::AsyncRead;

use crate::cfg::CONFIG;
use crate::req::Request;
use crate::utils::extract_session_cookie;

/// Request-scoped identity resolved from the session cookie.
#[derive(Debug, Clone)]
pub struct SessionUser {
    pub user_id: i32,
    pub username: String,
}

pub struct Middleware {}

impl Middleware {
    pub async fn new<R: AsyncRead + Unpin>(reader: &mut R) -> Result<(Request, Option<SessionUser>)> {
        let request = Request::new(reader).await?;
        let session = session_from_request(&request, &CONFIG.session_secret);
        Ok((request, session))
    }
}

// Anonymous requests are not an error here; the router decides which
// paths require a session
pub fn session_from_request(request: &Request, secret: &str) -> Option<SessionUser> {
    let token = extract_session_cookie(&request.headers)?;
    let claims = verify_jwt(&token, secret).ok()?;
    let user_id = claims.sub.parse::<i32>().ok()?;
    Some(SessionUser {
        user_id,
        username: claims.name,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use session_auth::jwt::issue_jwt;

    const SECRET: &str = "mdw-test-secret";

    async fn request_with_cookie(cookie: &str) -> Request {
        let raw = format!("GET / HTTP/1.1\r\nCookie: {}\r\n\r\n", cookie);
        Request::new(raw.as_bytes()).await.unwrap()
    }

    #[tokio::test]
    async fn resolves_user_from_session_cookie() {
        let token = issue_jwt(7, "alice", SECRET, 1).unwrap();
        let request = request_with_cookie(&format!("session={}", token)).await;

        let session = session_from_request(&request, SECRET).unwrap();
        assert_eq!(session.user_id, 7);
        assert_eq!(session.username, "alice");
    }

    #[tokio::test]
    async fn missing_or_bogus_sessions_resolve_to_none() {
        let request = Request::new(b"GET / HTTP/1.1\r\n\r\n" as &[u8]).await.unwrap();
        assert!(session_from_request(&request, SECRET).is_none());

        let request = request_with_cookie("session=not.a.jwt").await;
        assert!(session_from_request(&request, SECRET).is_none());
    }

    #[tokio::test]
    async fn wrong_secret_resolves_to_none() {
        let token = issue_jwt(7, "alice", "other-secret", 1).unwrap();
        let request = request_with_cookie(&format!("session={}", token)).await;
        assert!(session_from_request(&request, SECRET).is_none());
    }
}
