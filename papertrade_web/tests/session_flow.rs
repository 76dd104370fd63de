//! Parses raw browser-shaped requests and resolves the session identity
//! the same way the server does, minus the socket.

use papertrade_web::mdw::session_from_request;
use papertrade_web::req::Request;
use session_auth::jwt::{issue_jwt, verify_jwt};

const SECRET: &str = "integration-secret";

#[tokio::test]
async fn browser_flow_round_trips_identity() {
    let token = issue_jwt(12, "dana", SECRET, 2).unwrap();
    let claims = verify_jwt(&token, SECRET).unwrap();
    assert_eq!(claims.sub, "12");
    assert_eq!(claims.name, "dana");

    let raw = format!(
        "POST /buy HTTP/1.1\r\nHost: localhost\r\nCookie: session={}\r\nContent-Type: application/x-www-form-urlencoded\r\n\r\nsymbol=nflx&shares=2",
        token
    );
    let request = Request::new(raw.as_bytes()).await.unwrap();

    let session = session_from_request(&request, SECRET).unwrap();
    assert_eq!(session.user_id, 12);
    assert_eq!(session.username, "dana");

    let form = request.form_fields();
    assert_eq!(form.get("symbol"), Some(&"nflx".to_string()));
    assert_eq!(form.get("shares"), Some(&"2".to_string()));
}

#[tokio::test]
async fn tampered_cookie_is_anonymous() {
    let token = issue_jwt(12, "dana", SECRET, 2).unwrap();
    let raw = format!("GET / HTTP/1.1\r\nCookie: session={}x\r\n\r\n", token);
    let request = Request::new(raw.as_bytes()).await.unwrap();

    assert!(session_from_request(&request, SECRET).is_none());
}
