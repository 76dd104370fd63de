use std::collections::HashMap;

use serde::{Deserialize, Serialize};

pub fn ser_to_str<T: for<'a> Deserialize<'a> + Serialize>(
    t: &T,
) -> Result<String, serde_json::Error> {
    serde_json::to_string(t)
}

pub fn extract_session_cookie(
    headers: &std::collections::HashMap<std::string::String, std::string::String>,
) -> Option<String> {
    headers.get("cookie").and_then(|s| {
        s.split(';')
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, value)| *name == "session" && !value.is_empty())
            .map(|(_, value)| value.to_string())
    })
}

// Browsers send form fields percent-encoded with '+' for spaces
pub fn url_decode(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            b'%' if i + 2 < bytes.len() => {
                let hex = [bytes[i + 1], bytes[i + 2]];
                match std::str::from_utf8(&hex)
                    .ok()
                    .and_then(|h| u8::from_str_radix(h, 16).ok())
                {
                    Some(byte) => {
                        out.push(byte);
                        i += 3;
                    }
                    None => {
                        out.push(b'%');
                        i += 1;
                    }
                }
            }
            byte => {
                out.push(byte);
                i += 1;
            }
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}

pub fn parse_form(body: &str) -> HashMap<String, String> {
    body.split('&')
        .filter_map(|pair| {
            let (k, v) = pair.split_once('=')?;
            Some((url_decode(k), url_decode(v)))
        })
        .collect()
}

// Whole positive numbers only, so "1.5", "-3" and "+3" are all rejected
pub fn parse_positive_int(input: &str) -> Option<i64> {
    if input.is_empty() || !input.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    input.parse::<i64>().ok().filter(|n| *n > 0)
}

pub fn redirect_response(location: &str, set_cookie: Option<&str>) -> String {
    match set_cookie {
        Some(cookie) => format!(
            "HTTP/1.1 302 Found\r\nLocation: {}\r\nSet-Cookie: {}\r\n\r\n",
            location, cookie
        ),
        None => format!("HTTP/1.1 302 Found\r\nLocation: {}\r\n\r\n", location),
    }
}

pub fn session_cookie(token: &str) -> String {
    format!("session={}; HttpOnly; Path=/", token)
}

pub fn clear_session_cookie() -> &'static str {
    "session=; HttpOnly; Path=/; Max-Age=0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_plus_and_percent_escapes() {
        assert_eq!(url_decode("a+b"), "a b");
        assert_eq!(url_decode("p%40ss%21"), "p@ss!");
        assert_eq!(url_decode("100%"), "100%");
        assert_eq!(url_decode("%zz"), "%zz");
    }

    #[test]
    fn parses_urlencoded_form_bodies() {
        let form = parse_form("username=alice&password=p%40ss+word");
        assert_eq!(form.get("username"), Some(&"alice".to_string()));
        assert_eq!(form.get("password"), Some(&"p@ss word".to_string()));
        assert_eq!(form.get("missing"), None);
    }

    #[test]
    fn positive_int_rejects_signs_decimals_and_zero() {
        assert_eq!(parse_positive_int("3"), Some(3));
        assert_eq!(parse_positive_int("0"), None);
        assert_eq!(parse_positive_int("-3"), None);
        assert_eq!(parse_positive_int("+3"), None);
        assert_eq!(parse_positive_int("1.5"), None);
        assert_eq!(parse_positive_int(""), None);
        assert_eq!(parse_positive_int("99999999999999999999"), None);
    }

    #[test]
    fn finds_session_cookie_among_others() {
        let mut headers = HashMap::new();
        headers.insert(
            "cookie".to_string(),
            "theme=dark; session=abc.def.ghi; lang=en".to_string(),
        );
        assert_eq!(
            extract_session_cookie(&headers),
            Some("abc.def.ghi".to_string())
        );

        headers.insert("cookie".to_string(), "theme=dark".to_string());
        assert_eq!(extract_session_cookie(&headers), None);
    }

    #[test]
    fn redirect_carries_location_and_cookie() {
        let plain = redirect_response("/login", None);
        assert!(plain.starts_with("HTTP/1.1 302 Found\r\n"));
        assert!(plain.contains("Location: /login\r\n"));
        assert!(!plain.contains("Set-Cookie"));

        let with_cookie = redirect_response("/", Some(&session_cookie("tok")));
        assert!(with_cookie.contains("Set-Cookie: session=tok; HttpOnly; Path=/\r\n"));
    }
}
