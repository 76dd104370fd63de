use anyhow::{Context, Result};
use std::collections::HashMap;
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::utils;

#[derive(Debug, PartialEq)]
pub enum Method {
    GET,
    POST,
}

impl TryFrom<&str> for Method {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, anyhow::Error> {
        match value {
            "GET" => Ok(Method::GET),
            "POST" => Ok(Method::POST),
            _ => Err(anyhow::anyhow!("Method not supported")),
        }
    }
}

#[derive(Debug)]
pub struct Request {
    pub method: Method,
    pub path: String,
    pub params: Option<std::collections::HashMap<String, String>>,
    pub headers: std::collections::HashMap<String, String>,
    pub body: Option<String>,
}

impl Request {
    pub async fn new<Reader: AsyncRead + Unpin>(mut reader: Reader) -> Result<Self> {
        let mut buffer = [0; 4096];
        let size = reader
            .read(&mut buffer)
            .await
            .context("Failed to read stream")?;
        if size >= 4096 {
            return Err(anyhow::anyhow!("Request too large"));
        }
        let request = String::from_utf8_lossy(&buffer[..size]);
        let mut parts = request.split("\r\n\r\n");
        let head = parts.next().context("Headline Error")?;
        // Body
        let body = parts
            .next()
            .map(|b| b.to_string())
            .filter(|b| !b.is_empty());

        // Method and path
        let mut head_line = head.lines();
        let first: &str = head_line.next().context("Empty Request")?;
        let mut request_parts: std::str::SplitWhitespace<'_> = first.split_whitespace();
        let method: Method = request_parts
            .next()
            .ok_or(anyhow::anyhow!("missing method"))
            .and_then(TryInto::try_into)
            .context("Missing Method")?;
        let url = request_parts.next().context("No Path")?;
        let (path, params) = Self::extract_query_param(url);

        // Headers
        let mut headers = HashMap::new();
        for line in head_line {
            if let Some((k, v)) = line.split_once(":") {
                headers.insert(k.trim().to_lowercase(), v.trim().to_string());
            }
        }
        Ok(Request {
            method,
            path,
            headers,
            body,
            params,
        })
    }

    pub fn form_fields(&self) -> HashMap<String, String> {
        self.body
            .as_deref()
            .map(utils::parse_form)
            .unwrap_or_default()
    }

    fn extract_query_param(url: &str) -> (String, Option<HashMap<String, String>>) {
        // Find the query string
        if let Some(pos) = url.find('?') {
            let path = &url[0..pos];
            let query_string = &url[pos + 1..]; // Get substring after '?'

            // Parse query params into a HashMap
            let params: HashMap<_, _> = query_string
                .split('&')
                .filter_map(|pair| {
                    let mut kv = pair.split('=');
                    Some((
                        utils::url_decode(kv.next()?),
                        utils::url_decode(kv.next()?),
                    ))
                })
                .collect();

            (path.to_string(), Some(params))
        } else {
            (url.to_string(), None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn parses_get_with_query_params() {
        let raw = b"GET /quote?symbol=nflx HTTP/1.1\r\nHost: localhost\r\n\r\n" as &[u8];
        let request = Request::new(raw).await.unwrap();

        assert_eq!(request.method, Method::GET);
        assert_eq!(request.path, "/quote");
        let params = request.params.unwrap();
        assert_eq!(params.get("symbol"), Some(&"nflx".to_string()));
        assert_eq!(
            request.headers.get("host"),
            Some(&"localhost".to_string())
        );
        assert!(request.body.is_none());
    }

    #[tokio::test]
    async fn parses_post_form_body() {
        let raw = b"POST /buy HTTP/1.1\r\nContent-Type: application/x-www-form-urlencoded\r\n\r\nsymbol=AAPL&shares=2" as &[u8];
        let request = Request::new(raw).await.unwrap();

        assert_eq!(request.method, Method::POST);
        assert_eq!(request.path, "/buy");
        let form = request.form_fields();
        assert_eq!(form.get("symbol"), Some(&"AAPL".to_string()));
        assert_eq!(form.get("shares"), Some(&"2".to_string()));
    }

    #[tokio::test]
    async fn rejects_unsupported_method() {
        let raw = b"DELETE /buy HTTP/1.1\r\n\r\n" as &[u8];
        assert!(Request::new(raw).await.is_err());
    }

    #[tokio::test]
    async fn rejects_oversized_request() {
        let raw = vec![b'A'; 5000];
        assert!(Request::new(raw.as_slice()).await.is_err());
    }
}
