use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use std::time::{Duration, Instant};
use tracing::debug;

use crate::error::{Error, Result};

use super::request::{RequestBody, RequestInput};
use super::response::HttpResponse;

const MAX_REDIRECTS: usize = 10;

/// Blocking HTTP client shared by every request of one collection run.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// `timeout` bounds each request from connect to the end of the body.
    pub fn new(insecure: bool, timeout: Duration) -> Result<Self> {
        let mut builder = Client::builder()
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .timeout(timeout);

        // SSL verification
        if insecure {
            builder = builder.danger_accept_invalid_certs(true);
        }

        Ok(Self {
            client: builder.build()?,
        })
    }

    pub fn send(&self, request: RequestInput) -> Result<HttpResponse> {
        let url = reqwest::Url::parse(&request.url)
            .map_err(|e| Error::InvalidRequest(format!("Invalid URL `{}`: {e}", request.url)))?;
        let headers = build_headers(&request.headers)?;

        let mut req_builder = self
            .client
            .request(request.method.into(), url)
            .headers(headers);

        if !request.method.allows_body() && request.body != RequestBody::None {
            debug!("sending a body with {} {}", request.method, request.url);
        }
        req_builder = match request.body {
            RequestBody::None => req_builder,
            RequestBody::Raw(body) => req_builder.body(body),
            RequestBody::Form(fields) => req_builder.form(&fields),
        };

        let started = Instant::now();
        let response = req_builder.send()?;
        let status = response.status();
        let bytes = response.bytes()?;
        let elapsed = started.elapsed().as_millis() as u64;

        Ok(HttpResponse {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or("Unknown").to_string(),
            duration_ms: elapsed,
            size_bytes: bytes.len(),
        })
    }
}

pub fn build_headers(input: &[(String, String)]) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();

    for (key, value) in input {
        let key = key.trim();
        if key.is_empty() {
            continue;
        }

        let header_name = HeaderName::from_bytes(key.as_bytes())
            .map_err(|e| Error::InvalidRequest(format!("Invalid header name `{key}`: {e}")))?;
        let header_value = HeaderValue::from_str(value.trim())
            .map_err(|e| Error::InvalidRequest(format!("Invalid header value for `{key}`: {e}")))?;
        headers.append(header_name, header_value);
    }

    Ok(headers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::method::HttpMethod;

    fn pairs(input: &[(&str, &str)]) -> Vec<(String, String)> {
        input
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn build_headers_keeps_repeated_keys() {
        let headers = build_headers(&pairs(&[
            ("Accept", "application/json"),
            ("X-Tag", "a"),
            ("X-Tag", "b"),
            ("", "ignored"),
        ]))
        .unwrap();

        assert_eq!(headers.len(), 3);
        assert_eq!(headers.get_all("x-tag").iter().count(), 2);
    }

    #[test]
    fn build_headers_rejects_invalid_name() {
        let err = build_headers(&pairs(&[("Bad Header", "x")])).unwrap_err();
        assert!(matches!(err, Error::InvalidRequest(_)));
    }

    #[test]
    fn send_rejects_unparseable_url() {
        let client = HttpClient::new(false, Duration::from_secs(5)).unwrap();
        let err = client
            .send(RequestInput {
                method: HttpMethod::Get,
                url: "{{base}}/ping".into(),
                headers: Vec::new(),
                body: RequestBody::None,
            })
            .unwrap_err();
        assert!(matches!(err, Error::InvalidRequest(_)));
    }
}
