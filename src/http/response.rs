//! Response handling and transformation.
//!
//! # Responsibilities
//! - Strip hop-by-hop headers in both directions
//! - Tag responses with the serving balancer's name
//! - Build the plain-text error responses the dispatcher returns
//!
//! # Design Decisions
//! - Streaming responses avoid buffering entire body
//! - Error bodies are complete, fixed strings; clients never see a partial upstream body

use axum::body::Body;
use axum::http::{header, HeaderMap, HeaderName, HeaderValue, Response, StatusCode};

/// Header identifying the balancer instance that served a response.
pub static X_SERVER_NAME: HeaderName = HeaderName::from_static("x-server-name");

/// Headers that apply to a single connection and must not be forwarded.
static HOP_BY_HOP: [HeaderName; 9] = [
    header::CONNECTION,
    HeaderName::from_static("keep-alive"),
    HeaderName::from_static("proxy-connection"),
    header::PROXY_AUTHENTICATE,
    header::PROXY_AUTHORIZATION,
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
];

/// Remove hop-by-hop headers, including any named in `Connection`.
pub fn strip_hop_by_hop(headers: &mut HeaderMap) {
    let named: Vec<HeaderName> = headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .filter_map(|token| HeaderName::from_bytes(token.trim().as_bytes()).ok())
        .collect();

    for name in named.iter().chain(HOP_BY_HOP.iter()) {
        headers.remove(name);
    }
}

/// Add the balancer's `X-Server-Name` to a response.
///
/// Appends, so an `X-Server-Name` sent by the backend is relayed as well.
pub fn tag_server_name(response: &mut Response<Body>, name: &HeaderValue) {
    response.headers_mut().append(X_SERVER_NAME.clone(), name.clone());
}

/// Plain-text response with a fixed body.
pub fn error_response(status: StatusCode, message: &'static str) -> Response<Body> {
    let mut response = Response::new(Body::from(message));
    *response.status_mut() = status;
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_hop_by_hop() {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONNECTION, HeaderValue::from_static("keep-alive, x-trace-hop"));
        headers.insert("keep-alive", HeaderValue::from_static("timeout=5"));
        headers.insert("x-trace-hop", HeaderValue::from_static("1"));
        headers.insert(header::TRANSFER_ENCODING, HeaderValue::from_static("chunked"));
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert("x-custom", HeaderValue::from_static("kept"));

        strip_hop_by_hop(&mut headers);

        assert_eq!(headers.len(), 2);
        assert_eq!(headers[header::CONTENT_TYPE], "application/json");
        assert_eq!(headers["x-custom"], "kept");
    }

    #[test]
    fn test_error_response() {
        let mut response = error_response(StatusCode::BAD_GATEWAY, "Bad gateway");
        tag_server_name(&mut response, &HeaderValue::from_static("lb-1"));

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(response.headers()[&X_SERVER_NAME], "lb-1");
        assert_eq!(response.headers()[header::CONTENT_TYPE], "text/plain; charset=utf-8");
    }

    #[test]
    fn test_tag_keeps_backend_server_name() {
        let mut response = Response::new(Body::empty());
        response
            .headers_mut()
            .insert(X_SERVER_NAME.clone(), HeaderValue::from_static("backend-a"));

        tag_server_name(&mut response, &HeaderValue::from_static("lb-1"));

        let values: Vec<&str> = response
            .headers()
            .get_all(&X_SERVER_NAME)
            .iter()
            .map(|v| v.to_str().unwrap())
            .collect();
        assert_eq!(values, vec!["backend-a", "lb-1"]);
    }
}
