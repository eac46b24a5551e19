//! HTTPS enforcement.
//!
//! Plain HTTP requests get a permanent redirect to the same URL over HTTPS.
//! Runs inside the entry point, so behind a proxy it sees the scheme
//! restored by [`ProxyFix`](super::ProxyFix).

use axum::{
    extract::Request,
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::ClientOrigin;

/// Redirect non-HTTPS requests.
pub async fn https_redirect(request: Request, next: Next) -> Response {
    match redirect_target(&request) {
        Some(location) => {
            (StatusCode::MOVED_PERMANENTLY, [(header::LOCATION, location)]).into_response()
        }
        None => next.run(request).await,
    }
}

/// The `https://` URL for `request`, or `None` if it is already secure or
/// carries no host to redirect to.
fn redirect_target<B>(request: &axum::http::Request<B>) -> Option<String> {
    let (scheme, host) = match request.extensions().get::<ClientOrigin>() {
        Some(origin) => (origin.scheme.clone(), origin.host.clone()),
        None => (
            request.uri().scheme_str().unwrap_or("http").to_string(),
            request
                .headers()
                .get(header::HOST)
                .and_then(|h| h.to_str().ok())
                .map(str::to_string),
        ),
    };

    if scheme == "https" {
        return None;
    }

    let path = request
        .uri()
        .path_and_query()
        .map(|p| p.as_str())
        .unwrap_or("/");
    host.map(|host| format!("https://{}{}", host, path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    #[test]
    fn test_plain_http_is_redirected() {
        let request = Request::builder()
            .uri("/posts?page=2")
            .header("host", "soconn.example.com")
            .body(())
            .unwrap();

        assert_eq!(
            redirect_target(&request).as_deref(),
            Some("https://soconn.example.com/posts?page=2")
        );
    }

    #[test]
    fn test_forwarded_https_passes() {
        let mut request = Request::builder().uri("/").body(()).unwrap();
        request.extensions_mut().insert(ClientOrigin {
            ip: None,
            scheme: "https".to_string(),
            host: Some("soconn.example.com".to_string()),
        });

        assert_eq!(redirect_target(&request), None);
    }

    #[test]
    fn test_missing_host_passes() {
        let request = Request::builder().uri("/").body(()).unwrap();
        assert_eq!(redirect_target(&request), None);
    }
}
