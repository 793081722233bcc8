//! HTTP response helpers.

use anyhow::Result;
use serde::Serialize;
use tiny_http::{Header, Request, Response, StatusCode};

use crate::utils::mime::types::{HTML, JAVASCRIPT, JSON, PLAIN};

/// Header set on every response the sandbox fetches: its origin is opaque.
const ALLOW_ANY_ORIGIN: (&str, &str) = ("Access-Control-Allow-Origin", "*");

/// Respond with the host page.
pub fn respond_html(request: Request, body: String) -> Result<()> {
    send(request, 200, HTML, body.into_bytes(), &[("Cache-Control", "no-store")])
}

/// Respond with one preview document.
pub fn respond_document(request: Request, body: &str) -> Result<()> {
    send(
        request,
        200,
        HTML,
        body.as_bytes().to_vec(),
        &[("Cache-Control", "no-store"), ALLOW_ANY_ORIGIN],
    )
}

/// Respond with a module blob. Bodies never change under one URL.
pub fn respond_blob(request: Request, body: &str) -> Result<()> {
    send(
        request,
        200,
        JAVASCRIPT,
        body.as_bytes().to_vec(),
        &[("Cache-Control", "public, max-age=31536000, immutable"), ALLOW_ANY_ORIGIN],
    )
}

/// Respond with a JSON value.
pub fn respond_json<T: Serialize + ?Sized>(request: Request, status: u16, value: &T) -> Result<()> {
    let body = serde_json::to_vec(value)?;
    send(request, status, JSON, body, &[("Cache-Control", "no-store")])
}

/// Respond with an empty 204.
pub fn respond_no_content(request: Request) -> Result<()> {
    request.respond(Response::empty(StatusCode(204)))?;
    Ok(())
}

/// Respond with a plain-text error.
pub fn respond_text(request: Request, status: u16, message: &str) -> Result<()> {
    send(request, status, PLAIN, message.as_bytes().to_vec(), &[])
}

pub fn respond_not_found(request: Request) -> Result<()> {
    respond_text(request, 404, "404 Not Found")
}

/// Respond with 503 Service Unavailable (server shutting down).
pub fn respond_unavailable(request: Request) -> Result<()> {
    respond_text(request, 503, "503 Service Unavailable")
}

fn send(
    request: Request,
    status: u16,
    content_type: &str,
    body: Vec<u8>,
    headers: &[(&str, &str)],
) -> Result<()> {
    let mut response = Response::from_data(body).with_status_code(StatusCode(status));
    for (key, value) in std::iter::once(&("Content-Type", content_type)).chain(headers) {
        if let Some(header) = make_header(key, value) {
            response.add_header(header);
        }
    }
    request.respond(response)?;
    Ok(())
}

fn make_header(key: &str, value: &str) -> Option<Header> {
    Header::from_bytes(key.as_bytes(), value.as_bytes()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_make_header() {
        let header = make_header("Content-Type", JSON).unwrap();
        assert!(header.field.equiv("content-type"));
        assert_eq!(header.value.as_str(), JSON);
        assert!(make_header("Café", "x").is_none());
    }
}
