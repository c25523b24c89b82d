//! Route table and response framing.

use core::fmt::Write as _;

use crate::eventlog::EventLog;
use crate::net::transport::{Transport, WriteStalled};

use super::page::INDEX_HTML;

pub const TEXT_HTML: &str = "text/html; charset=utf-8";
pub const TEXT_PLAIN_UTF8: &str = "text/plain; charset=utf-8";
pub const TEXT_PLAIN: &str = "text/plain";

const NOT_FOUND_BODY: &[u8] = b"Not found. Try /\n";
const BAD_REQUEST_BODY: &[u8] = b"Bad request\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Index,
    Logs,
    Favicon,
    NotFound,
    /// The request line could not be parsed.
    BadRequest,
}

impl Route {
    /// Exact-match lookup on a query-stripped path.
    pub fn resolve(path: &str) -> Self {
        match path {
            "/" => Self::Index,
            "/logs" => Self::Logs,
            "/favicon.ico" => Self::Favicon,
            _ => Self::NotFound,
        }
    }
}

/// A fully determined response.  `body` borrows either static content or
/// the event log snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Response<'a> {
    pub status: u16,
    pub content_type: Option<&'static str>,
    pub cache_control: Option<&'static str>,
    pub body: &'a [u8],
}

pub fn respond(route: Route, log: &EventLog) -> Response<'_> {
    match route {
        Route::Index => Response {
            status: 200,
            content_type: Some(TEXT_HTML),
            cache_control: None,
            body: INDEX_HTML.as_bytes(),
        },
        Route::Logs => Response {
            status: 200,
            content_type: Some(TEXT_PLAIN_UTF8),
            cache_control: Some("no-store"),
            body: log.snapshot().as_bytes(),
        },
        Route::Favicon => Response {
            status: 204,
            content_type: None,
            cache_control: None,
            body: &[],
        },
        Route::NotFound => Response {
            status: 404,
            content_type: Some(TEXT_PLAIN),
            cache_control: None,
            body: NOT_FOUND_BODY,
        },
        Route::BadRequest => Response {
            status: 400,
            content_type: Some(TEXT_PLAIN),
            cache_control: None,
            body: BAD_REQUEST_BODY,
        },
    }
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        204 => "No Content",
        400 => "Bad Request",
        404 => "Not Found",
        _ => "",
    }
}

impl Response<'_> {
    /// Status line and header block, including the terminating blank line.
    ///
    /// 204 carries no `Content-Length`; every other status does.
    pub fn head(&self) -> String {
        let mut out = String::with_capacity(160);
        let _ = write!(out, "HTTP/1.1 {} {}\r\n", self.status, reason(self.status));
        if let Some(ct) = self.content_type {
            let _ = write!(out, "Content-Type: {}\r\n", ct);
        }
        if let Some(cc) = self.cache_control {
            let _ = write!(out, "Cache-Control: {}\r\n", cc);
        }
        if self.status != 204 {
            let _ = write!(out, "Content-Length: {}\r\n", self.body.len());
        }
        out.push_str("Connection: close\r\n\r\n");
        out
    }

    /// Write head and, unless `head_only`, the body.
    pub fn write_to<T: Transport>(
        &self,
        transport: &mut T,
        head_only: bool,
    ) -> Result<(), WriteStalled<T::Error>> {
        transport.write_all(self.head().as_bytes())?;
        if !head_only && !self.body.is_empty() {
            transport.write_all(self.body)?;
        }
        transport.flush().map_err(WriteStalled::Io)
    }
}
