//! Request-line parsing.
//!
//! Only the request line matters for routing.  Header fields are read off
//! the socket so the peer sees a clean close, but never interpreted.

use core::fmt;

/// Request methods the server distinguishes.  Routing ignores the method;
/// only `HEAD` changes the response (no body).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Head,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Request<'a> {
    pub method: Method,
    /// Target with any query string or fragment removed.
    pub path: &'a str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestError {
    /// No line terminator within the head buffer.
    Incomplete,
    NotUtf8,
    /// Request line is not `METHOD SP TARGET SP HTTP/x.y`.
    Malformed,
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Incomplete => write!(f, "request line not terminated"),
            Self::NotUtf8 => write!(f, "request line is not valid UTF-8"),
            Self::Malformed => write!(f, "malformed request line"),
        }
    }
}

impl std::error::Error for RequestError {}

/// `true` once `buf` holds a complete request head (blank line seen).
pub fn head_complete(buf: &[u8]) -> bool {
    buf.windows(4).any(|w| w == b"\r\n\r\n") || buf.windows(2).any(|w| w == b"\n\n")
}

/// Parse the first line of `head`.
pub fn parse(head: &[u8]) -> Result<Request<'_>, RequestError> {
    let end = head
        .iter()
        .position(|&b| b == b'\n')
        .ok_or(RequestError::Incomplete)?;
    let line = core::str::from_utf8(&head[..end]).map_err(|_| RequestError::NotUtf8)?;
    let line = line.strip_suffix('\r').unwrap_or(line);

    let mut parts = line.split(' ');
    let (Some(method), Some(target), Some(version), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(RequestError::Malformed);
    };

    if method.is_empty() || !method.bytes().all(|b| b.is_ascii_uppercase()) {
        return Err(RequestError::Malformed);
    }
    if !target.starts_with('/') {
        return Err(RequestError::Malformed);
    }
    if !is_version(version) {
        return Err(RequestError::Malformed);
    }

    let method = match method {
        "GET" => Method::Get,
        "HEAD" => Method::Head,
        _ => Method::Other,
    };
    let path = target
        .split(['?', '#'])
        .next()
        .unwrap_or(target);

    Ok(Request { method, path })
}

fn is_version(v: &str) -> bool {
    let Some(rest) = v.strip_prefix("HTTP/") else {
        return false;
    };
    let mut digits = rest.split('.');
    match (digits.next(), digits.next(), digits.next()) {
        (Some(major), Some(minor), None) => {
            !major.is_empty()
                && !minor.is_empty()
                && major.bytes().all(|b| b.is_ascii_digit())
                && minor.bytes().all(|b| b.is_ascii_digit())
        }
        _ => false,
    }
}
