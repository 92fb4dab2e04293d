use chrono::{DateTime, Utc};
use std::fmt;
use std::io::{self, Write};
use std::time::SystemTime;

pub const SERVER_NAME: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Status {
    pub code: u16,
    pub reason: &'static str,
    pub explanation: &'static str,
}

impl Status {
    const fn new(code: u16, reason: &'static str, explanation: &'static str) -> Self {
        Self {
            code,
            reason,
            explanation,
        }
    }

    pub const OK: Status = Status::new(200, "OK", "Request fulfilled, document follows");
    pub const MOVED_PERMANENTLY: Status = Status::new(
        301,
        "Moved Permanently",
        "Object moved permanently -- see URI list",
    );
    pub const BAD_REQUEST: Status = Status::new(
        400,
        "Bad Request",
        "Bad request syntax or unsupported method",
    );
    pub const NOT_FOUND: Status =
        Status::new(404, "Not Found", "Nothing matches the given URI");
    pub const URI_TOO_LONG: Status =
        Status::new(414, "URI Too Long", "The URI is too long");
    pub const REQUEST_HEADER_FIELDS_TOO_LARGE: Status = Status::new(
        431,
        "Request Header Fields Too Large",
        "The server is unwilling to process the request because its header fields are too large",
    );
    pub const NOT_IMPLEMENTED: Status = Status::new(
        501,
        "Not Implemented",
        "Server does not support this operation",
    );
    pub const HTTP_VERSION_NOT_SUPPORTED: Status = Status::new(
        505,
        "HTTP Version Not Supported",
        "Cannot fulfill request",
    );
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.code, self.reason)
    }
}

/// Ordered header list; names compare case-insensitively.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers(Vec<(String, String)>);

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.push((name.into(), value.into()));
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Formats a timestamp as an IMF-fixdate, e.g. `Sun, 06 Nov 1994 08:49:37 GMT`.
pub fn http_date(time: SystemTime) -> String {
    DateTime::<Utc>::from(time)
        .format("%a, %d %b %Y %H:%M:%S GMT")
        .to_string()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: Status,
    pub headers: Headers,
    pub body: Vec<u8>,
}

impl Response {
    /// Starts a response carrying the `Server` and `Date` headers.
    pub fn new(status: Status) -> Self {
        let mut headers = Headers::new();
        headers.push("Server", SERVER_NAME);
        headers.push("Date", http_date(SystemTime::now()));
        Self {
            status,
            headers,
            body: Vec::new(),
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push(name, value);
        self
    }

    pub fn body(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }

    /// HTML error page with the status explanation.
    pub fn error(status: Status, message: &str) -> Self {
        let page = format!(
            "<!DOCTYPE HTML>\n\
             <html lang=\"en\">\n\
             \x20   <head>\n\
             \x20       <meta charset=\"utf-8\">\n\
             \x20       <title>Error response</title>\n\
             \x20   </head>\n\
             \x20   <body>\n\
             \x20       <h1>Error response</h1>\n\
             \x20       <p>Error code: {code}</p>\n\
             \x20       <p>Message: {message}.</p>\n\
             \x20       <p>Error code explanation: {code} - {explanation}.</p>\n\
             \x20   </body>\n\
             </html>\n",
            code = status.code,
            message = html_escape(message),
            explanation = status.explanation,
        );
        let body = page.into_bytes();
        Response::new(status)
            .header("Connection", "close")
            .header("Content-Type", "text/html;charset=utf-8")
            .header("Content-Length", body.len().to_string())
            .body(body)
    }

    /// Writes the status line, the headers and the terminating blank line.
    pub fn finalize_headers<W: Write>(&self, out: &mut W, headers: &Headers) -> io::Result<()> {
        let mut head = format!("HTTP/1.0 {}\r\n", self.status);
        for (name, value) in headers.iter() {
            head.push_str(name);
            head.push_str(": ");
            head.push_str(value);
            head.push_str("\r\n");
        }
        head.push_str("\r\n");
        out.write_all(head.as_bytes())
    }

    /// Runs `finalize` over the response headers, then writes the body in one call.
    pub fn write_with<W, F>(&self, out: &mut W, finalize: F) -> io::Result<()>
    where
        W: Write,
        F: FnOnce(&mut W, Headers) -> io::Result<()>,
    {
        finalize(&mut *out, self.headers.clone())?;
        if !self.body.is_empty() {
            out.write_all(&self.body)?;
        }
        out.flush()
    }

    /// Writes the response with the gzip encoding hook keyed on `hook_path`.
    pub fn write_to<W: Write>(&self, out: &mut W, hook_path: &str) -> io::Result<()> {
        self.write_with(
            out,
            with_gzip_encoding(hook_path, |out: &mut W, headers: Headers| {
                self.finalize_headers(out, &headers)
            }),
        )
    }
}

/// Decorates a finalize step: when `path` ends with `.gz`, `Content-Encoding: gzip`
/// is appended immediately before the headers are finalized.
pub fn with_gzip_encoding<W, F>(path: &str, finalize: F) -> impl FnOnce(&mut W, Headers) -> io::Result<()>
where
    W: Write,
    F: FnOnce(&mut W, Headers) -> io::Result<()>,
{
    let gzipped = path.ends_with(".gz");
    move |out, mut headers| {
        if gzipped {
            headers.push("Content-Encoding", "gzip");
        }
        finalize(out, headers)
    }
}

pub fn html_escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
