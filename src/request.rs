use log::debug;
use std::io::{self, BufRead, Read};

use crate::response::{Headers, Status};

pub const MAX_LINE: usize = 65536;
pub const MAX_HEADERS: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: String,
    /// Raw request target, query string included.
    pub target: String,
    pub version: String,
    pub headers: Headers,
}

/// What came off the wire for one connection.
#[derive(Debug, PartialEq, Eq)]
pub enum Incoming {
    Request(Request),
    /// The head was malformed; answer with an error page.
    Rejected { status: Status, message: String },
    /// The peer closed without sending a request line.
    Closed,
}

impl Request {
    pub fn get(target: &str) -> Self {
        Self {
            method: "GET".to_string(),
            target: target.to_string(),
            version: "HTTP/1.1".to_string(),
            headers: Headers::new(),
        }
    }

    pub fn read_from<R: BufRead>(reader: &mut R) -> io::Result<Incoming> {
        let mut line = String::new();
        let read = read_head_line(reader, &mut line)?;
        if read == 0 {
            return Ok(Incoming::Closed);
        }
        if read > MAX_LINE {
            return Ok(Incoming::Rejected {
                status: Status::URI_TOO_LONG,
                message: "Request line is too long".to_string(),
            });
        }

        let request_line = line.trim_end_matches(&['\r', '\n'][..]).to_string();
        debug!("Request line: {}", request_line);

        let parts: Vec<&str> = request_line.split_whitespace().collect();
        let (method, target, version) = match parts.as_slice() {
            [method, target, version] => {
                (method.to_string(), target.to_string(), version.to_string())
            }
            _ => {
                return Ok(Incoming::Rejected {
                    status: Status::BAD_REQUEST,
                    message: format!("Bad request syntax ({:?})", request_line),
                })
            }
        };

        match parse_version(&version) {
            Some((major, _)) if major >= 2 => {
                return Ok(Incoming::Rejected {
                    status: Status::HTTP_VERSION_NOT_SUPPORTED,
                    message: format!("Invalid HTTP version ({})", &version["HTTP/".len()..]),
                })
            }
            Some(_) => {}
            None => {
                return Ok(Incoming::Rejected {
                    status: Status::BAD_REQUEST,
                    message: format!("Bad request version ({:?})", version),
                })
            }
        }

        let mut headers = Headers::new();
        loop {
            line.clear();
            let read = read_head_line(reader, &mut line)?;
            if read > MAX_LINE {
                return Ok(Incoming::Rejected {
                    status: Status::REQUEST_HEADER_FIELDS_TOO_LARGE,
                    message: "Line too long".to_string(),
                });
            }
            if read == 0 || line.trim().is_empty() {
                break;
            }
            if headers.len() == MAX_HEADERS {
                return Ok(Incoming::Rejected {
                    status: Status::REQUEST_HEADER_FIELDS_TOO_LARGE,
                    message: "Too many headers".to_string(),
                });
            }
            debug!("Header line: {}", line.trim());
            if let Some((name, value)) = line.split_once(':') {
                headers.push(name.trim(), value.trim());
            }
        }

        Ok(Incoming::Request(Request {
            method,
            target,
            version,
            headers,
        }))
    }
}

/// Reads one head line of at most `MAX_LINE + 1` bytes into `line`, decoding
/// it as ISO-8859-1 so obs-text bytes survive. Returns the byte count.
fn read_head_line<R: BufRead>(reader: &mut R, line: &mut String) -> io::Result<usize> {
    let mut bytes = Vec::new();
    let read = (&mut *reader)
        .take(MAX_LINE as u64 + 1)
        .read_until(b'\n', &mut bytes)?;
    line.extend(bytes.iter().map(|&b| b as char));
    Ok(read)
}

/// `HTTP/<major>.<minor>` with decimal digits only.
fn parse_version(version: &str) -> Option<(u32, u32)> {
    let number = version.strip_prefix("HTTP/")?;
    let (major, minor) = number.split_once('.')?;
    let digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    if !digits(major) || !digits(minor) {
        return None;
    }
    Some((major.parse().ok()?, minor.parse().ok()?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn read(raw: &str) -> Incoming {
        Request::read_from(&mut Cursor::new(raw.as_bytes().to_vec())).unwrap()
    }

    #[test]
    fn parses_request_line_and_headers() {
        let incoming = read("GET /app.js.gz?v=2 HTTP/1.1\r\nHost: localhost\r\nAccept-Encoding: gzip\r\n\r\n");
        let request = match incoming {
            Incoming::Request(r) => r,
            other => panic!("unexpected {:?}", other),
        };
        assert_eq!(request.method, "GET");
        assert_eq!(request.target, "/app.js.gz?v=2");
        assert_eq!(request.version, "HTTP/1.1");
        assert_eq!(request.headers.get("accept-encoding"), Some("gzip"));
        assert_eq!(request.headers.len(), 2);
    }

    #[test]
    fn empty_stream_is_closed() {
        assert_eq!(read(""), Incoming::Closed);
    }

    #[test]
    fn garbage_request_line_is_rejected() {
        match read("HELLO\r\n\r\n") {
            Incoming::Rejected { status, .. } => assert_eq!(status, Status::BAD_REQUEST),
            other => panic!("unexpected {:?}", other),
        }
        match read("GET / FTP/1.0\r\n\r\n") {
            Incoming::Rejected { status, .. } => assert_eq!(status, Status::BAD_REQUEST),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn overlong_request_line_is_rejected() {
        let raw = format!("GET /{} HTTP/1.1\r\n\r\n", "a".repeat(MAX_LINE));
        match read(&raw) {
            Incoming::Rejected { status, .. } => assert_eq!(status, Status::URI_TOO_LONG),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn too_many_headers_are_rejected() {
        let mut raw = String::from("GET / HTTP/1.1\r\n");
        for i in 0..=MAX_HEADERS {
            raw.push_str(&format!("X-Filler-{}: {}\r\n", i, i));
        }
        raw.push_str("\r\n");
        match read(&raw) {
            Incoming::Rejected { status, .. } => {
                assert_eq!(status, Status::REQUEST_HEADER_FIELDS_TOO_LARGE)
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn obs_text_in_header_values_is_kept() {
        let raw = b"GET /index.html HTTP/1.1\r\nHost: localhost\r\nX-Name: caf\xe9\r\n\r\n";
        match Request::read_from(&mut Cursor::new(raw.to_vec())).unwrap() {
            Incoming::Request(r) => {
                assert_eq!(r.target, "/index.html");
                assert_eq!(r.headers.get("x-name"), Some("caf\u{e9}"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn malformed_versions_are_bad_requests() {
        for version in ["HTTP/abc", "HTTP/1", "HTTP/1.x", "HTTP/.1", "HTTP/1.1.1"] {
            match read(&format!("GET / {}\r\n\r\n", version)) {
                Incoming::Rejected { status, message } => {
                    assert_eq!(status, Status::BAD_REQUEST, "{}", version);
                    assert!(message.starts_with("Bad request version"), "{}", message);
                }
                other => panic!("{} gave {:?}", version, other),
            }
        }
    }

    #[test]
    fn http2_and_later_are_not_supported() {
        match read("GET / HTTP/2.0\r\n\r\n") {
            Incoming::Rejected { status, message } => {
                assert_eq!(status, Status::HTTP_VERSION_NOT_SUPPORTED);
                assert_eq!(message, "Invalid HTTP version (2.0)");
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(matches!(read("GET / HTTP/1.0\r\n\r\n"), Incoming::Request(_)));
    }

    #[test]
    fn head_without_blank_line_still_parses() {
        match read("HEAD /index.html HTTP/1.0\r\n") {
            Incoming::Request(r) => assert_eq!(r.method, "HEAD"),
            other => panic!("unexpected {:?}", other),
        }
    }
}
