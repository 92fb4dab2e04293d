use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::listing::list_directory;
use super::path_utils::{guess_mime, translate_path, url_path, ResolvedPath};
use crate::logging::LoggingExt;
use crate::request::Request;
use crate::response::{http_date, Response, Status};

pub const INDEX_FILES: [&str; 2] = ["index.html", "index.htm"];

/// Generic file serving: files, index pages, directory listings and 404s.
#[derive(Debug, Clone)]
pub struct StaticHandler {
    root: PathBuf,
}

impl StaticHandler {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Answers a GET or HEAD. HEAD gets the GET headers and no body.
    pub fn serve(&self, request: &Request) -> io::Result<Response> {
        let resolved = translate_path(&self.root, &request.target);
        let mut response = self.respond(&request.target, &resolved)?;
        if request.method == "HEAD" {
            response.body.clear();
        }
        Ok(response)
    }

    fn respond(&self, target: &str, resolved: &ResolvedPath) -> io::Result<Response> {
        let path = resolved.as_path();

        if path.is_dir() {
            if !url_path(target).ends_with('/') {
                return Ok(redirect_to_directory(target));
            }
            return match INDEX_FILES
                .iter()
                .map(|index| path.join(index))
                .find(|candidate| candidate.is_file())
            {
                Some(index) => self.file(&index),
                None => Ok(list_directory(path, target)),
            };
        }

        if resolved.has_trailing_slash() {
            log::debug!("Trailing slash on non-directory {}", path.display());
            return Ok(Response::error(Status::NOT_FOUND, "File not found"));
        }

        self.file(path)
    }

    fn file(&self, path: &Path) -> io::Result<Response> {
        let content = match path.log_operation("read", || fs::read(path)) {
            Ok(content) => content,
            Err(_) => return Ok(Response::error(Status::NOT_FOUND, "File not found")),
        };

        let mut response = Response::new(Status::OK)
            .header("Content-Type", guess_mime(path))
            .header("Content-Length", content.len().to_string());
        if let Ok(modified) = fs::metadata(path).and_then(|m| m.modified()) {
            response = response.header("Last-Modified", http_date(modified));
        }
        Ok(response.body(content))
    }
}

/// 301 to the same target with a slash appended to the path part.
fn redirect_to_directory(target: &str) -> Response {
    let split = target.find(|c: char| c == '?' || c == '#').unwrap_or(target.len());
    let location = format!("{}/{}", &target[..split], &target[split..]);
    log::debug!("Redirecting {} to {}", target, location);
    Response::new(Status::MOVED_PERMANENTLY)
        .header("Location", location)
        .header("Content-Length", "0")
}
