use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::path_utils::translate_path;
use super::static_files::StaticHandler;
use crate::compression::PrecompressedAsset;
use crate::logging::LoggingExt;
use crate::request::Request;
use crate::response::{Response, Status};

/// A response together with the path the gzip encoding hook inspects.
#[derive(Debug)]
pub struct Served {
    pub response: Response,
    pub hook_path: String,
}

/// Serves `*.gz` files verbatim with browser-friendly headers and hands
/// everything else to the [`StaticHandler`].
#[derive(Debug, Clone)]
pub struct GzipHandler {
    fallback: StaticHandler,
}

impl GzipHandler {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            fallback: StaticHandler::new(root),
        }
    }

    pub fn root(&self) -> &Path {
        self.fallback.root()
    }

    pub fn handle(&self, request: &Request) -> io::Result<Served> {
        match request.method.as_str() {
            "GET" => self.get(request),
            "HEAD" => Ok(Served {
                response: self.fallback.serve(request)?,
                hook_path: request.target.clone(),
            }),
            method => {
                log::debug!("Rejecting method {}", method);
                Ok(Served {
                    response: Response::error(
                        Status::NOT_IMPLEMENTED,
                        &format!("Unsupported method ('{}')", method),
                    ),
                    hook_path: request.target.clone(),
                })
            }
        }
    }

    /// The `.gz` branches read the whole file before anything is written, so
    /// a missing or unreadable file surfaces as `Err` with no response.
    pub fn get(&self, request: &Request) -> io::Result<Served> {
        let resolved = translate_path(self.root(), &request.target);

        let asset = match PrecompressedAsset::classify(&resolved) {
            Some(asset) => asset,
            None => {
                log::trace!("Delegating {} to the static handler", request.target);
                return Ok(Served {
                    response: self.fallback.serve(request)?,
                    hook_path: request.target.clone(),
                });
            }
        };

        let path = resolved.as_path();
        let content = path.log_operation("read", || fs::read(path))?;
        let content_type = asset.content_type(&resolved);
        log::debug!(
            "Serving {:?} asset {} as {} ({} bytes)",
            asset,
            path.display(),
            content_type,
            content.len()
        );

        let response = Response::new(Status::OK)
            .header("Content-Type", content_type)
            .header("Content-Length", content.len().to_string())
            .body(content);

        Ok(Served {
            response,
            hook_path: resolved.to_string(),
        })
    }
}
