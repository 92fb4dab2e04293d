use mime_guess::from_path;
use percent_encoding::percent_decode_str;
use std::fmt;
use std::path::{Component, Path, PathBuf};

/// A request target mapped onto the document root. The file may not exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath {
    path: PathBuf,
    trailing_slash: bool,
}

impl ResolvedPath {
    pub fn as_path(&self) -> &Path {
        &self.path
    }

    /// Whether the target ended with `/` before decoding.
    pub fn has_trailing_slash(&self) -> bool {
        self.trailing_slash
    }

    pub fn ends_with(&self, suffix: &str) -> bool {
        self.to_string().ends_with(suffix)
    }
}

impl fmt::Display for ResolvedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())?;
        if self.trailing_slash && !self.path.to_string_lossy().ends_with('/') {
            write!(f, "/")?;
        }
        Ok(())
    }
}

/// Strips query and fragment from a request target.
pub fn url_path(target: &str) -> &str {
    let path = target.split('?').next().unwrap_or(target);
    path.split('#').next().unwrap_or(path)
}

/// Maps a request target onto `root`.
///
/// The query and fragment are dropped, the path is percent-decoded and then
/// normalized lexically: empty and `.` segments vanish and `..` removes the
/// previous segment without ever climbing above `root`. No filesystem access.
pub fn translate_path(root: &Path, target: &str) -> ResolvedPath {
    let path = url_path(target);
    let trailing_slash = path.trim_end().ends_with('/');
    let decoded = percent_decode_str(path).decode_utf8_lossy();

    let mut segments: Vec<&str> = Vec::new();
    for segment in decoded.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            word => {
                let mut components = Path::new(word).components();
                match (components.next(), components.next()) {
                    (Some(Component::Normal(_)), None) => segments.push(word),
                    _ => log::debug!("Dropping path segment {:?}", word),
                }
            }
        }
    }

    let mut resolved = root.to_path_buf();
    resolved.extend(segments);
    log::trace!("Translated {} to {}", target, resolved.display());

    ResolvedPath {
        path: resolved,
        trailing_slash,
    }
}

/// MIME type guessed from the file name, `application/octet-stream` when unknown.
pub fn guess_mime<P: AsRef<Path>>(path: P) -> String {
    from_path(path).first_or_octet_stream().to_string()
}
