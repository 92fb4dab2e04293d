use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::fs;
use std::io;
use std::path::Path;

use super::path_utils::url_path;
use crate::response::{html_escape, Response, Status};

/// Characters left alone when building link targets.
const LINK: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'/')
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

struct Entry {
    link: String,
    display: String,
}

fn read_entries(dir: &Path) -> io::Result<Vec<Entry>> {
    let mut names: Vec<String> = fs::read_dir(dir)?
        .map(|entry| entry.map(|e| e.file_name().to_string_lossy().into_owned()))
        .collect::<io::Result<_>>()?;
    names.sort_by_key(|name| name.to_lowercase());

    Ok(names
        .into_iter()
        .map(|name| {
            let full = dir.join(&name);
            let mut link = name.clone();
            let mut display = name.clone();
            if full.is_dir() {
                link.push('/');
                display.push('/');
            }
            if full.symlink_metadata().map(|m| m.file_type().is_symlink()).unwrap_or(false) {
                display = format!("{}@", name);
            }
            Entry { link, display }
        })
        .collect())
}

/// Renders an HTML index of `dir`, or a 404 when it cannot be read.
pub fn list_directory(dir: &Path, target: &str) -> Response {
    let entries = match read_entries(dir) {
        Ok(entries) => entries,
        Err(e) => {
            log::warn!("Cannot list {}: {}", dir.display(), e);
            return Response::error(Status::NOT_FOUND, "No permission to list directory");
        }
    };

    let display_path = html_escape(&percent_decode_str(url_path(target)).decode_utf8_lossy());
    let title = format!("Directory listing for {}", display_path);

    let mut html = String::new();
    html.push_str("<!DOCTYPE HTML>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str(&format!("<title>{}</title>\n</head>\n<body>\n", title));
    html.push_str(&format!("<h1>{}</h1>\n<hr>\n<ul>\n", title));
    for entry in &entries {
        html.push_str(&format!(
            "<li><a href=\"{}\">{}</a></li>\n",
            utf8_percent_encode(&entry.link, LINK),
            html_escape(&entry.display)
        ));
    }
    html.push_str("</ul>\n<hr>\n</body>\n</html>\n");

    let body = html.into_bytes();
    Response::new(Status::OK)
        .header("Content-Type", "text/html; charset=utf-8")
        .header("Content-Length", body.len().to_string())
        .body(body)
}
