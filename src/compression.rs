use crate::file_serving::path_utils::{guess_mime, ResolvedPath};

pub const GZIP_SUFFIX: &str = ".gz";

/// A gzip payload served byte-for-byte with a forced or inferred type.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum PrecompressedAsset {
    JavaScript,
    Wasm,
    Inferred,
}

impl PrecompressedAsset {
    /// First match wins: `.js.gz`, then `.wasm.gz`, then any other `.gz`.
    pub fn classify(resolved: &ResolvedPath) -> Option<Self> {
        if resolved.ends_with(".js.gz") {
            Some(PrecompressedAsset::JavaScript)
        } else if resolved.ends_with(".wasm.gz") {
            Some(PrecompressedAsset::Wasm)
        } else if resolved.ends_with(GZIP_SUFFIX) {
            Some(PrecompressedAsset::Inferred)
        } else {
            None
        }
    }

    pub fn content_type(&self, resolved: &ResolvedPath) -> String {
        match self {
            PrecompressedAsset::JavaScript => "application/javascript".to_string(),
            PrecompressedAsset::Wasm => "application/wasm".to_string(),
            PrecompressedAsset::Inferred => {
                let full = resolved.to_string();
                let stripped = full.strip_suffix(GZIP_SUFFIX).unwrap_or(&full);
                guess_mime(stripped)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file_serving::path_utils::translate_path;
    use std::path::Path;

    fn resolve(target: &str) -> ResolvedPath {
        translate_path(Path::new("/srv"), target)
    }

    #[test]
    fn suffixes_are_checked_in_priority_order() {
        assert_eq!(
            PrecompressedAsset::classify(&resolve("/app.js.gz")),
            Some(PrecompressedAsset::JavaScript)
        );
        assert_eq!(
            PrecompressedAsset::classify(&resolve("/pkg/model.wasm.gz")),
            Some(PrecompressedAsset::Wasm)
        );
        assert_eq!(
            PrecompressedAsset::classify(&resolve("/data.csv.gz")),
            Some(PrecompressedAsset::Inferred)
        );
        assert_eq!(PrecompressedAsset::classify(&resolve("/app.js")), None);
        assert_eq!(PrecompressedAsset::classify(&resolve("/archive.gzip")), None);
    }

    #[test]
    fn query_does_not_hide_the_suffix() {
        assert_eq!(
            PrecompressedAsset::classify(&resolve("/app.js.gz?v=3#top")),
            Some(PrecompressedAsset::JavaScript)
        );
    }

    #[test]
    fn suffix_match_is_case_sensitive() {
        assert_eq!(PrecompressedAsset::classify(&resolve("/APP.JS.GZ")), None);
        assert_eq!(
            PrecompressedAsset::classify(&resolve("/app.JS.gz")),
            Some(PrecompressedAsset::Inferred)
        );
    }

    #[test]
    fn trailing_slash_never_matches() {
        assert_eq!(PrecompressedAsset::classify(&resolve("/app.js.gz/")), None);
    }

    #[test]
    fn content_types() {
        let js = resolve("/app.js.gz");
        assert_eq!(
            PrecompressedAsset::JavaScript.content_type(&js),
            "application/javascript"
        );
        let wasm = resolve("/model.wasm.gz");
        assert_eq!(PrecompressedAsset::Wasm.content_type(&wasm), "application/wasm");
        let csv = resolve("/data.csv.gz");
        assert_eq!(PrecompressedAsset::Inferred.content_type(&csv), "text/csv");
        let json = resolve("/foo.json.gz");
        assert_eq!(
            PrecompressedAsset::Inferred.content_type(&json),
            guess_mime("/srv/foo.json")
        );
        let bare = resolve("/blob.gz");
        assert_eq!(
            PrecompressedAsset::Inferred.content_type(&bare),
            "application/octet-stream"
        );
    }
}
