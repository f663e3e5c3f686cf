use std::path::Path;

/// Fallback for extensions outside the table
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Detect Content-Type based on file extension
///
/// The extension is matched case-insensitively. Files without an extension,
/// or with one that isn't a static-site asset, get "application/octet-stream".
pub fn detect_content_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase());

    match ext.as_deref() {
        Some("html") => "text/html",
        Some("css") => "text/css",
        Some("js") => "application/javascript",
        Some("json") => "application/json",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        _ => DEFAULT_CONTENT_TYPE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_detect_content_type_known() {
        let cases = [
            ("index.html", "text/html"),
            ("site.css", "text/css"),
            ("app.js", "application/javascript"),
            ("data.json", "application/json"),
            ("photo.jpg", "image/jpeg"),
            ("photo.jpeg", "image/jpeg"),
            ("logo.png", "image/png"),
            ("spinner.gif", "image/gif"),
        ];
        for (name, expected) in cases {
            assert_eq!(detect_content_type(&PathBuf::from(name)), expected, "{}", name);
        }
    }

    #[test]
    fn test_detect_content_type_case_insensitive() {
        assert_eq!(detect_content_type(&PathBuf::from("INDEX.HTML")), "text/html");
        assert_eq!(detect_content_type(&PathBuf::from("Photo.JpEg")), "image/jpeg");
    }

    #[test]
    fn test_detect_content_type_unknown() {
        assert_eq!(
            detect_content_type(&PathBuf::from("file.unknownext")),
            "application/octet-stream"
        );
        assert_eq!(
            detect_content_type(&PathBuf::from("no_extension")),
            "application/octet-stream"
        );
        // Types outside the table fall back even when they have a well-known MIME
        assert_eq!(
            detect_content_type(&PathBuf::from("favicon.svg")),
            "application/octet-stream"
        );
        assert_eq!(
            detect_content_type(&PathBuf::from(".html")),
            "application/octet-stream"
        );
    }
}
