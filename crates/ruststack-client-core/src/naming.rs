//! Object name generation and content-type extension mapping.

use uuid::Uuid;

/// Maps a content type to a file extension (without the leading dot).
pub trait MimeTypeMap: Send + Sync {
    /// Extension for `content_type`, if one is known.
    fn extension_for(&self, content_type: &str) -> Option<String>;
}

/// Extensions preferred over the first `mime_guess` candidate.
const PREFERRED_EXTENSIONS: &[(&str, &str)] = &[
    ("application/octet-stream", "bin"),
    ("application/json", "json"),
    ("application/pdf", "pdf"),
    ("application/xml", "xml"),
    ("application/zip", "zip"),
    ("application/gzip", "gz"),
    ("image/jpeg", "jpg"),
    ("image/png", "png"),
    ("image/gif", "gif"),
    ("image/svg+xml", "svg"),
    ("text/plain", "txt"),
    ("text/html", "html"),
    ("text/css", "css"),
    ("text/csv", "csv"),
    ("text/javascript", "js"),
    ("audio/mpeg", "mp3"),
    ("video/mp4", "mp4"),
];

/// [`MimeTypeMap`] backed by a small preferred table and `mime_guess`.
///
/// Parameters such as `; charset=utf-8` are ignored.
///
/// # Examples
///
/// ```
/// use ruststack_client_core::naming::{DefaultMimeTypeMap, MimeTypeMap};
///
/// let map = DefaultMimeTypeMap;
/// assert_eq!(map.extension_for("application/octet-stream").as_deref(), Some("bin"));
/// assert_eq!(map.extension_for("text/plain; charset=utf-8").as_deref(), Some("txt"));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultMimeTypeMap;

impl MimeTypeMap for DefaultMimeTypeMap {
    fn extension_for(&self, content_type: &str) -> Option<String> {
        let parsed = content_type.trim().parse::<mime::Mime>().ok()?;
        let essence = parsed.essence_str();

        if let Some((_, ext)) = PREFERRED_EXTENSIONS
            .iter()
            .find(|(mime_type, _)| *mime_type == essence)
        {
            return Some((*ext).to_owned());
        }

        mime_guess::get_mime_extensions_str(essence)
            .and_then(|exts| exts.first())
            .map(|ext| (*ext).to_owned())
    }
}

/// Generate a fresh, globally unique object name.
#[must_use]
pub fn generate_object_name() -> String {
    Uuid::new_v4().to_string()
}

/// Resolve the name for an uploaded stream.
///
/// Uses `object_name` when given, otherwise a generated one. When `mime_map`
/// is provided and knows `content_type`, `.<ext>` is appended unless the name
/// already ends with it.
#[must_use]
pub fn resolve_object_name(
    object_name: Option<&str>,
    content_type: &str,
    mime_map: Option<&dyn MimeTypeMap>,
) -> String {
    let mut name = match object_name {
        Some(name) if !name.is_empty() => name.to_owned(),
        _ => generate_object_name(),
    };

    if let Some(ext) = mime_map.and_then(|map| map.extension_for(content_type)) {
        let suffix = format!(".{ext}");
        if !name.ends_with(&suffix) {
            name.push_str(&suffix);
        }
    }

    name
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_should_generate_unique_names() {
        let names: HashSet<String> = (0..100).map(|_| generate_object_name()).collect();
        assert_eq!(names.len(), 100);
        assert!(names.iter().all(|n| Uuid::parse_str(n).is_ok()));
    }

    #[test]
    fn test_should_prefer_table_extensions() {
        let map = DefaultMimeTypeMap;
        assert_eq!(map.extension_for("image/jpeg").as_deref(), Some("jpg"));
        assert_eq!(map.extension_for("application/json").as_deref(), Some("json"));
    }

    #[test]
    fn test_should_fall_back_to_mime_guess() {
        let map = DefaultMimeTypeMap;
        assert!(map.extension_for("image/webp").is_some());
    }

    #[test]
    fn test_should_return_none_for_garbage_content_type() {
        let map = DefaultMimeTypeMap;
        assert!(map.extension_for("not a mime type").is_none());
        assert!(map.extension_for("application/x-never-registered-anywhere").is_none());
    }

    #[test]
    fn test_should_generate_name_with_mapped_extension() {
        let map: &dyn MimeTypeMap = &DefaultMimeTypeMap;
        let name = resolve_object_name(None, "application/octet-stream", Some(map));
        let stem = name.strip_suffix(".bin").expect("bin extension");
        assert!(Uuid::parse_str(stem).is_ok());
    }

    #[test]
    fn test_should_keep_given_name_without_mapping() {
        let name = resolve_object_name(Some("report"), "application/pdf", None);
        assert_eq!(name, "report");
    }

    #[test]
    fn test_should_not_duplicate_existing_extension() {
        let map: &dyn MimeTypeMap = &DefaultMimeTypeMap;
        let name = resolve_object_name(Some("report.pdf"), "application/pdf", Some(map));
        assert_eq!(name, "report.pdf");

        let name = resolve_object_name(Some("report"), "application/pdf", Some(map));
        assert_eq!(name, "report.pdf");
    }

    #[test]
    fn test_should_generate_name_for_empty_object_name() {
        let name = resolve_object_name(Some(""), "text/plain", None);
        assert!(Uuid::parse_str(&name).is_ok());
    }
}
