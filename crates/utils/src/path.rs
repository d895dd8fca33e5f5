use crate::UtilsError;

pub const SEPARATOR: char = '/';

/// Normalizes a storage key: `\` becomes `/`, empty segments and surrounding separators are dropped
pub fn normalize_key(key: &str) -> String {
    key.replace('\\', "/")
        .split(SEPARATOR)
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

pub fn join_key(base: &str, child: &str) -> String {
    let base = normalize_key(base);
    let child = normalize_key(child);

    match (base.is_empty(), child.is_empty()) {
        (true, _) => child,
        (_, true) => base,
        _ => format!("{}/{}", base, child),
    }
}

/// Parent key of a normalized key, `None` at the top of the namespace
pub fn parent_key(key: &str) -> Option<&str> {
    key.trim_end_matches(SEPARATOR)
        .rsplit_once(SEPARATOR)
        .map(|(parent, _)| parent)
}

pub fn key_name(key: &str) -> &str {
    let trimmed = key.trim_end_matches(SEPARATOR);
    match trimmed.rsplit_once(SEPARATOR) {
        Some((_, name)) => name,
        None => trimmed,
    }
}

/// Splits a file name into stem and extension (extension keeps its dot).
/// Dot-files such as `.env` have no extension.
pub fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(0) | None => (name, ""),
        Some(idx) => name.split_at(idx),
    }
}

/// `archive.tar.gz` -> `archive`
pub fn strip_all_extensions(name: &str) -> &str {
    let mut stem = name;
    loop {
        let (next, ext) = split_extension(stem);
        if ext.is_empty() {
            return stem;
        }
        stem = next;
    }
}

/// Key of the zero-byte object that materializes a directory
pub fn marker_key(dir_key: &str) -> String {
    let key = normalize_key(dir_key);
    if key.is_empty() {
        key
    } else {
        format!("{}/", key)
    }
}

pub fn is_marker(key: &str) -> bool {
    key.ends_with(SEPARATOR)
}

/// True when `key` is `base` itself or lies beneath it
pub fn is_within(base: &str, key: &str) -> bool {
    if base.is_empty() {
        return true;
    }
    key == base
        || (key.starts_with(base) && key[base.len()..].starts_with(SEPARATOR))
}

/// Resolves a client supplied relative path beneath `base`, rejecting `..` that climbs out of it
pub fn resolve_relative(base: &str, relative: &str) -> Result<String, UtilsError> {
    let mut segments: Vec<&str> = Vec::new();

    for segment in relative.split(['/', '\\']) {
        match segment {
            "" | "." => {}
            ".." => {
                if segments.pop().is_none() {
                    return Err(UtilsError::PathTraversal(relative.to_string()));
                }
            }
            s if s.contains('\0') => {
                return Err(UtilsError::PathError("Path contains null byte".to_string()));
            }
            s => segments.push(s),
        }
    }

    Ok(join_key(base, &segments.join("/")))
}

/// Key relative to `base` with a leading separator, `/` for the base itself
pub fn relative_to(base: &str, key: &str) -> Option<String> {
    if !is_within(base, key) {
        return None;
    }
    let rest = key[base.len()..].trim_start_matches(SEPARATOR);
    Some(format!("/{}", rest))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_and_normalize() {
        assert_eq!(join_key("Files", "docs/a.txt"), "Files/docs/a.txt");
        assert_eq!(join_key("Files/", "/docs//a.txt"), "Files/docs/a.txt");
        assert_eq!(join_key("", "a"), "a");
        assert_eq!(join_key("Files", ""), "Files");
        assert_eq!(normalize_key("\\Files\\x\\"), "Files/x");
    }

    #[test]
    fn test_parent_and_name() {
        assert_eq!(parent_key("Files/docs/a.txt"), Some("Files/docs"));
        assert_eq!(parent_key("Files/docs/"), Some("Files"));
        assert_eq!(parent_key("Files"), None);
        assert_eq!(key_name("Files/docs/"), "docs");
        assert_eq!(key_name("Files/docs/a.txt"), "a.txt");
    }

    #[test]
    fn test_extensions() {
        assert_eq!(split_extension("a.txt"), ("a", ".txt"));
        assert_eq!(split_extension("archive.tar.gz"), ("archive.tar", ".gz"));
        assert_eq!(split_extension(".env"), (".env", ""));
        assert_eq!(split_extension("README"), ("README", ""));
        assert_eq!(strip_all_extensions("photos.2020.zip"), "photos");
    }

    #[test]
    fn test_within_and_relative() {
        assert!(is_within("Files", "Files"));
        assert!(is_within("Files", "Files/a"));
        assert!(!is_within("Files", "FilesOther/a"));
        assert_eq!(relative_to("Files", "Files/a/b").as_deref(), Some("/a/b"));
        assert_eq!(relative_to("Files", "Files").as_deref(), Some("/"));
        assert_eq!(relative_to("Files", "Other"), None);
    }

    #[test]
    fn test_resolve_relative_rejects_traversal() {
        assert_eq!(resolve_relative("Files", "/a/./b/../c").unwrap(), "Files/a/c");
        assert!(matches!(
            resolve_relative("Files", "/../secret"),
            Err(UtilsError::PathTraversal(_))
        ));
    }

    #[test]
    fn test_marker_key() {
        assert_eq!(marker_key("Files/docs"), "Files/docs/");
        assert_eq!(marker_key("Files/docs/"), "Files/docs/");
        assert!(is_marker("Files/docs/"));
        assert!(!is_marker("Files/docs"));
    }
}
