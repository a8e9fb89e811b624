/// Resolves an `@import` href against the location of the importing sheet.
///
/// Absolute paths and URLs are returned unchanged. Without a base the href
/// is only normalised.
pub fn resolve_location(href: &str, base: Option<&str>) -> String {
    if href.starts_with('/') || href.contains("://") {
        return href.to_string();
    }

    match base {
        Some(base) => match base.rsplit_once('/') {
            Some((dir, _)) if dir.is_empty() => normalize_location(&format!("/{}", href)),
            Some((dir, _)) => normalize_location(&format!("{}/{}", dir, href)),
            None => normalize_location(href),
        },
        None => normalize_location(href),
    }
}

/// Collapses `.` and `..` segments and duplicate slashes.
///
/// Leading `..` segments of a relative location are kept; an absolute
/// location cannot climb above `/`.
pub fn normalize_location(location: &str) -> String {
    let absolute = location.starts_with('/');
    let mut parts: Vec<&str> = Vec::new();
    for part in location.split('/') {
        match part {
            "" | "." => {}
            ".." => match parts.last() {
                Some(&last) if last != ".." => {
                    parts.pop();
                }
                _ if absolute => {}
                _ => parts.push(".."),
            },
            _ => parts.push(part),
        }
    }
    if absolute {
        format!("/{}", parts.join("/"))
    } else {
        parts.join("/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_absolute() {
        assert_eq!(resolve_location("/styles/a.css", Some("b.css")), "/styles/a.css");
        assert_eq!(
            resolve_location("http://example.com/a.css", None),
            "http://example.com/a.css"
        );
    }

    #[test]
    fn test_resolve_relative() {
        assert_eq!(
            resolve_location("utils.css", Some("/styles/main.css")),
            "/styles/utils.css"
        );
        assert_eq!(
            resolve_location("../common/base.css", Some("/styles/main.css")),
            "/common/base.css"
        );
        assert_eq!(
            resolve_location("lib/table.css", Some("styles/main.css")),
            "styles/lib/table.css"
        );
        assert_eq!(resolve_location("b.css", Some("a.css")), "b.css");
        assert_eq!(resolve_location("b.css", Some("/a.css")), "/b.css");
    }

    #[test]
    fn test_resolve_without_base() {
        assert_eq!(resolve_location("./a.css", None), "a.css");
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize_location("/a/b/../c"), "/a/c");
        assert_eq!(normalize_location("/a/./b//c"), "/a/b/c");
        assert_eq!(normalize_location("a/b/../c"), "a/c");
        assert_eq!(normalize_location("../a/../../b"), "../../b");
        assert_eq!(normalize_location("/../a"), "/a");
    }
}
