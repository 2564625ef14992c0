//! URL helpers.
//!
//! [URL Standard](https://url.spec.whatwg.org/)
//!
//! NOTE: This is not a conforming URL parser. It covers what the render core
//! needs: turning a typed address into a fetchable URL and resolving
//! `<link href>` values against the document URL.

use thiserror::Error;

/// Schemes the fetch layer knows how to retrieve.
const SUPPORTED_SCHEMES: &[&str] = &["http", "https", "file"];

/// Why an address could not be normalized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UrlError {
    /// Nothing but whitespace was given.
    #[error("empty URL")]
    Empty,
    /// The scheme is not one of `http`, `https` or `file`.
    #[error("unsupported URL scheme '{0}'")]
    UnsupportedScheme(String),
    /// A scheme was present but nothing followed it.
    #[error("URL '{0}' has no host or path")]
    MissingHost(String),
}

/// Whether `href` carries its own scheme.
#[must_use]
pub fn is_absolute(href: &str) -> bool {
    scheme_of(href).is_some() || href.starts_with("data:")
}

/// The scheme of `url` (lowercased), if it has the form `scheme://...`.
fn scheme_of(url: &str) -> Option<String> {
    let (scheme, _) = url.split_once("://")?;
    let valid = !scheme.is_empty()
        && scheme.starts_with(|c: char| c.is_ascii_alphabetic())
        && scheme
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    valid.then(|| scheme.to_ascii_lowercase())
}

/// Turn a typed address into a fetchable URL.
///
/// Surrounding whitespace is trimmed and `https://` is prefixed when no
/// scheme is given, so `example.com` becomes `https://example.com`.
///
/// # Errors
///
/// Returns [`UrlError`] for empty input, a scheme other than
/// `http`/`https`/`file`, or a scheme with nothing after it.
pub fn normalize_url(raw: &str) -> Result<String, UrlError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    let candidate = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    };

    let scheme = scheme_of(&candidate)
        .ok_or_else(|| UrlError::UnsupportedScheme(candidate.clone()))?;
    if !SUPPORTED_SCHEMES.contains(&scheme.as_str()) {
        return Err(UrlError::UnsupportedScheme(scheme));
    }

    let rest = &candidate[scheme.len() + 3..];
    if rest.is_empty() {
        return Err(UrlError::MissingHost(candidate));
    }

    Ok(format!("{scheme}://{rest}"))
}

/// Split an absolute URL into `scheme://host` and its path (query and
/// fragment dropped). The path always starts with `/`.
fn split_origin(base: &str) -> Option<(&str, &str)> {
    let scheme_end = base.find("://")? + 3;
    let after = &base[scheme_end..];
    let path_start = after.find('/').map_or(base.len(), |i| scheme_end + i);
    let origin = &base[..path_start];
    let path = &base[path_start..];
    let path = path
        .split(['?', '#'])
        .next()
        .filter(|p| !p.is_empty())
        .unwrap_or("/");
    Some((origin, path))
}

/// Collapse `.` and `..` segments. `..` never climbs above the root.
fn remove_dot_segments(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    let trailing_slash = path.ends_with('/') || path.ends_with("/.") || path.ends_with("/..");

    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                let _ = segments.pop();
            }
            other => segments.push(other),
        }
    }

    let mut out = format!("/{}", segments.join("/"));
    if trailing_slash && !segments.is_empty() {
        out.push('/');
    }
    out
}

/// [§ 2.4 URLs](https://html.spec.whatwg.org/multipage/urls-and-fetching.html#resolving-urls)
///
/// Resolve a possibly relative `href` against `base`.
///
/// - absolute URLs are returned unchanged
/// - `//host/path` takes the scheme of `base`
/// - `/path` is joined to the origin of `base`
/// - `?query` and `#fragment` replace those parts of `base`
/// - anything else is joined to the directory of `base`
///
/// Without a usable base the href is returned as given.
#[must_use]
pub fn resolve_url(href: &str, base: Option<&str>) -> String {
    let href = href.trim();
    if is_absolute(href) {
        return href.to_string();
    }

    let Some(base) = base else {
        return href.to_string();
    };
    let Some((origin, base_path)) = split_origin(base) else {
        return href.to_string();
    };

    if href.is_empty() {
        return base.to_string();
    }

    if let Some(rest) = href.strip_prefix("//") {
        let scheme = scheme_of(base).unwrap_or_else(|| "https".to_string());
        return format!("{scheme}://{rest}");
    }

    if href.starts_with('#') || href.starts_with('?') {
        let cut = if href.starts_with('#') {
            base.find('#')
        } else {
            base.find(['?', '#'])
        };
        return format!("{}{href}", &base[..cut.unwrap_or(base.len())]);
    }

    let (path, suffix) = match href.find(['?', '#']) {
        Some(i) => (&href[..i], &href[i..]),
        None => (href, ""),
    };

    let joined = if path.starts_with('/') {
        path.to_string()
    } else {
        let dir = base_path.rsplit_once('/').map_or("", |(dir, _)| dir);
        format!("{dir}/{path}")
    };

    format!("{origin}{}{suffix}", remove_dot_segments(&joined))
}
