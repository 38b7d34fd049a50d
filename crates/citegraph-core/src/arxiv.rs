use once_cell::sync::Lazy;
use regex::Regex;

static PDF_URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^https?://arxiv\.org/pdf/(\d{4}\.\d+)(v\d+)?(\.pdf)?$").unwrap());

static ID_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{4}\.\d+(v\d+)?$").unwrap());

/// Check whether a URL has the canonical arXiv PDF shape
/// (`https://arxiv.org/pdf/YYMM.NNNNN[vK][.pdf]`).
pub fn is_pdf_url(url: &str) -> bool {
    PDF_URL_RE.is_match(url)
}

/// Extract the arXiv identifier (keeping any version suffix) from a PDF URL.
///
/// Returns `None` when the URL does not match; never panics.
pub fn id_from_url(url: &str) -> Option<String> {
    let caps = PDF_URL_RE.captures(url)?;
    let mut id = caps.get(1)?.as_str().to_string();
    if let Some(version) = caps.get(2) {
        id.push_str(version.as_str());
    }
    Some(id)
}

/// Validate a bare identifier string (`YYMM.NNNNN` with optional `vK`).
pub fn is_valid_id(id: &str) -> bool {
    ID_RE.is_match(id)
}

/// Canonical PDF URL for an identifier.
pub fn pdf_url_for_id(id: &str) -> String {
    format!("https://arxiv.org/pdf/{id}.pdf")
}

/// Append the `.pdf` extension when missing.
pub fn ensure_pdf_suffix(url: &str) -> String {
    if url.ends_with(".pdf") {
        url.to_string()
    } else {
        format!("{url}.pdf")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_pdf_url_basic() {
        assert!(is_pdf_url("https://arxiv.org/pdf/2106.14835.pdf"));
        assert!(is_pdf_url("http://arxiv.org/pdf/2106.14835"));
    }

    #[test]
    fn test_is_pdf_url_with_version() {
        assert!(is_pdf_url("https://arxiv.org/pdf/2106.14835v2.pdf"));
        assert!(is_pdf_url("https://arxiv.org/pdf/2106.14835v2"));
    }

    #[test]
    fn test_is_pdf_url_rejects_abs_page() {
        assert!(!is_pdf_url("https://arxiv.org/abs/2106.14835"));
    }

    #[test]
    fn test_is_pdf_url_rejects_other_hosts() {
        assert!(!is_pdf_url("https://example.com/pdf/2106.14835.pdf"));
    }

    #[test]
    fn test_id_from_url_basic() {
        assert_eq!(
            id_from_url("https://arxiv.org/pdf/2106.14835.pdf"),
            Some("2106.14835".into())
        );
    }

    #[test]
    fn test_id_from_url_keeps_version() {
        assert_eq!(
            id_from_url("https://arxiv.org/pdf/2106.14835v2.pdf"),
            Some("2106.14835v2".into())
        );
    }

    #[test]
    fn test_id_from_url_without_extension() {
        assert_eq!(
            id_from_url("https://arxiv.org/pdf/2106.14835"),
            Some("2106.14835".into())
        );
    }

    #[test]
    fn test_id_from_url_none_on_mismatch() {
        assert_eq!(id_from_url("https://arxiv.org/abs/2106.14835"), None);
        assert_eq!(id_from_url("not a url"), None);
        assert_eq!(id_from_url(""), None);
    }

    #[test]
    fn test_is_valid_id() {
        assert!(is_valid_id("2106.14835"));
        assert!(is_valid_id("2106.14835v3"));
        assert!(!is_valid_id("abc123"));
        assert!(!is_valid_id("2106"));
        assert!(!is_valid_id(""));
    }

    #[test]
    fn test_pdf_url_for_id() {
        assert_eq!(
            pdf_url_for_id("1706.03762"),
            "https://arxiv.org/pdf/1706.03762.pdf"
        );
    }

    #[test]
    fn test_ensure_pdf_suffix() {
        assert_eq!(
            ensure_pdf_suffix("https://arxiv.org/pdf/2106.14835"),
            "https://arxiv.org/pdf/2106.14835.pdf"
        );
        assert_eq!(
            ensure_pdf_suffix("https://arxiv.org/pdf/2106.14835.pdf"),
            "https://arxiv.org/pdf/2106.14835.pdf"
        );
    }
}
