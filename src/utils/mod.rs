use percent_encoding::percent_decode_str;
use regex::Regex;
use url::Url;

pub const FALLBACK_FILENAME: &str = "download";

/// Sanitize filename to remove invalid characters
pub fn sanitize_filename(filename: &str) -> String {
    filename
        .chars()
        .map(|c| match c {
            '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' => '_',
            c if c.is_control() => '_',
            _ => c,
        })
        .collect::<String>()
        .trim()
        .trim_matches('.')
        .to_string()
}

/// Picks the name a downloaded blob is saved under.
///
/// Precedence: explicit name, then `Content-Disposition`, then the last
/// non-empty URL path segment, then [`FALLBACK_FILENAME`].
pub fn resolve_filename(
    explicit: Option<&str>,
    content_disposition: Option<&str>,
    url: &str,
) -> String {
    let candidates = [
        explicit.map(str::to_string),
        content_disposition.and_then(filename_from_content_disposition),
        last_path_segment(url),
    ];

    candidates
        .into_iter()
        .flatten()
        .map(|name| sanitize_filename(&name))
        .find(|name| !name.is_empty())
        .unwrap_or_else(|| FALLBACK_FILENAME.to_string())
}

/// Extracts `filename*` (RFC 5987) or `filename` from a `Content-Disposition`
/// value, percent-decoded. `filename*` wins when both are present.
pub fn filename_from_content_disposition(value: &str) -> Option<String> {
    let extended = Regex::new(r#"(?i)filename\*\s*=\s*"?([^";]+)"?"#).ok()?;
    if let Some(caps) = extended.captures(value) {
        let raw = caps[1].trim();
        // charset'language'encoded-value
        let encoded = raw.splitn(3, '\'').nth(2).unwrap_or(raw);
        if let Some(name) = decode(encoded) {
            return Some(name);
        }
    }

    let plain = Regex::new(r#"(?i)filename\s*=\s*(?:"([^"]*)"|([^;]+))"#).ok()?;
    let caps = plain.captures(value)?;
    let raw = caps.get(1).or_else(|| caps.get(2))?.as_str();
    decode(raw.trim())
}

/// Last non-empty path segment of `url`, percent-decoded.
pub fn last_path_segment(url: &str) -> Option<String> {
    let url = Url::parse(url).ok()?;
    let segment = url.path_segments()?.filter(|s| !s.is_empty()).last()?;
    decode(segment)
}

fn decode(value: &str) -> Option<String> {
    let decoded = percent_decode_str(value).decode_utf8().ok()?;
    let decoded = decoded.trim();
    (!decoded.is_empty()).then(|| decoded.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("laporan/proker.pdf"), "laporan_proker.pdf");
        assert_eq!(sanitize_filename("rekap-absensi.pdf"), "rekap-absensi.pdf");
        assert_eq!(sanitize_filename("../secret"), "_secret");
        assert_eq!(sanitize_filename("  .  "), "");
    }

    #[test]
    fn test_explicit_filename_wins() {
        let name = resolve_filename(
            Some("laporan.pdf"),
            Some("attachment; filename=\"server.pdf\""),
            "http://localhost/export-pdf/42",
        );
        assert_eq!(name, "laporan.pdf");

        let blank = resolve_filename(
            Some("  "),
            Some("attachment; filename=\"server.pdf\""),
            "http://localhost/export-pdf/42",
        );
        assert_eq!(blank, "server.pdf");
    }

    #[test]
    fn test_extended_filename_is_decoded() {
        let name = resolve_filename(
            None,
            Some("attachment; filename*=UTF-8''rapat%20Q1.pdf"),
            "http://localhost/export-pdf/42",
        );
        assert_eq!(name, "rapat Q1.pdf");
    }

    #[test]
    fn test_extended_filename_preferred_over_plain() {
        let value = "attachment; filename=\"fallback.pdf\"; filename*=UTF-8''absensi%20mei.pdf";
        assert_eq!(
            filename_from_content_disposition(value).as_deref(),
            Some("absensi mei.pdf")
        );
    }

    #[test]
    fn test_plain_filename_quoted_and_bare() {
        assert_eq!(
            filename_from_content_disposition("attachment; filename=\"anggota 2024.xlsx\"")
                .as_deref(),
            Some("anggota 2024.xlsx")
        );
        assert_eq!(
            filename_from_content_disposition("attachment; filename=proker.pdf; size=10")
                .as_deref(),
            Some("proker.pdf")
        );
        assert_eq!(filename_from_content_disposition("inline"), None);
    }

    #[test]
    fn test_falls_back_to_url_segment() {
        assert_eq!(
            resolve_filename(None, None, "http://localhost/export-pdf/42"),
            "42"
        );
        assert_eq!(
            resolve_filename(None, Some("inline"), "http://localhost/files/rekap%20absensi.pdf/"),
            "rekap absensi.pdf"
        );
    }

    #[test]
    fn test_bare_url_uses_fallback() {
        assert_eq!(resolve_filename(None, None, "http://localhost"), "download");
        assert_eq!(resolve_filename(None, None, "http://localhost/"), "download");
        assert_eq!(resolve_filename(None, None, "not a url"), "download");
    }

    #[test]
    fn test_header_path_is_flattened() {
        assert_eq!(
            resolve_filename(None, Some("attachment; filename=\"../../etc/passwd\""), "http://x/"),
            "_.._etc_passwd"
        );
    }
}
