//! Content type detection for uploads.

/// Type recorded when nothing believable is known about the bytes.
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Decide the MIME type of an upload from its content.
///
/// Magic bytes win. Formats without a signature (plain text, CSV, JSON) fall
/// back to the filename extension, then to the declared type, but only when
/// that type is textual. A binary type with no matching signature is not
/// believed and becomes [`OCTET_STREAM`].
pub fn detect_content_type(filename: &str, bytes: &[u8], declared: &str) -> String {
    if let Some(kind) = infer::get(bytes) {
        return kind.mime_type().to_string();
    }

    if let Some(guess) = mime_guess::from_path(filename)
        .first_raw()
        .filter(|m| is_textual(m))
    {
        return guess.to_string();
    }

    let declared = essence(declared);
    if is_textual(&declared) {
        declared
    } else {
        OCTET_STREAM.to_string()
    }
}

/// `Text/Plain; charset=utf-8` -> `text/plain`
fn essence(mime: &str) -> String {
    mime.split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

fn is_textual(mime: &str) -> bool {
    mime.starts_with("text/")
        || matches!(
            mime,
            "application/json" | "application/xml" | "application/x-yaml"
        )
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    const PNG: &[u8] = b"\x89PNG\r\n\x1a\n\x00\x00\x00\rIHDR";
    const EXE: &[u8] = b"MZ\x90\x00\x03\x00\x00\x00\x04\x00\x00\x00\xff\xff\x00\x00This program cannot be run in DOS mode";

    #[rstest]
    #[case("photo.png", PNG, "image/png", "image/png")]
    #[case("photo.jpg", PNG, "image/jpeg", "image/png")]
    #[case("report.pdf", &b"%PDF-1.7\n"[..], "application/octet-stream", "application/pdf")]
    #[case("notes.txt", &b"hello"[..], "application/octet-stream", "text/plain")]
    #[case("notes", &b"hello"[..], "Text/Plain; charset=utf-8", "text/plain")]
    #[case("evil.png", &b"not an image"[..], "image/png", OCTET_STREAM)]
    #[case("empty.pdf", &b""[..], "application/pdf", OCTET_STREAM)]
    fn test_detect_content_type(
        #[case] filename: &str,
        #[case] bytes: &[u8],
        #[case] declared: &str,
        #[case] expected: &str,
    ) {
        assert_eq!(detect_content_type(filename, bytes, declared), expected);
    }

    #[test]
    fn test_executable_is_not_an_image() {
        let detected = detect_content_type("evil.png", EXE, "image/png");
        assert_ne!(detected, "image/png");
        assert!(!detected.starts_with("image/"));
    }
}
