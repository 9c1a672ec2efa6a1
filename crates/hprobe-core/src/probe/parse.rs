//! Parse HTTP response header lines into the attributes a probe reports.

/// Attributes of the final response seen in a header stream.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct ResponseHeaders {
    pub status: Option<u32>,
    pub content_type: Option<String>,
    pub cors_origin: Option<String>,
}

/// Parse collected header lines. A new status line (redirect hop, `100
/// Continue`) resets everything seen before it.
pub(crate) fn parse_headers(lines: &[String]) -> ResponseHeaders {
    let mut out = ResponseHeaders::default();

    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Some(status) = parse_status_line(line) {
            out = ResponseHeaders {
                status: Some(status),
                ..ResponseHeaders::default()
            };
            continue;
        }
        if let Some((name, value)) = line.split_once(':') {
            let name = name.trim();
            let value = value.trim();
            if name.eq_ignore_ascii_case("content-type") {
                out.content_type = Some(value.to_string());
            }
            if name.eq_ignore_ascii_case("access-control-allow-origin") {
                out.cors_origin = Some(value.to_string());
            }
        }
    }

    out
}

/// `HTTP/1.1 403 Forbidden` → 403. Also accepts `HTTP/2 200` and the
/// `ICY 200 OK` status line some streaming servers still send.
fn parse_status_line(line: &str) -> Option<u32> {
    let mut parts = line.split_whitespace();
    let proto = parts.next()?;
    if !(proto.starts_with("HTTP/") || proto.eq_ignore_ascii_case("ICY")) {
        return None;
    }
    parts.next()?.parse::<u32>().ok()
}
