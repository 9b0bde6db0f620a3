//! Syntactic sniffing of payload encodings.

/// Number of leading bytes inspected by [`detect_format`].
pub const DETECT_WINDOW: usize = 1024;

/// Largest field number protobuf allows (29 bits).
const MAX_FIELD_NUMBER: u64 = (1 << 29) - 1;

/// Encoding of an OTLP payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadFormat {
    /// Canonical OTLP JSON, one document or JSON Lines.
    Json,
    /// Binary protobuf, one serialized export request.
    Protobuf,
    /// Neither encoding matched.
    Unknown,
}

impl PayloadFormat {
    /// Map an HTTP Content-Type to a format hint; `None` when the type says nothing useful.
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        let ct = content_type.to_ascii_lowercase();
        if ct.contains("application/x-ndjson")
            || ct.contains("application/jsonl")
            || ct.contains("application/json")
        {
            Some(Self::Json)
        } else if ct.contains("application/x-protobuf") || ct.contains("application/protobuf") {
            Some(Self::Protobuf)
        } else {
            None
        }
    }

    /// Map a file extension (without the dot) to a format hint.
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "json" | "jsonl" | "ndjson" => Some(Self::Json),
            "pb" | "proto" | "binpb" | "protobuf" => Some(Self::Protobuf),
            _ => None,
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "JSON",
            Self::Protobuf => "PROTOBUF",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl std::fmt::Display for PayloadFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a payload by its leading bytes.
///
/// JSON when the first non-whitespace byte is `{`. Protobuf when the window parses as a
/// sequence of well-formed field tags whose bodies stay inside the payload. This does
/// not check the bytes against any OTLP message layout.
///
/// `0x0a` is both `\n` and the tag of field 1, so a payload starting `0a 7b` may be
/// either; it is reported as JSON and [`sniff`] also names protobuf as the fallback.
pub fn detect_format(payload: &[u8]) -> PayloadFormat {
    sniff(payload).0
}

/// The format to try first and, when the bytes fit both encodings, the other one.
pub(crate) fn sniff(payload: &[u8]) -> (PayloadFormat, Option<PayloadFormat>) {
    if payload.first() == Some(&b'{') {
        return (PayloadFormat::Json, None);
    }
    let first = payload.iter().copied().find(|b| !b.is_ascii_whitespace());
    match first {
        None => (PayloadFormat::Unknown, None),
        Some(b'{') if looks_like_protobuf(payload) => {
            (PayloadFormat::Json, Some(PayloadFormat::Protobuf))
        }
        Some(b'{') => (PayloadFormat::Json, None),
        Some(_) if looks_like_protobuf(payload) => (PayloadFormat::Protobuf, None),
        Some(_) => (PayloadFormat::Unknown, None),
    }
}

fn looks_like_protobuf(payload: &[u8]) -> bool {
    let window = payload.len().min(DETECT_WINDOW);
    let mut pos = 0usize;
    let mut fields = 0usize;

    while pos < window {
        let Some((tag, next)) = read_varint(payload, pos) else {
            return false;
        };
        let field_number = tag >> 3;
        if field_number == 0 || field_number > MAX_FIELD_NUMBER {
            return false;
        }
        pos = next;

        let body_end = match tag & 0x7 {
            0 => match read_varint(payload, pos) {
                Some((_, next)) => next,
                None => return false,
            },
            1 => pos.saturating_add(8),
            2 => match read_varint(payload, pos) {
                Some((len, next)) => match usize::try_from(len) {
                    Ok(len) => next.saturating_add(len),
                    Err(_) => return false,
                },
                None => return false,
            },
            5 => pos.saturating_add(4),
            _ => return false,
        };

        if body_end > payload.len() {
            return false;
        }
        pos = body_end;
        fields += 1;
    }

    fields > 0
}

/// Decode a base-128 varint starting at `pos`; `None` on truncation or overlong encoding.
fn read_varint(bytes: &[u8], mut pos: usize) -> Option<(u64, usize)> {
    let mut value = 0u64;
    for shift in 0..10 {
        let byte = *bytes.get(pos)?;
        pos += 1;
        value |= u64::from(byte & 0x7f) << (7 * shift);
        if byte & 0x80 == 0 {
            return Some((value, pos));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_object_with_leading_whitespace() {
        assert_eq!(detect_format(b"  \n\t{\"resourceSpans\":[]}"), PayloadFormat::Json);
    }

    #[test]
    fn newline_brace_that_walks_as_protobuf_keeps_a_fallback() {
        // field 1, length 123 (`\n{`), then a body of 123 bytes
        let mut payload = vec![0x0a, b'{'];
        payload.extend(std::iter::repeat(0u8).take(123));
        assert_eq!(detect_format(&payload), PayloadFormat::Json);
        assert_eq!(
            sniff(&payload),
            (PayloadFormat::Json, Some(PayloadFormat::Protobuf))
        );

        assert_eq!(sniff(b"{\"resourceLogs\":[]}"), (PayloadFormat::Json, None));
        assert_eq!(sniff(b"\n{\"resourceLogs\":[]}"), (PayloadFormat::Json, None));
    }

    #[test]
    fn json_array_is_not_a_document() {
        assert_eq!(detect_format(b"[1,2,3]"), PayloadFormat::Unknown);
    }

    #[test]
    fn empty_and_blank_payloads_are_unknown() {
        assert_eq!(detect_format(b""), PayloadFormat::Unknown);
        assert_eq!(detect_format(b" \r\n "), PayloadFormat::Unknown);
    }

    #[test]
    fn length_delimited_field_is_protobuf() {
        // field 1, wire type 2, length 3
        assert_eq!(detect_format(&[0x0a, 0x03, 1, 2, 3]), PayloadFormat::Protobuf);
    }

    #[test]
    fn mixed_wire_types_are_protobuf() {
        let payload = [
            0x08, 0x96, 0x01, // field 1 varint 150
            0x11, 0, 0, 0, 0, 0, 0, 0, 0, // field 2 fixed64
            0x1d, 0, 0, 0, 0, // field 3 fixed32
        ];
        assert_eq!(detect_format(&payload), PayloadFormat::Protobuf);
    }

    #[test]
    fn body_running_past_payload_is_rejected() {
        assert_eq!(detect_format(&[0x0a, 0x10, 1, 2]), PayloadFormat::Unknown);
    }

    #[test]
    fn group_wire_types_and_field_zero_are_rejected() {
        assert_eq!(detect_format(&[0x0b, 0x0c]), PayloadFormat::Unknown);
        assert_eq!(detect_format(&[0x02, 0x00]), PayloadFormat::Unknown);
    }

    #[test]
    fn plain_text_is_unknown() {
        assert_eq!(detect_format(b"hello world"), PayloadFormat::Unknown);
    }

    #[test]
    fn large_field_crossing_window_is_accepted() {
        let mut payload = vec![0x0a, 0x88, 0x10]; // field 1, length 2056
        payload.extend(std::iter::repeat(0u8).take(2056));
        assert_eq!(detect_format(&payload), PayloadFormat::Protobuf);
    }

    #[test]
    fn hints_from_content_type_and_extension() {
        assert_eq!(
            PayloadFormat::from_content_type("application/x-protobuf"),
            Some(PayloadFormat::Protobuf)
        );
        assert_eq!(
            PayloadFormat::from_content_type("application/json; charset=utf-8"),
            Some(PayloadFormat::Json)
        );
        assert_eq!(PayloadFormat::from_content_type("text/plain"), None);
        assert_eq!(PayloadFormat::from_extension("JSONL"), Some(PayloadFormat::Json));
        assert_eq!(PayloadFormat::from_extension("pb"), Some(PayloadFormat::Protobuf));
        assert_eq!(PayloadFormat::from_extension("txt"), None);
    }
}
