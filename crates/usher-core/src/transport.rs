// ── Transport decoding ──
//
// Tokens travel inside URL query strings, so `+`, `/` and `=` often arrive
// percent-encoded. Validators accept both encoded and already-decoded input.

use std::borrow::Cow;

use percent_encoding::percent_decode_str;

/// Percent-decode `input` once, falling back to the raw text when it holds a
/// malformed escape or decodes to invalid UTF-8. Surrounding whitespace is
/// trimmed either way.
pub fn decode_transport(input: &str) -> Cow<'_, str> {
    let input = input.trim();
    if has_malformed_escape(input) {
        return Cow::Borrowed(input);
    }
    match percent_decode_str(input).decode_utf8() {
        Ok(Cow::Borrowed(decoded)) => Cow::Borrowed(decoded),
        Ok(Cow::Owned(decoded)) => Cow::Owned(decoded.trim().to_owned()),
        Err(_) => Cow::Borrowed(input),
    }
}

fn has_malformed_escape(input: &str) -> bool {
    let bytes = input.as_bytes();
    bytes.iter().enumerate().any(|(i, &b)| {
        b == b'%'
            && !matches!(
                (bytes.get(i + 1), bytes.get(i + 2)),
                (Some(hi), Some(lo)) if hi.is_ascii_hexdigit() && lo.is_ascii_hexdigit()
            )
    })
}
