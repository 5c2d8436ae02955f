/// Appends `s` to `buf` as the body of a JSON string literal.
///
/// Control characters, `"` and `\` are escaped. Unlike general purpose JSON
/// encoders, `<`, `>`, `&`, U+2028 and U+2029 are written as is: the policy
/// document is signed byte by byte, so the bytes must stay exactly what the
/// storage service reads back.
///
/// Each byte of an invalid UTF-8 sequence is replaced with `\ufffd`.
pub(crate) fn append_escaped(buf: &mut Vec<u8>, s: &[u8]) {
    for chunk in s.utf8_chunks() {
        append_escaped_str(buf, chunk.valid());
        for _ in chunk.invalid() {
            buf.extend_from_slice(b"\\ufffd");
        }
    }
}

fn append_escaped_str(buf: &mut Vec<u8>, s: &str) {
    const HEX: &[u8; 16] = b"0123456789abcdef";
    for &b in s.as_bytes() {
        match b {
            b'\\' | b'"' => buf.extend_from_slice(&[b'\\', b]),
            b'\n' => buf.extend_from_slice(b"\\n"),
            b'\r' => buf.extend_from_slice(b"\\r"),
            b'\t' => buf.extend_from_slice(b"\\t"),
            0x00..=0x1f => buf.extend_from_slice(&[
                b'\\',
                b'u',
                b'0',
                b'0',
                HEX[usize::from(b >> 4)],
                HEX[usize::from(b & 0x0f)],
            ]),
            // multi-byte sequences are already valid UTF-8
            _ => buf.push(b),
        }
    }
}
