// ============================================================================
// dscl-core/src/parser.rs
// ============================================================================
//
// RECORD PARSER: Line-Oriented dscl Output to Typed Properties
//
// dscl prints one record as a sequence of `Key: value` lines. Long or
// multi-line values are written as a bare `Key:` line followed by lines
// starting with a single space. Values may carry URL-style escapes.
//
//   RecordName: alice
//   NFSHomeDirectory:
//    /Users/alice
//   RealName:
//    Alice Example
//
// AI-ASSISTANT-INFO: Parsers for dscl -read and -list output

// ---- Internal crate imports ----
use crate::error::{CoreError, CoreResult};
use crate::value::{Properties, Value};

// ---- External crate imports ----
use percent_encoding::percent_decode_str;

// ---- Standard library imports ----
use std::io::BufRead;

/// Separator between a key and its inline value.
const KEY_DELIMITER: &str = ": ";

// ============================================================================
// VALUE DECODING
// ============================================================================

/// Decodes one value token using query-string unescaping.
///
/// `+` becomes a space and `%XX` becomes the octet `XX`. If any `%` is not
/// followed by two hex digits, or the decoded bytes are not UTF-8, the token
/// is returned verbatim.
pub fn decode_value(token: &str) -> String {
    if !has_well_formed_escapes(token) {
        log::trace!("Keeping malformed escape sequence verbatim: {token:?}");
        return token.to_string();
    }

    let spaced = token.replace('+', " ");
    match percent_decode_str(&spaced).decode_utf8() {
        Ok(decoded) => decoded.into_owned(),
        Err(e) => {
            log::trace!("Decoded value is not UTF-8 ({e}), keeping {token:?}");
            token.to_string()
        }
    }
}

fn has_well_formed_escapes(token: &str) -> bool {
    let bytes = token.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = bytes.get(i + 1..i + 3);
            match hex {
                Some(pair) if pair.iter().all(u8::is_ascii_hexdigit) => i += 3,
                _ => return false,
            }
        } else {
            i += 1;
        }
    }
    true
}

// ============================================================================
// RECORD PARSING
// ============================================================================

/// Strips `\n` or `\r\n` from the end of a raw line.
fn trim_line_ending(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

/// Parses the output of `dscl -read` for a single record.
///
/// Keys named in `exclude` are left out of the result. Note that this is a
/// subtractive filter: passing `["RealName"]` returns every key except
/// `RealName`.
///
/// When a key is seen again, either through a continuation line or a
/// repeated `Key: value` line, the new text is appended to the existing
/// value's string form with no separator.
///
/// Only a failure of the underlying reader aborts the parse; lines that fit
/// none of the record shapes are skipped.
pub fn parse_record<R: BufRead>(mut reader: R, exclude: &[&str]) -> CoreResult<Properties> {
    let mut props = Properties::new();
    let mut key = String::new();
    let mut buf = Vec::new();

    loop {
        buf.clear();
        let read = reader
            .read_until(b'\n', &mut buf)
            .map_err(CoreError::StreamRead)?;
        if read == 0 {
            break;
        }

        let line = String::from_utf8_lossy(trim_line_ending(&buf));
        if line.is_empty() {
            continue;
        }

        let raw_value = if let Some(rest) = line.strip_prefix(' ').filter(|_| !key.is_empty()) {
            rest
        } else if let Some(idx) = line.find(KEY_DELIMITER).filter(|&idx| idx > 0) {
            key = line[..idx].to_string();
            &line[idx + KEY_DELIMITER.len()..]
        } else if let Some(bare) = line.strip_suffix(':').filter(|k| !k.is_empty()) {
            key = bare.to_string();
            ""
        } else {
            log::trace!("Skipping unrecognised record line: {line:?}");
            continue;
        };

        if exclude.contains(&key.as_str()) {
            continue;
        }

        let value = decode_value(raw_value);
        match props.get_mut(&key) {
            Some(existing) => existing.append_text(&value),
            None => {
                props.insert(key.clone(), Value::String(value));
            }
        }
    }

    Ok(props)
}

/// Convenience wrapper over [`parse_record`] for captured output bytes.
pub fn parse_record_bytes(output: &[u8], exclude: &[&str]) -> CoreResult<Properties> {
    parse_record(output, exclude)
}

// ============================================================================
// LIST PARSING
// ============================================================================

/// Parses the output of `dscl -list`: one entry per line, in order, up to
/// the first blank line or the end of the stream.
pub fn parse_list<R: BufRead>(mut reader: R) -> CoreResult<Vec<String>> {
    let mut entries = Vec::new();
    let mut buf = Vec::new();

    loop {
        buf.clear();
        let read = reader
            .read_until(b'\n', &mut buf)
            .map_err(CoreError::StreamRead)?;
        if read == 0 {
            break;
        }
        let line = trim_line_ending(&buf);
        if line.is_empty() {
            break;
        }
        entries.push(String::from_utf8_lossy(line).into_owned());
    }

    Ok(entries)
}
