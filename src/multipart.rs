// ABOUTME: Manual multipart/form-data decoder for image upload extraction
// ABOUTME: Byte-oriented boundary scanner, binary-safe, bounded at 10 MiB
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Morsel Labs

//! Multipart decoding.
//!
//! Uploads arrive as `multipart/form-data` with a single binary `image`
//! field. Image bytes routinely contain sequences that are invalid UTF-8, so
//! the body is never decoded as text: the decoder walks the raw buffer,
//! locating boundary delimiters and the header/payload blank line by byte
//! comparison, and only ever text-decodes the small ASCII header block of
//! each part. The payload slice passes through verbatim.

use thiserror::Error;

/// Hard cap on the accepted request payload.
pub const MAX_PAYLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Decoding failures. All but `PayloadTooLarge` indicate a malformed request.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MultipartError {
    /// The content-type header carries no `boundary` parameter.
    #[error("content-type header carries no multipart boundary")]
    NoBoundary,

    /// No part's `Content-Disposition` names the requested field.
    #[error("no `{0}` field in multipart body")]
    FieldNotFound(String),

    /// A part's headers are not terminated by a blank line.
    #[error("part headers are not terminated by a blank line")]
    MissingHeaderDelimiter,

    /// Body exceeds [`MAX_PAYLOAD_BYTES`].
    #[error("payload exceeds {MAX_PAYLOAD_BYTES} bytes")]
    PayloadTooLarge,
}

/// Extract the payload of the part whose `Content-Disposition` names `field`.
///
/// `content_type` is the request's `Content-Type` header value; `body` is the
/// raw, unmodified request body. Returns the part's bytes with the multipart
/// framing (boundary lines, part headers, trailing line break) stripped.
pub fn extract_field(
    content_type: &str,
    body: &[u8],
    field: &str,
) -> Result<Vec<u8>, MultipartError> {
    if body.len() > MAX_PAYLOAD_BYTES {
        return Err(MultipartError::PayloadTooLarge);
    }

    let boundary = parse_boundary(content_type).ok_or(MultipartError::NoBoundary)?;
    let delimiter = format!("--{boundary}").into_bytes();

    let mut cursor = match find_bytes(body, &delimiter, 0) {
        Some(pos) => pos + delimiter.len(),
        None => return Err(MultipartError::FieldNotFound(field.to_string())),
    };

    loop {
        // Two dashes after the delimiter close the stream.
        if body[cursor..].starts_with(b"--") {
            break;
        }
        cursor = skip_line_break(body, cursor);

        let part_end = match find_bytes(body, &delimiter, cursor) {
            Some(pos) => pos,
            None => break,
        };
        let part = &body[cursor..part_end];

        if let Some(payload) = part_payload(part, field)? {
            return Ok(payload.to_vec());
        }

        cursor = part_end + delimiter.len();
    }

    Err(MultipartError::FieldNotFound(field.to_string()))
}

/// Pull the `boundary` parameter out of a content-type header value.
///
/// Tolerates quoted and bare forms, in any parameter position. The parameter
/// name is matched ASCII-case-insensitively in place; the boundary token
/// itself keeps its casing.
fn parse_boundary(content_type: &str) -> Option<String> {
    const PARAM: &str = "boundary=";
    let start = find_ascii_insensitive(content_type, PARAM)? + PARAM.len();
    let rest = &content_type[start..];
    let value = match rest.find(';') {
        Some(end) => &rest[..end],
        None => rest,
    };
    let value = value.trim().trim_matches('"');
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Byte position of an ASCII needle, ignoring ASCII case. Matches land on
/// ASCII bytes, so the returned index is always a char boundary.
fn find_ascii_insensitive(haystack: &str, needle: &str) -> Option<usize> {
    haystack
        .as_bytes()
        .windows(needle.len())
        .position(|window| window.eq_ignore_ascii_case(needle.as_bytes()))
}

/// If `part` names `field`, return its payload slice; otherwise `None`.
///
/// The part spans from just after the boundary line break to just before the
/// next boundary's leading `\r\n`.
fn part_payload<'a>(part: &'a [u8], field: &str) -> Result<Option<&'a [u8]>, MultipartError> {
    let (headers, payload) = split_headers(part)?;

    // Headers are ASCII by construction; a lossy decode cannot corrupt the
    // match and never touches the payload bytes.
    let headers_text = String::from_utf8_lossy(headers).to_lowercase();
    let wanted = field.to_lowercase();
    // Parameter-wise comparison: a `filename="image"` parameter must not
    // satisfy a lookup for the field `image`.
    let is_match = headers_text.lines().any(|line| {
        line.starts_with("content-disposition")
            && line.split(';').any(|param| {
                param
                    .trim()
                    .strip_prefix("name=")
                    .is_some_and(|value| value.trim_matches('"') == wanted)
            })
    });

    if !is_match {
        return Ok(None);
    }

    Ok(Some(trim_trailing_line_break(payload)))
}

/// Split a part into its header block and payload at the first blank line.
fn split_headers(part: &[u8]) -> Result<(&[u8], &[u8]), MultipartError> {
    if let Some(pos) = find_bytes(part, b"\r\n\r\n", 0) {
        return Ok((&part[..pos], &part[pos + 4..]));
    }
    if let Some(pos) = find_bytes(part, b"\n\n", 0) {
        return Ok((&part[..pos], &part[pos + 2..]));
    }
    Err(MultipartError::MissingHeaderDelimiter)
}

/// Drop the single line break that separates a payload from the next
/// boundary. Payload bytes that merely end in `\r` or `\n` on their own are
/// left alone beyond that one framing break.
fn trim_trailing_line_break(payload: &[u8]) -> &[u8] {
    if payload.ends_with(b"\r\n") {
        &payload[..payload.len() - 2]
    } else if payload.ends_with(b"\n") {
        &payload[..payload.len() - 1]
    } else {
        payload
    }
}

/// Step past the line break that follows a boundary delimiter.
fn skip_line_break(body: &[u8], pos: usize) -> usize {
    if body[pos..].starts_with(b"\r\n") {
        pos + 2
    } else if body[pos..].starts_with(b"\n") {
        pos + 1
    } else {
        pos
    }
}

/// First occurrence of `needle` in `haystack` at or after `from`.
fn find_bytes(haystack: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    if from > haystack.len() || needle.is_empty() {
        return None;
    }
    haystack[from..]
        .windows(needle.len())
        .position(|window| window == needle)
        .map(|pos| pos + from)
}
