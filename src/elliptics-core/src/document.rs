//! Parsing of the small XML documents the proxy answers with.
//!
//! Upload answers look like
//! `<post obj="a.txt" ...><complete .../><written>2</written></post>` and
//! download-info answers like
//! `<download-info><host>..</host><path>..</path><ts>..</ts></download-info>`.
//! Both are read as a flat map of the root's child elements.

use quick_xml::events::Event;
use quick_xml::reader::Reader;
use std::collections::BTreeMap;

/// Flat field → text map of a download-info document
pub type DownloadInfo = BTreeMap<String, String>;

/// Parse the root element's direct children into `name → text`.
///
/// Text nested deeper than the children is ignored; childless
/// (self-closing) elements map to an empty string. On repeated names the
/// last one wins.
pub fn parse_flat(body: &[u8]) -> Result<BTreeMap<String, String>, String> {
    let mut reader = Reader::from_reader(body);
    reader.config_mut().trim_text(true);

    let mut fields = BTreeMap::new();
    let mut depth = 0usize;
    let mut seen_root = false;
    let mut current: Option<(String, String)> = None;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| format!("malformed document at byte {}: {}", reader.buffer_position(), e))?;

        match event {
            Event::Start(e) => {
                if depth == 0 && seen_root {
                    return Err("more than one root element".to_string());
                }
                seen_root = true;
                depth += 1;
                if depth == 2 {
                    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                    current = Some((name, String::new()));
                }
            }
            Event::Empty(e) => {
                if depth == 0 {
                    if seen_root {
                        return Err("more than one root element".to_string());
                    }
                    seen_root = true;
                } else if depth == 1 {
                    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                    fields.insert(name, String::new());
                }
            }
            Event::Text(t) => {
                if depth == 2 {
                    if let Some((_, text)) = current.as_mut() {
                        let unescaped = t.unescape().map_err(|e| e.to_string())?;
                        text.push_str(&unescaped);
                    }
                }
            }
            Event::CData(c) => {
                if depth == 2 {
                    if let Some((_, text)) = current.as_mut() {
                        text.push_str(&String::from_utf8_lossy(&c.into_inner()));
                    }
                }
            }
            Event::End(_) => {
                if depth == 2 {
                    if let Some((name, text)) = current.take() {
                        fields.insert(name, text);
                    }
                }
                depth = depth.saturating_sub(1);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !seen_root {
        return Err("no root element".to_string());
    }
    if depth != 0 {
        return Err("unexpected end of document".to_string());
    }

    Ok(fields)
}

/// Number of copies an upload answer reports as written; 0 when the
/// document is malformed or has no `written` field.
pub fn written_copies(body: &[u8]) -> i64 {
    parse_flat(body)
        .ok()
        .and_then(|fields| fields.get("written").map(|value| leading_integer(value)))
        .unwrap_or(0)
}

/// Integer prefix of a string ("3", " 12abc" -> 12), 0 if there is none
fn leading_integer(value: &str) -> i64 {
    let value = value.trim();
    let (sign, digits) = match value.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, value.strip_prefix('+').unwrap_or(value)),
    };

    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());

    if end == 0 {
        return 0;
    }

    // Too many digits for i64: saturate
    digits[..end]
        .parse::<i64>()
        .map(|n| sign * n)
        .unwrap_or(if sign < 0 { i64::MIN } else { i64::MAX })
}
