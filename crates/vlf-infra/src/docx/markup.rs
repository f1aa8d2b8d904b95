//! Placeholder clean-up on WordprocessingML parts
//!
//! Word stores text in runs and freely splits a typed `{{name}}` across
//! several of them. Before a part is handed to the template engine the
//! placeholders are stitched back together, block tags that sit alone in a
//! paragraph replace that paragraph, and image keys become raw (triple-brace)
//! expressions so their drawing markup is not escaped.

use std::collections::{BTreeSet, HashSet};
use std::ops::Range;
use std::sync::OnceLock;

use quick_xml::events::Event;
use quick_xml::Reader;
use regex::{Captures, Regex};
use vlf_types::{Error, Result};

fn split_open() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{(?:<[^>]+>)+\{").expect("valid regex"))
}

fn split_close() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\}(?:<[^>]+>)+\}").expect("valid regex"))
}

fn expression() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)\{\{(.*?)\}\}").expect("valid regex"))
}

fn xml_tag() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<[^>]*>").expect("valid regex"))
}

fn block_tag() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\{\{~?\s*(?:[#/^][^{}]*|else(?:\s[^{}]*)?)\}\}$").expect("valid regex")
    })
}

fn simple_reference() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\{\{\{?\s*([A-Za-z_][A-Za-z0-9_]*)\s*\}?\}\}").expect("valid regex")
    })
}

/// Full preparation pass for one part
pub fn prepare(xml: &str, image_keys: &HashSet<&str>) -> Result<String> {
    let joined = join_split_braces(xml);
    let cleaned = clean_expressions(&joined);
    let hoisted = hoist_block_paragraphs(&cleaned)?;
    Ok(promote_image_keys(&hoisted, image_keys))
}

/// `{</w:t>...<w:t>{` becomes `{{`, same for the closing pair
pub fn join_split_braces(xml: &str) -> String {
    let opened = split_open().replace_all(xml, "{{");
    split_close().replace_all(&opened, "}}").into_owned()
}

/// Drops markup inside each `{{ ... }}` and restores the plain expression text
pub fn clean_expressions(xml: &str) -> String {
    expression()
        .replace_all(xml, |caps: &Captures| {
            let inner = &caps[1];
            if inner.contains("</w:p>") {
                // unterminated tag reaching into another paragraph
                tracing::warn!("Placeholder spans paragraphs, left as is");
                return caps[0].to_string();
            }
            let text = xml_tag().replace_all(inner, "");
            let text = match quick_xml::escape::unescape(&text) {
                Ok(unescaped) => unescaped.into_owned(),
                Err(_) => text.into_owned(),
            };
            let text = text.replace(['\u{201C}', '\u{201D}'], "\"").replace(['\u{2018}', '\u{2019}'], "'");
            format!("{{{{{}}}}}", text)
        })
        .into_owned()
}

/// Paragraphs whose only text is a block tag are replaced by the tag
pub fn hoist_block_paragraphs(xml: &str) -> Result<String> {
    let mut out = String::with_capacity(xml.len());
    let mut last = 0;

    for span in leaf_paragraphs(xml)? {
        let text = paragraph_text(&xml[span.clone()])?;
        let trimmed = text.trim();
        if block_tag().is_match(trimmed) {
            out.push_str(&xml[last..span.start]);
            out.push_str(trimmed);
            last = span.end;
        }
    }

    out.push_str(&xml[last..]);
    Ok(out)
}

/// Byte ranges of `<w:p>` elements that hold no nested paragraph.
///
/// Text boxes put whole paragraphs inside a run of their host paragraph;
/// only the innermost ones can be swapped for a block tag without
/// unbalancing the markup around them.
pub fn leaf_paragraphs(xml: &str) -> Result<Vec<Range<usize>>> {
    let mut reader = Reader::from_str(xml);
    // (start offset, holds a nested paragraph)
    let mut open: Vec<(usize, bool)> = Vec::new();
    let mut spans = Vec::new();

    loop {
        let start = reader.buffer_position() as usize;
        match reader.read_event() {
            Ok(Event::Start(e)) if e.name().as_ref() == b"w:p" => {
                if let Some(parent) = open.last_mut() {
                    parent.1 = true;
                }
                open.push((start, false));
            }
            Ok(Event::End(e)) if e.name().as_ref() == b"w:p" => {
                if let Some((begin, false)) = open.pop() {
                    spans.push(begin..reader.buffer_position() as usize);
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(Error::Template(format!(
                    "malformed part at byte {}: {}",
                    reader.error_position(),
                    e
                )))
            }
        }
    }

    Ok(spans)
}

/// Every element closed in order and nothing left open
pub fn check_well_formed(xml: &str) -> std::result::Result<(), String> {
    let mut reader = Reader::from_str(xml);
    let mut depth = 0usize;

    loop {
        match reader.read_event() {
            Ok(Event::Start(_)) => depth += 1,
            Ok(Event::End(_)) => depth = depth.saturating_sub(1),
            Ok(Event::Eof) if depth == 0 => return Ok(()),
            Ok(Event::Eof) => return Err(format!("{} element(s) left open", depth)),
            Ok(_) => {}
            Err(e) => return Err(format!("at byte {}: {}", reader.error_position(), e)),
        }
    }
}

/// Concatenated `w:t` content of a paragraph fragment
pub fn paragraph_text(fragment: &str) -> Result<String> {
    let mut reader = Reader::from_str(fragment);
    let mut in_text = false;
    let mut text = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if e.name().as_ref() == b"w:t" => in_text = true,
            Ok(Event::End(e)) if e.name().as_ref() == b"w:t" => in_text = false,
            Ok(Event::Text(t)) if in_text => {
                let unescaped = t
                    .unescape()
                    .map_err(|e| Error::Template(format!("bad text in paragraph: {}", e)))?;
                text.push_str(&unescaped);
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(Error::Template(format!(
                    "malformed paragraph at byte {}: {}",
                    reader.buffer_position(),
                    e
                )))
            }
        }
    }

    Ok(text)
}

/// `{{key}}` becomes `{{{key}}}` for keys whose value is raw markup
pub fn promote_image_keys(xml: &str, image_keys: &HashSet<&str>) -> String {
    simple_reference()
        .replace_all(xml, |caps: &Captures| {
            let key = &caps[1];
            if image_keys.contains(key) {
                format!("{{{{{{{}}}}}}}", key)
            } else {
                caps[0].to_string()
            }
        })
        .into_owned()
}

/// Plain identifiers referenced as `{{name}}` or `{{{name}}}`
pub fn placeholders(xml: &str) -> BTreeSet<String> {
    simple_reference()
        .captures_iter(xml)
        .map(|caps| caps[1].to_string())
        .filter(|name| name != "else" && name != "this")
        .collect()
}
