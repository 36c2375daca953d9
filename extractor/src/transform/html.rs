//! HTML to plain text extraction.
//!
//! A small, forgiving tokenizer: tags, comments, declarations and the bodies
//! of `<script>`/`<style>` are dropped, text between them is kept and joined
//! with single spaces. Anything that does not look like markup stays literal,
//! so malformed input degrades to best-effort text instead of failing.

use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// Elements whose content is not text.
const RAW_TEXT_ELEMENTS: [&str; 2] = ["script", "style"];

static ENTITY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"&(?:#([0-9]{1,8})|#[xX]([0-9a-fA-F]{1,8})|([A-Za-z][A-Za-z0-9]{1,31}));")
        .expect("entity pattern is valid")
});

static WHITESPACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

/// Extract the text content of an HTML fragment.
///
/// ```
/// use jobflat::transform::html::html_to_text;
///
/// assert_eq!(html_to_text("<p>Hello <b>World</b></p>"), "Hello World");
/// ```
pub fn html_to_text(html: &str) -> String {
    let mut text = String::with_capacity(html.len());
    let mut rest = html;

    while let Some(lt) = rest.find('<') {
        push_text(&mut text, &rest[..lt]);
        let markup = &rest[lt..];

        match scan_markup(markup) {
            Some((len, raw_text)) => {
                text.push(' ');
                rest = &markup[len..];
                if let Some(name) = raw_text {
                    rest = skip_raw_text(rest, name);
                }
            }
            None => {
                text.push('<');
                rest = &markup[1..];
            }
        }
    }
    push_text(&mut text, rest);

    normalize_whitespace(&text)
}

/// Collapse every whitespace run to one space and trim.
pub fn normalize_whitespace(text: &str) -> String {
    WHITESPACE.replace_all(text, " ").trim().to_string()
}

/// Decode character references (`&amp;`, `&#233;`, `&#xE9;`).
///
/// Unknown named references are left untouched.
pub fn decode_entities(text: &str) -> Cow<'_, str> {
    if !text.contains('&') {
        return Cow::Borrowed(text);
    }

    ENTITY.replace_all(text, |caps: &Captures| {
        if let Some(dec) = caps.get(1) {
            numeric_reference(dec.as_str(), 10).to_string()
        } else if let Some(hex) = caps.get(2) {
            numeric_reference(hex.as_str(), 16).to_string()
        } else {
            named_reference(&caps[3])
                .map(str::to_string)
                .unwrap_or_else(|| caps[0].to_string())
        }
    })
}

fn push_text(out: &mut String, segment: &str) {
    out.push_str(&decode_entities(segment));
}

/// Recognize markup at the start of `markup` (which begins with `<`).
///
/// Returns the markup length and, for a `<script>`/`<style>` start tag, the
/// element name whose body must be skipped. `None` means the `<` is text.
fn scan_markup(markup: &str) -> Option<(usize, Option<&'static str>)> {
    match markup.as_bytes().get(1).copied()? {
        b'!' if markup.starts_with("<!--") => {
            let end = markup[4..]
                .find("-->")
                .map(|i| 4 + i + 3)
                .unwrap_or(markup.len());
            Some((end, None))
        }
        b'!' | b'?' | b'/' => markup.find('>').map(|i| (i + 1, None)),
        c if c.is_ascii_alphabetic() => {
            let end = tag_end(markup)?;
            let name = tag_name(&markup[1..]);
            let self_closing = markup[..end].ends_with("/>");
            let raw_text = RAW_TEXT_ELEMENTS
                .iter()
                .find(|element| name.eq_ignore_ascii_case(element))
                .filter(|_| !self_closing)
                .copied();
            Some((end, raw_text))
        }
        _ => None,
    }
}

/// Offset just past the `>` closing a start tag, honoring quoted attribute values.
fn tag_end(markup: &str) -> Option<usize> {
    let mut quote: Option<u8> = None;
    let mut prev = b'<';

    for (i, &b) in markup.as_bytes().iter().enumerate().skip(1) {
        match quote {
            Some(q) if b == q => quote = None,
            Some(_) => {}
            None => match b {
                b'>' => return Some(i + 1),
                b'"' | b'\'' if prev == b'=' => quote = Some(b),
                _ => {}
            },
        }
        if !b.is_ascii_whitespace() {
            prev = b;
        }
    }
    None
}

fn tag_name(s: &str) -> &str {
    let end = s
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-'))
        .unwrap_or(s.len());
    &s[..end]
}

/// Skip to the end tag of a raw text element, or to the end of input.
fn skip_raw_text<'a>(rest: &'a str, name: &str) -> &'a str {
    let closing = format!("</{}", name);
    // ASCII lowercasing keeps byte offsets intact.
    match rest.to_ascii_lowercase().find(&closing) {
        Some(i) => &rest[i..],
        None => "",
    }
}

fn numeric_reference(digits: &str, radix: u32) -> char {
    u32::from_str_radix(digits, radix)
        .ok()
        .and_then(char::from_u32)
        .filter(|c| *c != '\0')
        .unwrap_or('\u{FFFD}')
}

fn named_reference(name: &str) -> Option<&'static str> {
    let decoded = match name {
        "amp" => "&",
        "lt" => "<",
        "gt" => ">",
        "quot" => "\"",
        "apos" => "'",
        "nbsp" => "\u{A0}",
        "shy" => "\u{AD}",
        "ndash" => "\u{2013}",
        "mdash" => "\u{2014}",
        "hellip" => "\u{2026}",
        "lsquo" => "\u{2018}",
        "rsquo" => "\u{2019}",
        "ldquo" => "\u{201C}",
        "rdquo" => "\u{201D}",
        "laquo" => "\u{AB}",
        "raquo" => "\u{BB}",
        "bull" => "\u{2022}",
        "middot" => "\u{B7}",
        "copy" => "\u{A9}",
        "reg" => "\u{AE}",
        "trade" => "\u{2122}",
        "deg" => "\u{B0}",
        "times" => "\u{D7}",
        "euro" => "\u{20AC}",
        "pound" => "\u{A3}",
        "aelig" => "\u{E6}",
        "AElig" => "\u{C6}",
        "oslash" => "\u{F8}",
        "Oslash" => "\u{D8}",
        "aring" => "\u{E5}",
        "Aring" => "\u{C5}",
        "auml" => "\u{E4}",
        "Auml" => "\u{C4}",
        "ouml" => "\u{F6}",
        "Ouml" => "\u{D6}",
        "uuml" => "\u{FC}",
        "Uuml" => "\u{DC}",
        "szlig" => "\u{DF}",
        "eacute" => "\u{E9}",
        "Eacute" => "\u{C9}",
        "egrave" => "\u{E8}",
        "aacute" => "\u{E1}",
        "agrave" => "\u{E0}",
        "ccedil" => "\u{E7}",
        _ => return None,
    };
    Some(decoded)
}
