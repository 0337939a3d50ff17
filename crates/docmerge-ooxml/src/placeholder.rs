//! Placeholder markers inside WordprocessingML parts
//!
//! Word stores typed text in runs (`<w:r><w:t>…</w:t></w:r>`) and freely
//! splits a run whenever formatting, spell-checking or revision tracking
//! changes. A marker typed as `{{ Candidate_Name }}` can therefore arrive as
//!
//! ```xml
//! <w:t>{{ Candi</w:t></w:r><w:r><w:rPr><w:b/></w:rPr><w:t>date_Name }}</w:t>
//! ```
//!
//! [`patch_part`] rewrites such spans so the template engine sees each
//! marker as one contiguous piece of text, keeping the formatting of the run
//! where the marker starts.

use std::borrow::Cow;
use std::collections::HashSet;
use std::sync::OnceLock;

use regex::{Captures, Regex};

/// Opening delimiter of a substitution marker
pub const OPEN_MARKER: &str = "{{";

/// Closing delimiter of a substitution marker
pub const CLOSE_MARKER: &str = "}}";

fn split_open_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{(?:<[^>]*>)+\{").unwrap())
}

fn split_close_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\}(?:<[^>]*>)+\}").unwrap())
}

fn marker_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)\{\{(.*?)\}\}").unwrap())
}

fn tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<[^>]*>").unwrap())
}

fn name_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{\{-?\s*([\p{XID_Start}_]\p{XID_Continue}*)").unwrap())
}

/// Join placeholder markers that Word split across runs
///
/// Markers spanning a paragraph boundary are left untouched; the template
/// engine reports them as syntax errors instead of this pass corrupting the
/// surrounding XML.
pub fn patch_part(xml: &str) -> String {
    let joined = split_open_re().replace_all(xml, OPEN_MARKER);
    let joined = split_close_re().replace_all(&joined, CLOSE_MARKER);

    marker_re()
        .replace_all(&joined, |caps: &Captures| {
            let inner = &caps[1];
            if inner.contains("</w:p>") {
                return caps[0].to_string();
            }
            format!("{}{}{}", OPEN_MARKER, clean_expression(inner), CLOSE_MARKER)
        })
        .into_owned()
}

/// Strip markup from the inside of a marker and normalise its quotes
fn clean_expression(raw: &str) -> String {
    let stripped = tag_re().replace_all(raw, "");
    let decoded = match quick_xml::escape::unescape(&stripped) {
        Ok(text) => text.into_owned(),
        Err(_) => stripped.into_owned(),
    };

    decoded
        .replace(['\u{2018}', '\u{2019}'], "'")
        .replace(['\u{201C}', '\u{201D}'], "\"")
}

/// Whether a part contains anything the template engine would interpret
pub fn has_template_syntax(xml: &str) -> bool {
    xml.contains(OPEN_MARKER) || xml.contains("{%") || xml.contains("{#")
}

/// Variable names referenced by `{{ name … }}` markers, in document order
///
/// Only the root of each expression is reported: `{{ person.name }}` and
/// `{{ name | upper }}` yield `person` and `name`. Duplicates are removed,
/// keeping the first occurrence.
pub fn scan_names(patched: &str) -> Vec<String> {
    dedup_preserving_order(
        name_re()
            .captures_iter(patched)
            .map(|caps| caps[1].to_string()),
    )
}

/// Remove duplicates from a sequence of names, keeping first occurrences
pub fn dedup_preserving_order<I>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut seen = HashSet::new();
    names
        .into_iter()
        .filter(|name| seen.insert(name.clone()))
        .collect()
}

/// Text content of all `<w:t>` elements, concatenated per paragraph
///
/// Paragraphs are separated by newlines. Used to inspect what a reader of
/// the rendered document would actually see.
pub fn visible_text(xml: &[u8]) -> crate::Result<String> {
    use quick_xml::events::Event;
    use quick_xml::Reader;

    let mut reader = Reader::from_reader(xml);
    let mut buf = Vec::new();
    let mut text = String::new();
    let mut in_text = false;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(ref e) if e.local_name().as_ref() == b"t" => in_text = true,
            Event::End(ref e) => match e.local_name().as_ref() {
                b"t" => in_text = false,
                b"p" => text.push('\n'),
                _ => {}
            },
            Event::Text(ref e) if in_text => {
                let unescaped = e.unescape().map_err(quick_xml::Error::from)?;
                text.push_str(&unescaped);
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(text)
}

/// Borrow-or-own helper for parts that need no patching
pub(crate) fn patch_if_needed(xml: &str) -> Cow<'_, str> {
    if xml.contains('{') {
        Cow::Owned(patch_part(xml))
    } else {
        Cow::Borrowed(xml)
    }
}
