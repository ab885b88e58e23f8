//! Heading classification and parsing.
//!
//! A content file's first `<h2>`-`<h6>` heading encodes the division kind,
//! Roman numbering, title, and optional subtitle of a structural unit through
//! `epub:type` markers. This module classifies the division from the enclosing
//! sectioning elements, extracts a [`TitleInfo`] from the heading, and renders
//! the display title and the URL-safe section identifier.
//!
//! Parsing is separated from mutation: [`parse_heading`] returns the
//! `TitleInfo` together with a list of [`SpanEdit`]s describing which inline
//! spans should be replaced with their title-cased rendering. The engine
//! applies the edits in a distinct step, so parsing itself has no side
//! effects.

use crate::dom::{Dom, NodeId};
use crate::error::{Error, Result};
use crate::roman;
use crate::slug::slugify;
use crate::titlecase::titlecase;

/// Classification of a structural unit, governing its title prefix and
/// numbering display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BookDivision {
    #[default]
    None,
    Article,
    Subchapter,
    Chapter,
    Division,
    Part,
    Volume,
}

impl BookDivision {
    /// The word shown before the division's number ("Chapter 4").
    ///
    /// Article and None carry no prefix. Subchapter currently has no prefix
    /// word either; that gap is deliberate.
    pub fn prefix_word(self) -> &'static str {
        match self {
            BookDivision::Chapter => "Chapter",
            BookDivision::Division => "Division",
            BookDivision::Part => "Part",
            BookDivision::Volume => "Volume",
            BookDivision::None | BookDivision::Article | BookDivision::Subchapter => "",
        }
    }
}

/// Everything extracted from one heading, prior to rendering.
///
/// Constructed fresh per heading and consumed once; never shared or reused
/// across files.
#[derive(Debug, Clone, Default)]
pub struct TitleInfo {
    /// Title-cased heading content, inline structure preserved.
    pub title: String,
    /// Title-cased heading content, inline structure stripped.
    pub title_no_embeds: String,
    /// Subtitle with inline structure, if the heading carries one.
    pub subtitle: Option<String>,
    /// Subtitle with inline structure stripped.
    pub subtitle_no_embeds: Option<String>,
    /// Raw Roman numeral text, if the heading carries a numbering marker.
    pub roman_text: Option<String>,
    /// Decimal number; 0 means "no number".
    pub number: u32,
    /// Count of enclosing sectioning elements.
    pub depth: u32,
    /// Numeric or literal token inherited from an enclosing part, division,
    /// or volume.
    pub id_prefix: Option<String>,
    pub division: BookDivision,
}

/// A pending replacement of one inline span's content with its title-cased
/// rendering.
#[derive(Debug, Clone)]
pub struct SpanEdit {
    pub node: NodeId,
    pub markup: String,
}

/// Check whether a space-separated token attribute contains `token`.
fn has_token(attr_value: &str, token: &str) -> bool {
    attr_value.split_whitespace().any(|t| t == token)
}

/// Determine the kind of book division for a heading by inspecting the
/// nearest sectioning ancestor.
///
/// Falls back to `<body>` when the heading sits outside any section or
/// article. Total: every heading classifies to something, if only `None`.
pub fn classify(dom: &Dom, heading: NodeId) -> BookDivision {
    let anchor = dom
        .ancestors(heading)
        .find(|&id| matches!(dom.tag_name(id), Some("section" | "article")))
        .or_else(|| {
            dom.ancestors(heading)
                .find(|&id| dom.tag_name(id) == Some("body"))
        });
    let Some(anchor) = anchor else {
        return BookDivision::None;
    };

    let epub_type = dom.attr(anchor, "epub:type").unwrap_or("");
    if has_token(epub_type, "part") {
        BookDivision::Part
    } else if has_token(epub_type, "division") {
        BookDivision::Division
    } else if has_token(epub_type, "volume") && !has_token(epub_type, "se:short-story") {
        BookDivision::Volume
    } else if has_token(epub_type, "subchapter") {
        BookDivision::Subchapter
    } else if has_token(epub_type, "chapter") {
        BookDivision::Chapter
    } else if dom.tag_name(anchor) == Some("article") {
        BookDivision::Article
    } else {
        BookDivision::None
    }
}

/// Extract a [`TitleInfo`] and pending span edits from a heading element.
///
/// Recognized shapes, in order:
///
/// 1. Compound: `Book <span epub:type="z3998:roman">III</span>` (also Part,
///    Division, Volume), matched case-insensitively.
/// 2. Single-element: the heading has no child elements. A numbering marker
///    yields a pure number; anything else is title-cased wholesale.
/// 3. Structured: immediate child spans carrying numbering, subtitle, or
///    plain title content.
///
/// A heading with child elements but no recognized spans is an
/// [`Error::UnrecognizedHeadingStructure`]; it is never returned as a
/// half-populated success.
pub fn parse_heading(
    dom: &Dom,
    heading: NodeId,
    division: BookDivision,
) -> Result<(TitleInfo, Vec<SpanEdit>)> {
    if let Some(compound) = parse_compound(dom, heading, division)? {
        return Ok((compound, Vec::new()));
    }

    let mut info = TitleInfo {
        division,
        ..TitleInfo::default()
    };

    let element_children: Vec<NodeId> = dom
        .children(heading)
        .filter(|&id| dom.is_element(id))
        .collect();

    if element_children.is_empty() {
        let epub_type = dom.attr(heading, "epub:type").unwrap_or("");
        let text = dom.inner_text(heading);
        if has_token(epub_type, "z3998:roman") {
            // The numeral itself is never title-cased.
            let numeral = text.trim();
            info.number = roman::from_roman(numeral)?;
            info.roman_text = Some(numeral.to_string());
            return Ok((info, Vec::new()));
        }
        info.title = titlecase(&dom.inner_markup(heading));
        info.title_no_embeds = titlecase(&text);
        let markup = info.title.clone();
        return Ok((info, vec![SpanEdit { node: heading, markup }]));
    }

    let spans: Vec<NodeId> = element_children
        .iter()
        .copied()
        .filter(|&id| dom.tag_name(id) == Some("span"))
        .collect();
    if spans.is_empty() {
        return Err(Error::UnrecognizedHeadingStructure);
    }

    let mut edits = Vec::new();
    for span in spans {
        let epub_type = dom.attr(span, "epub:type").unwrap_or("");
        if has_token(epub_type, "z3998:roman") {
            let text = dom.inner_text(span);
            let numeral = text.trim();
            info.number = roman::from_roman(numeral)?;
            info.roman_text = Some(numeral.to_string());
        } else if has_token(epub_type, "subtitle") {
            let cased = titlecase(&dom.inner_markup(span));
            info.subtitle_no_embeds = Some(titlecase(&dom.inner_text(span)));
            info.subtitle = Some(cased.clone());
            edits.push(SpanEdit { node: span, markup: cased });
        } else {
            let cased = titlecase(&dom.inner_markup(span));
            info.title_no_embeds = titlecase(&dom.inner_text(span));
            info.title = cased.clone();
            edits.push(SpanEdit { node: span, markup: cased });
        }
    }
    Ok((info, edits))
}

/// Match the compound heading shape: a leading division word followed by a
/// single numbering span, e.g. `Book <span epub:type="z3998:roman">II</span>`.
///
/// On a match the numeral is converted for the plain title ("Book 2") but
/// left untouched in the embedded title, and no subtitle applies.
fn parse_compound(
    dom: &Dom,
    heading: NodeId,
    division: BookDivision,
) -> Result<Option<TitleInfo>> {
    let children: Vec<NodeId> = dom.children(heading).collect();
    if children.len() < 2 {
        return Ok(None);
    }

    // Leading text node holding exactly one of the division words.
    let Some(lead) = dom.text(children[0]) else {
        return Ok(None);
    };
    let word = lead.trim();
    if !["book", "part", "division", "volume"].contains(&word.to_lowercase().as_str()) {
        return Ok(None);
    }

    // A numbering span, and nothing after it but whitespace.
    let span = children[1];
    if dom.tag_name(span) != Some("span")
        || !has_token(dom.attr(span, "epub:type").unwrap_or(""), "z3998:roman")
    {
        return Ok(None);
    }
    if children[2..]
        .iter()
        .any(|&extra| !dom.text(extra).is_some_and(|t| t.trim().is_empty()))
    {
        return Ok(None);
    }

    let text = dom.inner_text(span);
    let number = roman::from_roman(text.trim())?;
    Ok(Some(TitleInfo {
        title_no_embeds: format!("{} {}", titlecase(word), number),
        title: titlecase(&dom.inner_markup(heading)),
        division,
        ..TitleInfo::default()
    }))
}

/// Enrich a [`TitleInfo`] with nesting-derived prefixes.
///
/// `sections` is the chain of enclosing sectioning elements, nearest first.
/// When the next section out is a part, division, or volume with an id, its
/// numeric token becomes the identifier prefix; a short-story collection
/// member inherits the full id verbatim instead.
pub fn resolve_prefix(info: &mut TitleInfo, dom: &Dom, sections: &[NodeId]) {
    info.depth = sections.len() as u32;
    if sections.len() <= 1 {
        return;
    }

    let outer = sections[1];
    let Some(epub_type) = dom.attr(outer, "epub:type") else {
        return;
    };
    if !["part", "division", "volume"]
        .iter()
        .any(|t| has_token(epub_type, t))
    {
        return;
    }
    let Some(outer_id) = dom.attr(outer, "id") else {
        return;
    };

    let nearest_type = dom.attr(sections[0], "epub:type").unwrap_or("");
    if has_token(nearest_type, "se:short-story") {
        info.id_prefix = Some(outer_id.to_string());
    } else if let Some(number) = number_after_hyphen(outer_id) {
        info.id_prefix = Some(number.to_string());
    }
}

/// Extract the first digit run following a hyphen in an identifier like
/// `part-3`.
fn number_after_hyphen(id: &str) -> Option<&str> {
    let bytes = id.as_bytes();
    for (i, &b) in bytes.iter().enumerate() {
        if b != b'-' || i == 0 || i + 1 >= bytes.len() {
            continue;
        }
        let prev_is_word = id[..i]
            .chars()
            .next_back()
            .is_some_and(|c| c.is_alphanumeric() || c == '_');
        if prev_is_word && bytes[i + 1].is_ascii_digit() {
            let start = i + 1;
            let end = start
                + bytes[start..]
                    .iter()
                    .take_while(|b| b.is_ascii_digit())
                    .count();
            return Some(&id[start..end]);
        }
    }
    None
}

impl TitleInfo {
    /// Render the display title for the `<title>` element.
    ///
    /// A bare number is never shown without its division prefix.
    pub fn display_title(&self) -> String {
        let prefix = self.division.prefix_word();
        if let Some(subtitle) = &self.subtitle_no_embeds {
            if !prefix.is_empty() {
                format!("{prefix} {}: {subtitle}", self.number)
            } else if self.title_no_embeds.is_empty() {
                subtitle.clone()
            } else {
                format!("{}: {subtitle}", self.title_no_embeds)
            }
        } else if !prefix.is_empty() {
            if self.number > 0 {
                format!("{prefix} {}", self.number)
            } else {
                self.title_no_embeds.clone()
            }
        } else {
            self.title_no_embeds.clone()
        }
    }

    /// Render the URL-safe section identifier.
    ///
    /// A numbered heading identifies as `prefix-word`-`inherited prefix`-
    /// `number`; the inherited prefix may be absent, and slugification
    /// collapses the empty segment. Unnumbered headings fall back to the
    /// plain title, then the plain subtitle.
    pub fn identifier(&self) -> String {
        let candidate = if self.roman_text.is_some() {
            format!(
                "{}-{}-{}",
                self.division.prefix_word(),
                self.id_prefix.as_deref().unwrap_or(""),
                self.number
            )
        } else if !self.title_no_embeds.is_empty() {
            match &self.id_prefix {
                Some(prefix) => format!("{prefix}-{}", self.title_no_embeds),
                None => self.title_no_embeds.clone(),
            }
        } else if let Some(subtitle) = &self.subtitle_no_embeds {
            subtitle.clone()
        } else {
            String::new()
        };
        slugify(&candidate)
    }
}
