//! Per-document titling pipeline.

use crate::dom::{Dom, NodeId};
use crate::error::{Error, Result};
use crate::heading::{classify, parse_heading, resolve_prefix};

/// Result of titling one content document.
#[derive(Debug, Clone)]
pub struct Titled {
    /// The updated document, serialized back to markup.
    pub xhtml: String,
    /// The display title written into the `<title>` element.
    pub title: String,
    /// The URL-safe identifier written onto the enclosing section.
    pub id: String,
}

/// Derive the display title and section identifier for one content document.
///
/// Finds the first `<h2>`-`<h6>` heading, classifies and parses it, applies
/// the title-cased span replacements, rewrites the `<title>` element, and
/// writes the computed identifier onto the nearest enclosing section. The
/// returned markup is the full updated document.
///
/// Stateless: each call parses its own tree and shares nothing with other
/// invocations.
pub fn derive_title_and_id(xhtml: &str) -> Result<Titled> {
    let mut dom = Dom::parse(xhtml)?;

    let heading = dom
        .find_first(&["h2", "h3", "h4", "h5", "h6"])
        .ok_or(Error::NoHeadingFound)?;
    let sections = sectioning_ancestors(&dom, heading);

    let division = classify(&dom, heading);
    let (mut info, edits) = parse_heading(&dom, heading, division)?;
    resolve_prefix(&mut info, &dom, &sections);

    for edit in &edits {
        dom.set_inner_markup(edit.node, &edit.markup)?;
    }

    let title = info.display_title();
    let id = info.identifier();
    if id.is_empty() {
        // Nothing usable was extracted; an empty identifier must not be
        // written onto the section.
        return Err(Error::UnrecognizedHeadingStructure);
    }

    let title_element = dom.find_first(&["title"]).ok_or(Error::NoTitleElement)?;
    dom.set_text(title_element, &title);
    if let Some(&nearest) = sections.first() {
        dom.set_attr(nearest, "id", &id);
    }

    Ok(Titled {
        xhtml: dom.serialize(),
        title,
        id,
    })
}

/// Enclosing sectioning elements of a node, nearest first.
fn sectioning_ancestors(dom: &Dom, node: NodeId) -> Vec<NodeId> {
    dom.ancestors(node)
        .filter(|&id| matches!(dom.tag_name(id), Some("section" | "article")))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_heading_is_a_skip_signal() {
        let doc = r#"<html><head><title>t</title></head><body><h1>Half Title</h1></body></html>"#;
        assert!(matches!(
            derive_title_and_id(doc),
            Err(Error::NoHeadingFound)
        ));
    }

    #[test]
    fn test_missing_title_element() {
        let doc = r#"<html><body><section epub:type="chapter"><h2 epub:type="z3998:roman">I</h2></section></body></html>"#;
        assert!(matches!(
            derive_title_and_id(doc),
            Err(Error::NoTitleElement)
        ));
    }

    #[test]
    fn test_heading_errors_take_precedence_over_missing_title() {
        // No <title> either, but the malformed numeral is reported first.
        let doc = r#"<html><body><section epub:type="chapter"><h2 epub:type="z3998:roman">IIII</h2></section></body></html>"#;
        assert!(matches!(
            derive_title_and_id(doc),
            Err(Error::MalformedRomanNumeral(_))
        ));
    }

    #[test]
    fn test_empty_heading_yields_no_identifier() {
        let doc = r#"<html><head><title>t</title></head><body><section><h2>   </h2></section></body></html>"#;
        assert!(matches!(
            derive_title_and_id(doc),
            Err(Error::UnrecognizedHeadingStructure)
        ));
    }
}
