use scraper::{ElementRef, Html, Selector};

use crate::PageData;

const TITLE_SELECTOR: &str = "title";
const HEADING_SELECTOR: &str = "h1, h2, h3, h4, h5, h6";
const PARAGRAPH_SELECTOR: &str = "p";

pub trait Extractor: Send + Sync {
    fn extract(&self, html: &str) -> PageData;
}

/// Pulls the fixed title/headings/paragraphs schema out of a document:
/// - text of the first `<title>`, kept verbatim even when empty
/// - text of every `h1`..`h6` in document order
/// - text of every `<p>` in document order
///
/// html5ever recovers from any malformed markup, so extraction cannot fail.
#[derive(Debug, Default, Clone, Copy)]
pub struct HeadingParagraphExtractor;

impl Extractor for HeadingParagraphExtractor {
    fn extract(&self, html: &str) -> PageData {
        let doc = Html::parse_document(html);
        let title_sel = Selector::parse(TITLE_SELECTOR).ok();
        let heading_sel = Selector::parse(HEADING_SELECTOR).ok();
        let paragraph_sel = Selector::parse(PARAGRAPH_SELECTOR).ok();

        let title = title_sel
            .as_ref()
            .and_then(|sel| doc.select(sel).next())
            .map(element_text);

        PageData {
            title,
            headings: select_text(&doc, heading_sel.as_ref()),
            paragraphs: select_text(&doc, paragraph_sel.as_ref()),
        }
    }
}

fn select_text(doc: &Html, selector: Option<&Selector>) -> Vec<String> {
    match selector {
        Some(sel) => doc.select(sel).map(element_text).collect(),
        None => Vec::new(),
    }
}

/// Descendant text concatenated, tags stripped, whitespace untouched.
fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selectors_are_valid() {
        for sel in [TITLE_SELECTOR, HEADING_SELECTOR, PARAGRAPH_SELECTOR] {
            assert!(Selector::parse(sel).is_ok(), "{sel}");
        }
    }

    #[test]
    fn nested_markup_is_flattened_to_text() {
        let data = HeadingParagraphExtractor.extract("<p>a <b>bold</b> <i>move</i></p>");
        assert_eq!(data.paragraphs, vec!["a bold move".to_string()]);
    }
}
