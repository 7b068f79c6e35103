//! Candidate-headline extraction from page markup.
//!
//! Extraction is a pure function of the document and the token threshold:
//! no I/O, no randomness, the same input always yields the same ordered
//! output. Parsing is permissive: `Html::parse_document` builds a
//! best-effort tree out of whatever markup it is handed, so a mangled
//! page degrades to fewer candidates, never to an error.
//!
//! Three passes run in a fixed order, each contributing only strings not
//! already collected:
//! 1. `h2, h3`: the sub-title levels content sites put headlines in
//! 2. `a`: visible link text
//! 3. `span.text.text`: article-teaser spans, a narrow fallback for one
//!    target site that exposes headlines through neither headings nor
//!    links
//!
//! Every candidate must clear the token threshold: strictly more than
//! `token_threshold` whitespace-separated words. That single heuristic
//! rejects nav labels, bylines, timestamps, and promo snippets while
//! keeping sentence-like headlines.

use itertools::Itertools;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};

static HEADING_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("h2, h3").unwrap());
static LINK_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("a").unwrap());
static TEASER_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("span.text.text").unwrap());

/// Extract the deduplicated, order-preserving headline candidates from one
/// page body.
pub fn extract_headlines(html: &str, token_threshold: usize) -> Vec<String> {
    let document = Html::parse_document(html);
    document
        .select(&HEADING_SELECTOR)
        .chain(document.select(&LINK_SELECTOR))
        .chain(document.select(&TEASER_SELECTOR))
        .map(element_text)
        .filter(|text| qualifies(text, token_threshold))
        .unique()
        .collect()
}

/// Collect an element's text content, collapsing interior whitespace.
///
/// Nested markup fragments the text into pieces separated by newlines and
/// indentation; joining on single spaces yields the clean visible string
/// and trims the ends as a side effect.
fn element_text(element: ElementRef) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .join(" ")
}

fn qualifies(text: &str, token_threshold: usize) -> bool {
    !text.is_empty() && text.split_whitespace().count() > token_threshold
}

#[cfg(test)]
mod tests {
    use super::*;

    const THRESHOLD: usize = 6;

    #[test]
    fn short_strings_are_filtered_out() {
        let html = r#"
            <html><body>
                <h2>Markets</h2>
                <a href="/about">About us and our editorial team</a>
                <h3>Central bank holds rates steady despite mounting pressure today</h3>
            </body></html>
        "#;
        let headlines = extract_headlines(html, THRESHOLD);
        assert_eq!(
            headlines,
            vec!["Central bank holds rates steady despite mounting pressure today"]
        );
    }

    #[test]
    fn exactly_threshold_tokens_is_rejected() {
        // Six tokens: the filter requires strictly more.
        let html = "<h2>One two three four five six</h2>";
        assert!(extract_headlines(html, THRESHOLD).is_empty());

        let html = "<h2>One two three four five six seven</h2>";
        assert_eq!(extract_headlines(html, THRESHOLD).len(), 1);
    }

    #[test]
    fn duplicate_across_passes_appears_once_at_first_position() {
        let text = "Markets rally on strong earnings report today";
        let html = format!(
            r#"<h2>{text}</h2>
               <a href="/x">{text}</a>
               <a href="/y">Oil prices slide as supply concerns ease further</a>"#
        );
        let headlines = extract_headlines(&html, THRESHOLD);
        assert_eq!(
            headlines,
            vec![
                text,
                "Oil prices slide as supply concerns ease further"
            ]
        );
    }

    #[test]
    fn teaser_spans_are_a_fallback_pass() {
        let html = r#"
            <div>
                <span class="text text">Tech stocks extend gains after upbeat quarterly revenue figures</span>
                <span class="promo">Unstyled promo spans never contribute candidates to the output</span>
            </div>
        "#;
        let headlines = extract_headlines(html, THRESHOLD);
        assert_eq!(
            headlines,
            vec!["Tech stocks extend gains after upbeat quarterly revenue figures"]
        );
    }

    #[test]
    fn heading_pass_runs_before_link_pass() {
        let html = r#"
            <a href="/1">Bond yields climb to their highest level since spring</a>
            <h2>Dollar weakens against major currencies in early trading session</h2>
        "#;
        let headlines = extract_headlines(html, THRESHOLD);
        // The heading comes first even though the link precedes it in the
        // document.
        assert_eq!(
            headlines,
            vec![
                "Dollar weakens against major currencies in early trading session",
                "Bond yields climb to their highest level since spring"
            ]
        );
    }

    #[test]
    fn nested_markup_text_is_whitespace_normalized() {
        let html = r#"
            <h2>
                Investors <em>brace</em> for
                a volatile   week of
                <strong>economic data</strong> releases
            </h2>
        "#;
        let headlines = extract_headlines(html, THRESHOLD);
        assert_eq!(
            headlines,
            vec!["Investors brace for a volatile week of economic data releases"]
        );
    }

    #[test]
    fn empty_page_yields_empty_list() {
        assert!(extract_headlines("", THRESHOLD).is_empty());
        assert!(extract_headlines("<html><body></body></html>", THRESHOLD).is_empty());
    }

    #[test]
    fn malformed_markup_is_parsed_best_effort() {
        let html = "<div><h2>Regulators propose sweeping new rules for digital asset exchanges";
        let headlines = extract_headlines(html, THRESHOLD);
        assert_eq!(
            headlines,
            vec!["Regulators propose sweeping new rules for digital asset exchanges"]
        );
    }

    #[test]
    fn threshold_is_tunable() {
        let html = "<h2>Fed signals patience on cuts</h2>";
        assert!(extract_headlines(html, 6).is_empty());
        assert_eq!(extract_headlines(html, 4).len(), 1);
    }
}
