use nb_core::{Error, RawSnippet, Result};
use scraper::{ElementRef, Html, Selector};

const STORY: &str = "div.search-results__story";
const HEADLINE: &str = "h3.story__headline a";
const DATE: &str = "span.story__date";
const EXCERPT: &str = "p.story__excerpt";
const IMAGE: &str = "img";

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| Error::Extraction(format!("invalid selector {css}: {e}")))
}

fn text_of(story: ElementRef, sel: &Selector, what: &str, position: usize) -> Result<String> {
    story
        .select(sel)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .ok_or_else(|| Error::Extraction(format!("story {position} has no {what}")))
}

/// Parses the outer HTML of one search-results listing into raw snippets,
/// in listing order. A story missing its headline, date or excerpt is an
/// extraction failure; a missing image is not.
pub fn parse_snippets(html: &str) -> Result<Vec<RawSnippet>> {
    let document = Html::parse_fragment(html);
    let story_sel = selector(STORY)?;
    let headline_sel = selector(HEADLINE)?;
    let date_sel = selector(DATE)?;
    let excerpt_sel = selector(EXCERPT)?;
    let image_sel = selector(IMAGE)?;

    let mut snippets = Vec::new();
    for (i, story) in document.select(&story_sel).enumerate() {
        let position = i + 1;
        let title = text_of(story, &headline_sel, "headline", position)?;
        let date_text = text_of(story, &date_sel, "date", position)?;
        let description = text_of(story, &excerpt_sel, "excerpt", position)?;
        let image_url = story
            .select(&image_sel)
            .next()
            .and_then(|el| el.value().attr("src"))
            .map(str::to_string);

        snippets.push(RawSnippet {
            title,
            date_text,
            description,
            image_url,
        });
    }

    Ok(snippets)
}
