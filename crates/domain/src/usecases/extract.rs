//! Metadata extraction - title, category, hashtags and image reference from article markup

use scraper::{ElementRef, Html, Selector};
use thiserror::Error;

use crate::model::{ArticleMetadata, ImageRef};

/// Error type for metadata extraction
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("No usable title")]
    MissingTitle,
    #[error("Invalid selector {selector}: {message}")]
    Selector { selector: String, message: String },
}

fn selector(css: &str) -> Result<Selector, ExtractError> {
    Selector::parse(css).map_err(|e| ExtractError::Selector {
        selector: css.to_string(),
        message: e.to_string(),
    })
}

/// Extract announcement metadata from an article document
pub fn extract_metadata(html: &str, brand_hashtag: &str) -> Result<ArticleMetadata, ExtractError> {
    let document = Html::parse_document(html);

    let title = document
        .select(&selector("title")?)
        .next()
        .map(|t| t.text().collect::<String>().trim().to_string())
        .filter(|t| !t.is_empty())
        .ok_or(ExtractError::MissingTitle)?;

    let category = first_attr(&document, r#"meta[property="article:section"]"#, "content")?
        .or(first_attr(&document, r#"meta[name="category"]"#, "content")?);

    let hashtags = derive_hashtags(brand_hashtag, Some(&title), category.as_deref());
    let image = find_image(&document)?;

    tracing::debug!(
        title = %title,
        category = ?category,
        image = ?image.as_ref().map(|i| &i.src),
        "Extracted metadata"
    );

    Ok(ArticleMetadata {
        title,
        category,
        hashtags,
        image,
    })
}

/// Derive at most two hashtags: the brand tag, then one from category or title
pub fn derive_hashtags(brand: &str, title: Option<&str>, category: Option<&str>) -> Vec<String> {
    let mut candidates = vec![brand.to_string()];

    if let Some(category) = category.filter(|c| !c.trim().is_empty()) {
        let normalized: String = category.chars().filter(|c| *c != ' ').collect();
        candidates.push(format!("#{}", normalized.to_lowercase()));
    } else if let Some(word) = title.and_then(|t| t.split_whitespace().next()) {
        candidates.push(format!("#{}", word.to_lowercase()));
    }

    let mut hashtags: Vec<String> = Vec::with_capacity(2);
    for tag in candidates {
        if !hashtags.contains(&tag) {
            hashtags.push(tag);
        }
    }
    hashtags.truncate(2);
    hashtags
}

fn first_attr(document: &Html, css: &str, attr: &str) -> Result<Option<String>, ExtractError> {
    let selector = selector(css)?;
    Ok(document
        .select(&selector)
        .filter_map(|el| el.value().attr(attr))
        .map(str::trim)
        .find(|v| !v.is_empty())
        .map(String::from))
}

/// Image reference, first match wins: social preview metadata, then the
/// first inline image of the main content
fn find_image(document: &Html) -> Result<Option<ImageRef>, ExtractError> {
    let metadata_sources = [
        (r#"meta[property="og:image"]"#, "content"),
        (r#"meta[name="twitter:image"]"#, "content"),
        (r#"link[rel="image_src"]"#, "href"),
    ];

    for (css, attr) in metadata_sources {
        if let Some(src) = first_attr(document, css, attr)? {
            return Ok(Some(ImageRef {
                src,
                embedded_alt: None,
            }));
        }
    }

    let Some(img) = document.select(&selector("article img")?).next() else {
        return Ok(None);
    };
    let Some(src) = img.value().attr("src").map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };

    let alt = img
        .value()
        .attr("alt")
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .map(String::from);

    let embedded_alt = match alt {
        Some(alt) => Some(alt),
        None => figure_caption(img)?,
    };

    Ok(Some(ImageRef {
        src: src.to_string(),
        embedded_alt,
    }))
}

fn figure_caption(img: ElementRef<'_>) -> Result<Option<String>, ExtractError> {
    let Some(figure) = img
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().name() == "figure")
    else {
        return Ok(None);
    };

    Ok(figure
        .select(&selector("figcaption")?)
        .next()
        .map(|c| c.text().collect::<String>().trim().to_string())
        .filter(|c| !c.is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const BRAND: &str = "#HorizonLibre";

    fn page(head: &str, body: &str) -> String {
        format!("<html><head>{}</head><body>{}</body></html>", head, body)
    }

    #[test]
    fn test_extracts_title_and_section_category() {
        let html = page(
            r#"<title>  Budget Vote  </title>
               <meta property="article:section" content="politique">
               <meta name="category" content="culture">"#,
            "",
        );

        let meta = extract_metadata(&html, BRAND).unwrap();

        assert_eq!(meta.title, "Budget Vote");
        assert_eq!(meta.category.as_deref(), Some("politique"));
        assert_eq!(meta.hashtags, vec!["#HorizonLibre", "#politique"]);
        assert!(meta.image.is_none());
    }

    #[test]
    fn test_category_falls_back_to_generic_meta() {
        let html = page(
            r#"<title>Title</title><meta name="category" content="International Affairs">"#,
            "",
        );

        let meta = extract_metadata(&html, BRAND).unwrap();

        assert_eq!(meta.category.as_deref(), Some("International Affairs"));
        assert_eq!(meta.hashtags[1], "#internationalaffairs");
    }

    #[test]
    fn test_missing_title_is_an_error() {
        let html = page("", "<p>No title here</p>");
        assert!(matches!(
            extract_metadata(&html, BRAND),
            Err(ExtractError::MissingTitle)
        ));

        let blank = page("<title>   </title>", "");
        assert!(matches!(
            extract_metadata(&blank, BRAND),
            Err(ExtractError::MissingTitle)
        ));
    }

    #[test]
    fn test_hashtag_from_title_without_category() {
        let tags = derive_hashtags(BRAND, Some("Élections Régionales 2026"), None);
        assert_eq!(tags, vec!["#HorizonLibre", "#élections"]);
    }

    #[test]
    fn test_hashtags_deduplicated_and_bounded() {
        let tags = derive_hashtags(BRAND, Some("x"), Some("HorizonLibre"));
        // "#horizonlibre" differs in case from the brand tag, so both stay
        assert_eq!(tags.len(), 2);

        let same = derive_hashtags("#culture", None, Some("Culture"));
        assert_eq!(same, vec!["#culture"]);

        let none = derive_hashtags(BRAND, None, None);
        assert_eq!(none, vec!["#HorizonLibre"]);
    }

    #[test]
    fn test_og_image_wins_over_inline_image() {
        let html = page(
            r#"<title>T</title>
               <meta name="twitter:image" content="https://x.example/tw.jpg">
               <meta property="og:image" content="https://x.example/og.jpg">"#,
            r#"<article><img src="inline.jpg" alt="Inline"></article>"#,
        );

        let image = extract_metadata(&html, BRAND).unwrap().image.unwrap();

        assert_eq!(image.src, "https://x.example/og.jpg");
        assert!(image.embedded_alt.is_none());
    }

    #[test]
    fn test_image_src_link_used_before_inline() {
        let html = page(
            r#"<title>T</title><link rel="image_src" href="/img/cover.png">"#,
            r#"<article><img src="inline.jpg"></article>"#,
        );

        let image = extract_metadata(&html, BRAND).unwrap().image.unwrap();
        assert_eq!(image.src, "/img/cover.png");
    }

    #[test]
    fn test_inline_image_alt_text_captured() {
        let html = page(
            "<title>T</title>",
            r#"<img src="outside.jpg"><article><p>Text</p><img src="../img/vote.jpg" alt="Deputies voting"></article>"#,
        );

        let image = extract_metadata(&html, BRAND).unwrap().image.unwrap();

        assert_eq!(image.src, "../img/vote.jpg");
        assert_eq!(image.embedded_alt.as_deref(), Some("Deputies voting"));
    }

    #[test]
    fn test_inline_image_falls_back_to_figcaption() {
        let html = page(
            "<title>T</title>",
            r#"<article><figure><img src="a.jpg" alt=""><figcaption> The assembly at night </figcaption></figure></article>"#,
        );

        let image = extract_metadata(&html, BRAND).unwrap().image.unwrap();
        assert_eq!(image.embedded_alt.as_deref(), Some("The assembly at night"));
    }

    #[test]
    fn test_image_outside_article_ignored() {
        let html = page("<title>T</title>", r#"<img src="logo.png">"#);
        assert!(extract_metadata(&html, BRAND).unwrap().image.is_none());
    }
}
