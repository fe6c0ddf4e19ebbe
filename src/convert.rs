//! HTML body to Markdown conversion.
//!
//! Images are removed before conversion; they travel to the journal as a
//! downloaded attachment instead of inline references.

use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use tracing::{debug, instrument};

static IMG: Lazy<Selector> = Lazy::new(|| Selector::parse("img").unwrap());

/// Strip every `<img>` from `html` and render the rest as Markdown.
///
/// Hyperlinks are kept as inline Markdown links and no line wrapping is
/// applied.
#[instrument(level = "debug", skip_all, fields(html_bytes = html.len()))]
pub fn to_markdown(html: &str) -> String {
    let mut fragment = Html::parse_fragment(html);

    let images: Vec<_> = fragment.select(&IMG).map(|img| img.id()).collect();
    for id in &images {
        if let Some(mut node) = fragment.tree.get_mut(*id) {
            node.detach();
        }
    }
    debug!(removed_images = images.len(), "Stripped image elements");

    html2md::parse_html(&fragment.root_element().inner_html())
}

/// Prefix a Markdown body with a level-2 heading holding the title.
pub fn format_entry(title: &str, markdown_body: &str) -> String {
    format!("## {title}\n\n{markdown_body}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_images_removed_links_kept() {
        let html = r#"<p>Hi <img src="http://x/a.jpg"> <a href="http://y">link</a></p>"#;
        let md = to_markdown(html);

        assert!(md.contains("[link](http://y)"), "got: {md}");
        assert!(md.contains("Hi"));
        assert!(!md.contains("a.jpg"));
        assert!(!md.contains("!["));
    }

    #[test]
    fn test_every_anchor_becomes_a_link() {
        let html = r#"<h3>List</h3><ul>
            <li><a href="https://one.example/">one</a></li>
            <li><a href="https://two.example/path?q=1">two</a></li>
        </ul><p><img src="x.png" alt="pic"><a href="https://three.example">three</a></p>"#;
        let md = to_markdown(html);

        assert!(md.contains("](https://one.example/)"));
        assert!(md.contains("](https://two.example/path?q=1)"));
        assert!(md.contains("](https://three.example)"));
        assert!(!md.contains("x.png"));
    }

    #[test]
    fn test_nested_images_removed() {
        let html = r#"<figure><a href="http://full/size.jpg"><img src="http://thumb/size.jpg"></a><figcaption>Caption</figcaption></figure>"#;
        let md = to_markdown(html);

        assert!(!md.contains("thumb"));
        assert!(md.contains("Caption"));
    }

    #[test]
    fn test_long_paragraph_not_wrapped() {
        let sentence = "word ".repeat(60);
        let html = format!("<p>{}</p>", sentence.trim_end());
        let md = to_markdown(&html);

        assert_eq!(md.trim().lines().count(), 1);
    }

    #[test]
    fn test_format_entry() {
        assert_eq!(
            format_entry("Title", "Body text\n"),
            "## Title\n\nBody text\n"
        );
    }
}
