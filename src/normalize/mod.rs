//! Markup → bounded, section-tagged text.
//!
//! Everything in here is a pure function of the input markup: no I/O, no clock,
//! no randomness. Identical markup always yields byte-identical output.

pub mod images;
pub mod sections;
pub mod text;

use scraper::Html;
use tracing::debug;

pub use images::{canonicalize_image_url, ImageCollection};
pub use sections::{ManufacturerContent, MANUFACTURER_EXCERPT_LIMIT, PRIMARY_TEXT_LIMIT};

/// Intermediate view of a product page, before rendering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedPage {
    pub primary_text: String,
    pub gallery: ImageCollection,
    pub brand_story: ImageCollection,
    pub manufacturer: ManufacturerContent,
    pub videos: Vec<String>,
}

impl NormalizedPage {
    pub fn from_markup(raw: &str) -> Self {
        let document = Html::parse_document(raw);

        let gallery = images::first_non_empty(images::GALLERY_STRATEGIES, &document, raw);
        let brand_story = images::first_non_empty(images::BRAND_STORY_STRATEGIES, &document, raw);
        let manufacturer = ManufacturerContent::extract(&document);
        let videos = images::discover_videos(raw);
        let primary_text = text::primary_text(&document);

        debug!(
            "normalized page: {} chars body, {} gallery, {} brand, {} manufacturer, {} videos",
            primary_text.len(),
            gallery.len(),
            brand_story.len(),
            manufacturer.images.len(),
            videos.len()
        );

        Self {
            primary_text,
            gallery,
            brand_story,
            manufacturer,
            videos,
        }
    }

    pub fn render(&self) -> String {
        sections::assemble(
            &self.primary_text,
            &self.gallery,
            &self.brand_story,
            &self.manufacturer,
            &self.videos,
        )
    }
}

/// Normalize raw markup into the section-tagged document fed to extraction.
pub fn normalize_markup(raw: &str) -> String {
    NormalizedPage::from_markup(raw).render()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PRODUCT_PAGE: &str = r#"<!doctype html>
<html><head><title>Acme Kettle</title><meta name="description" content="kettle"></head>
<body>
  <header>Deliver to Berlin</header>
  <div id="dp">
    <div id="leftCol">
      <div id="altImages">
        <img src="https://m.example/I/k1._AC_US40_.jpg">
        <img src="https://m.example/I/k2._AC_US40_.jpg">
        <img data-src="https://m.example/I/k1._AC_SX38_.jpg">
      </div>
    </div>
    <div id="centerCol">
      <span id="productTitle">  Acme   Electric Kettle 1.7L </span>
      <span class="a-price">$39.99</span>
      <script>var x = "should not leak";</script>
    </div>
  </div>
  <div class="a-carousel-row"><img src="https://m.example/brand/b1._SR300_.png"></div>
  <div class="aplus-v2 desktop celwidget"><p>Boils in three minutes.</p><img src="https://m.example/aplus/a1.jpg"></div>
  <script>P.register({"url": "https://v.example/demo.mp4", "hiRes": "https://m.example/I/ignored.jpg"});</script>
  <footer>Conditions of use</footer>
</body></html>"#;

    #[test]
    fn extracts_every_section() {
        let page = NormalizedPage::from_markup(PRODUCT_PAGE);
        assert_eq!(page.primary_text, "Acme Electric Kettle 1.7L $39.99");
        assert_eq!(
            page.gallery.urls(),
            ["https://m.example/I/k1.jpg", "https://m.example/I/k2.jpg"]
        );
        assert_eq!(page.brand_story.urls(), ["https://m.example/brand/b1.png"]);
        assert_eq!(page.manufacturer.text, "Boils in three minutes.\n");
        assert_eq!(page.manufacturer.images.urls(), ["https://m.example/aplus/a1.jpg"]);
        assert_eq!(page.videos, ["https://v.example/demo.mp4"]);
    }

    #[test]
    fn output_is_deterministic() {
        let a = normalize_markup(PRODUCT_PAGE);
        let b = normalize_markup(PRODUCT_PAGE);
        assert_eq!(a, b);
        assert!(a.starts_with("Acme Electric Kettle 1.7L $39.99\n\n--- [SECTION: GALLERY IMAGES] ---\n"));
        assert!(a.contains("Text: Boils in three minutes.\n...\nImages:\nhttps://m.example/aplus/a1.jpg"));
        assert!(a.ends_with("--- [SECTION: VIDEOS] ---\nhttps://v.example/demo.mp4"));
    }

    #[test]
    fn sparse_markup_still_renders_every_section() {
        for raw in ["", "<html></html>", "<<<not really html", "<body></body>"] {
            let doc = normalize_markup(raw);
            for header in [
                sections::GALLERY_HEADER,
                sections::BRAND_STORY_HEADER,
                sections::MANUFACTURER_HEADER,
                sections::VIDEOS_HEADER,
            ] {
                assert!(doc.contains(header), "missing {header} for {raw:?}");
            }
        }
    }

    #[test]
    fn empty_gallery_renders_as_empty_list() {
        let doc = normalize_markup("<html><body><p>Just text</p></body></html>");
        assert!(doc.contains(
            "--- [SECTION: GALLERY IMAGES] ---\n\n\n--- [SECTION: BRAND STORY IMAGES] ---"
        ));
    }
}
