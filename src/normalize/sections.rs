use scraper::{Html, Selector};

use super::images::{collect_images, ImageCollection, RICH_SOURCE_ATTRS};
use super::text::{fragment_text, truncate_chars};

/// Hard cap on the primary body, in characters.
pub const PRIMARY_TEXT_LIMIT: usize = 50_000;
/// Hard cap on the manufacturer excerpt, in characters (before the `...` marker).
pub const MANUFACTURER_EXCERPT_LIMIT: usize = 1_000;

// Section headers. The extraction prompt refers to these labels verbatim.
pub const GALLERY_HEADER: &str = "--- [SECTION: GALLERY IMAGES] ---";
pub const BRAND_STORY_HEADER: &str = "--- [SECTION: BRAND STORY IMAGES] ---";
pub const MANUFACTURER_HEADER: &str = "--- [SECTION: MANUFACTURER CONTENT (.aplus-v2)] ---";
pub const VIDEOS_HEADER: &str = "--- [SECTION: VIDEOS] ---";

/// "From the manufacturer" rich content: text excerpt plus images.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManufacturerContent {
    pub text: String,
    pub images: ImageCollection,
}

impl ManufacturerContent {
    /// Accumulate every `.aplus-v2.desktop.celwidget` block; one text line per block.
    pub fn extract(document: &Html) -> Self {
        let mut content = ManufacturerContent::default();
        let Ok(sel) = Selector::parse(".aplus-v2.desktop.celwidget") else {
            return content;
        };
        for block in document.select(&sel) {
            content.text.push_str(&fragment_text(&block));
            content.text.push('\n');
            collect_images(&block, RICH_SOURCE_ATTRS, &mut content.images);
        }
        content
    }

    pub fn excerpt(&self) -> &str {
        truncate_chars(&self.text, MANUFACTURER_EXCERPT_LIMIT)
    }
}

/// Render the section-tagged document. Section order is fixed.
pub fn assemble(
    primary: &str,
    gallery: &ImageCollection,
    brand_story: &ImageCollection,
    manufacturer: &ManufacturerContent,
    videos: &[String],
) -> String {
    let mut out = String::with_capacity(primary.len().min(PRIMARY_TEXT_LIMIT * 4) + 4096);
    out.push_str(truncate_chars(primary, PRIMARY_TEXT_LIMIT));

    out.push_str("\n\n");
    out.push_str(GALLERY_HEADER);
    out.push('\n');
    out.push_str(&gallery.render());

    out.push_str("\n\n");
    out.push_str(BRAND_STORY_HEADER);
    out.push('\n');
    out.push_str(&brand_story.render());

    out.push_str("\n\n");
    out.push_str(MANUFACTURER_HEADER);
    out.push('\n');
    out.push_str("Text: ");
    out.push_str(manufacturer.excerpt());
    out.push_str("...\n");
    out.push_str("Images:\n");
    out.push_str(&manufacturer.images.render());

    out.push_str("\n\n");
    out.push_str(VIDEOS_HEADER);
    out.push('\n');
    out.push_str(&videos.join("\n"));

    out
}
