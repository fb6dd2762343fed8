//! Image URL canonicalization and per-section image collections.

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use std::sync::OnceLock;

/// Resize/thumbnail marker inserted before the file extension, e.g. `._AC_SL1500_.jpg`.
static RESIZE_MARKER: OnceLock<Regex> = OnceLock::new();

fn resize_marker() -> &'static Regex {
    RESIZE_MARKER.get_or_init(|| Regex::new(r"\._.+?_(\.[a-z]+)$").expect("valid resize-marker regex"))
}

/// Strip the vendor resize marker so the URL points at the full-resolution variant.
///
/// Idempotent: a URL without a marker is returned unchanged.
pub fn canonicalize_image_url(url: &str) -> String {
    resize_marker().replace(url, "$1").into_owned()
}

/// Ordered, duplicate-free list of canonical image URLs (first-seen order).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageCollection {
    urls: Vec<String>,
    seen: HashSet<String>,
}

impl ImageCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Canonicalize and append `raw` unless empty or already present.
    /// Returns `true` when the URL was added.
    pub fn push(&mut self, raw: &str) -> bool {
        let raw = raw.trim();
        if raw.is_empty() {
            return false;
        }
        let canonical = canonicalize_image_url(raw);
        if self.seen.insert(canonical.clone()) {
            self.urls.push(canonical);
            true
        } else {
            false
        }
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn urls(&self) -> &[String] {
        &self.urls
    }

    /// Keep only the first `n` URLs.
    pub fn truncate(&mut self, n: usize) {
        for dropped in self.urls.drain(n.min(self.urls.len())..) {
            self.seen.remove(&dropped);
        }
    }

    /// Newline-joined rendering used in the section appendices.
    pub fn render(&self) -> String {
        self.urls.join("\n")
    }
}

impl<'a> FromIterator<&'a str> for ImageCollection {
    fn from_iter<T: IntoIterator<Item = &'a str>>(iter: T) -> Self {
        let mut c = ImageCollection::new();
        for u in iter {
            c.push(u);
        }
        c
    }
}

/// Source attributes for gallery / brand-story images, in priority order.
pub const BASIC_SOURCE_ATTRS: &[&str] = &["src", "data-src"];
/// Manufacturer content also exposes the hi-res original.
pub const RICH_SOURCE_ATTRS: &[&str] = &["src", "data-src", "data-old-hires"];

/// First non-empty source attribute of an `<img>`.
pub fn image_source<'a>(img: &ElementRef<'a>, attrs: &[&str]) -> Option<&'a str> {
    attrs
        .iter()
        .filter_map(|a| img.value().attr(a))
        .find(|v| !v.trim().is_empty())
}

/// Collect every `<img>` below `container` into `into`.
pub fn collect_images(container: &ElementRef<'_>, attrs: &[&str], into: &mut ImageCollection) {
    let Ok(img_sel) = Selector::parse("img") else {
        return;
    };
    for img in container.select(&img_sel) {
        if let Some(src) = image_source(&img, attrs) {
            into.push(src);
        }
    }
}

// ── Section strategies ──────────────────────────────────────────────────────

/// One way of finding a section's images. Strategies are tried in order and
/// the first non-empty result wins.
pub type ImageStrategy = fn(&Html, &str) -> Option<ImageCollection>;

/// Max images taken from the embedded-JSON gallery fallback.
pub const GALLERY_FALLBACK_CAP: usize = 15;

pub const GALLERY_STRATEGIES: &[ImageStrategy] = &[gallery_from_thumbnail_strip, gallery_from_hires_json];
pub const BRAND_STORY_STRATEGIES: &[ImageStrategy] = &[brand_story_from_carousel];

/// Run strategies in order; empty collection if none produces anything.
pub fn first_non_empty(strategies: &[ImageStrategy], document: &Html, raw: &str) -> ImageCollection {
    strategies
        .iter()
        .find_map(|s| s(document, raw).filter(|c| !c.is_empty()))
        .unwrap_or_default()
}

/// Thumbnail strip container (`#altImages`).
pub fn gallery_from_thumbnail_strip(document: &Html, _raw: &str) -> Option<ImageCollection> {
    let sel = Selector::parse("#altImages").ok()?;
    let container = document.select(&sel).next()?;
    let mut images = ImageCollection::new();
    collect_images(&container, BASIC_SOURCE_ATTRS, &mut images);
    Some(images)
}

static HIRES_JSON: OnceLock<Regex> = OnceLock::new();

/// Image data embedded in page scripts: `"hiRes": "https://…jpg"`.
pub fn gallery_from_hires_json(_document: &Html, raw: &str) -> Option<ImageCollection> {
    let re = HIRES_JSON
        .get_or_init(|| Regex::new(r#""hiRes":\s*"(https://[^"]+?\.jpg)""#).expect("valid hiRes regex"));
    let mut images: ImageCollection = re
        .captures_iter(raw)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str())
        .collect();
    images.truncate(GALLERY_FALLBACK_CAP);
    Some(images)
}

/// "From the brand" carousel. Markup varies, so the selector is deliberately broad
/// and only the first matching row is used.
pub fn brand_story_from_carousel(document: &Html, _raw: &str) -> Option<ImageCollection> {
    let sel = Selector::parse(".a-carousel-row").ok()?;
    let container = document.select(&sel).next()?;
    let mut images = ImageCollection::new();
    collect_images(&container, BASIC_SOURCE_ATTRS, &mut images);
    Some(images)
}

static VIDEO_URL: OnceLock<Regex> = OnceLock::new();

/// Video URLs referenced from embedded JSON (`"url": "https://…mp4"`), first-seen order.
pub fn discover_videos(raw: &str) -> Vec<String> {
    let re = VIDEO_URL
        .get_or_init(|| Regex::new(r#""url":\s*"(https://[^"]+?\.mp4)""#).expect("valid video regex"));
    let mut seen = HashSet::new();
    re.captures_iter(raw)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .filter(|u| seen.insert(u.clone()))
        .collect()
}
