use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// `review_count` comes back from the model either as a number or as the
/// display string on the page ("12,345 ratings").
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum ReviewCount {
    Count(u64),
    Text(String),
}

/// Structured product record produced by the extraction stage.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct ProductRecord {
    pub title: String,
    #[serde(default)]
    pub asin: Option<String>,
    #[serde(default)]
    pub price: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub rating: Option<String>,
    #[serde(default)]
    pub review_count: Option<ReviewCount>,
    #[serde(default)]
    pub availability: Option<String>,

    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub model_name: Option<String>,
    /// Category path, root first.
    #[serde(default)]
    pub breadcrumbs: Vec<String>,

    /// "About this item" bullet points.
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub specifications: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    pub product_details: BTreeMap<String, serde_json::Value>,

    #[serde(default)]
    pub description_summary: Option<String>,
    #[serde(default)]
    pub full_description: Option<String>,

    #[serde(default)]
    pub best_sellers_rank: Vec<String>,
    #[serde(default)]
    pub warranty_info: Option<String>,

    #[serde(default)]
    pub image_url: Option<String>,
    /// Gallery images.
    #[serde(default)]
    pub images: Vec<String>,
    /// "From the brand" carousel.
    #[serde(default)]
    pub brand_story_images: Vec<String>,
    /// "From the manufacturer" rich content.
    #[serde(default)]
    pub manufacturer_images: Vec<String>,
    #[serde(default)]
    pub description_images: Vec<String>,
    #[serde(default)]
    pub videos: Vec<String>,

    /// Token counters of the extraction call (`input_tokens`, `output_tokens`, `total_tokens`).
    #[serde(default)]
    pub usage: BTreeMap<String, u64>,
}

/// Body of `POST /product/info`: a single URL or a batch.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(untagged)]
pub enum ProductInfoRequest {
    Single { url: String },
    Batch { urls: Vec<String> },
}

/// Per-URL outcome row of a batch call.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct UrlStatus {
    pub url: String,
    pub ok: bool,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct BatchProductResponse {
    /// Successful records only, in request order.
    pub products: Vec<ProductRecord>,
    /// One row per requested URL, in request order.
    pub statuses: Vec<UrlStatus>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_title_is_required() {
        let record: ProductRecord = serde_json::from_str(r#"{"title": "Desk Lamp"}"#).unwrap();
        assert_eq!(record.title, "Desk Lamp");
        assert!(record.images.is_empty());
        assert!(record.usage.is_empty());

        assert!(serde_json::from_str::<ProductRecord>(r#"{"price": "$10"}"#).is_err());
    }

    #[test]
    fn review_count_accepts_number_or_text() {
        let a: ProductRecord =
            serde_json::from_str(r#"{"title": "t", "review_count": 1204}"#).unwrap();
        assert_eq!(a.review_count, Some(ReviewCount::Count(1204)));

        let b: ProductRecord =
            serde_json::from_str(r#"{"title": "t", "review_count": "1,204 ratings"}"#).unwrap();
        assert_eq!(b.review_count, Some(ReviewCount::Text("1,204 ratings".into())));
    }

    #[test]
    fn request_body_accepts_single_and_batch() {
        let single: ProductInfoRequest =
            serde_json::from_str(r#"{"url": "https://shop.example/dp/B01"}"#).unwrap();
        assert!(matches!(single, ProductInfoRequest::Single { .. }));

        let batch: ProductInfoRequest =
            serde_json::from_str(r#"{"urls": ["https://a.example", "https://b.example"]}"#)
                .unwrap();
        match batch {
            ProductInfoRequest::Batch { urls } => assert_eq!(urls.len(), 2),
            other => panic!("unexpected {:?}", other),
        }
    }
}
