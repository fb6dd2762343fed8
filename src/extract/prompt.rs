/// Field schema given to the model. List-valued image/video fields point at the
/// section headers emitted by the normalizer.
const FIELD_SCHEMA: &str = r#"fields:
- title (string)
- asin (string, look for "ASIN" in the details)
- price (string, with currency symbol)
- currency (string, ISO code)
- rating (string)
- review_count (integer or string)
- availability (string)
- brand (string)
- model_name (string)
- breadcrumbs (list of strings, category path)
- features (list of strings, ALL bullet points from "About this item")
- specifications (object of key-value pairs from the "Product information" or specs table)
- full_description (string, SUMMARY ONLY, max 200 characters)
- product_details (object of other detail key-value pairs)
- description_summary (string, brief summary, max 200 characters)
- best_sellers_rank (list of strings)
- warranty_info (string)
- image_url (string, main product image)
- images (list of strings, ONLY from '[SECTION: GALLERY IMAGES]')
- brand_story_images (list of strings, ONLY from '[SECTION: BRAND STORY IMAGES]')
- manufacturer_images (list of strings, ONLY from '[SECTION: MANUFACTURER CONTENT]')
- videos (list of strings, ONLY from '[SECTION: VIDEOS]')"#;

/// Build the extraction prompt around the normalized page text.
pub fn build_extraction_prompt(normalized_text: &str) -> String {
    format!(
        "You are a product-data extraction assistant. Extract comprehensive product information from the page text below.\n\n\
         TEXT:\n{normalized_text}\n\n\
         Extract the following fields into a single JSON object. Extract everything you can find; omit nothing that is present.\n\
         Keep free-text summary fields short (max 200 characters). Take list-valued image and video fields strictly from their labeled sections.\n\n\
         {FIELD_SCHEMA}\n\n\
         Respond ONLY with the raw JSON object, no surrounding prose."
    )
}
