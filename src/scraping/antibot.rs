/// Human-verification phrase served instead of the product page.
pub const CAPTCHA_MARKER: &str = "Type the characters you see in this image";

/// Returns the matched marker when `html` is an anti-bot challenge page.
pub fn detect_challenge(html: &str) -> Option<&'static str> {
    html.contains(CAPTCHA_MARKER).then_some(CAPTCHA_MARKER)
}
