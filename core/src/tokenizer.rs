use lazy_static::lazy_static;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    static ref WHITESPACE: Regex = Regex::new(r"\s+").expect("valid regex");
    /// Anything outside ASCII letters and the Vietnamese lowercase letters.
    static ref UNSUPPORTED: Regex = Regex::new(
        "[^a-zA-Záàảãạâấầẩẫậăắằẳẵặđéèẻẽẹêếềểễệíìỉĩịóòỏõọôốồổỗộơớờởỡợúùủũụưứừửữựýỳỷỹỵ]"
    )
    .expect("valid regex");
}

/// Split one field into lowercase tokens stripped of unsupported characters.
///
/// Splitting follows `\s+` semantics: leading or trailing whitespace, and an
/// empty field, produce empty tokens. Those are kept so they count toward the
/// item's keyword length.
pub fn tokenize(text: &str) -> Vec<String> {
    let normalized = text.nfc().collect::<String>().to_lowercase();
    WHITESPACE
        .split(&normalized)
        .map(|word| UNSUPPORTED.replace_all(word, "").into_owned())
        .collect()
}

/// Keywords of an item: tokens of its name, then description, then category name.
pub fn extract_keywords(name: &str, description: &str, category: &str) -> Vec<String> {
    let mut keywords = tokenize(name);
    keywords.extend(tokenize(description));
    keywords.extend(tokenize(category));
    keywords
}
