use serde::Serialize;

/// A UI language the settings store accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageInfo {
    /// Language code as stored in settings.
    pub code: &'static str,
    /// English name.
    pub name: &'static str,
    /// Name in the language itself.
    pub native_name: &'static str,
    /// Whether text runs right to left.
    pub rtl: bool,
}

const fn lang(
    code: &'static str,
    name: &'static str,
    native_name: &'static str,
    rtl: bool,
) -> LanguageInfo {
    LanguageInfo {
        code,
        name,
        native_name,
        rtl,
    }
}

/// Default language and final fallback.
pub const FALLBACK_LANGUAGE: &str = "en";

/// Every supported language.
pub const SUPPORTED_LANGUAGES: [LanguageInfo; 10] = [
    lang("en", "English", "English", false),
    lang("es", "Spanish", "Español", false),
    lang("zh-CN", "Chinese (Simplified)", "中文 (简体)", false),
    lang("fr", "French", "Français", false),
    lang("de", "German", "Deutsch", false),
    lang("pt", "Portuguese", "Português", false),
    lang("ja", "Japanese", "日本語", false),
    lang("ko", "Korean", "한국어", false),
    lang("ru", "Russian", "Русский", false),
    lang("ar", "Arabic", "العربية", true),
];

/// Looks up a language by exact code.
pub fn language_info(code: &str) -> Option<&'static LanguageInfo> {
    SUPPORTED_LANGUAGES.iter().find(|info| info.code == code)
}

/// Reduces a locale such as `pt-BR` or `en_US.UTF-8` to a catalog code.
///
/// Simplified Chinese keeps its region because the catalog lists it that way.
pub fn extract_language_code(locale: &str) -> String {
    let lowered = locale.trim().to_ascii_lowercase();
    if lowered.starts_with("zh-cn") || lowered.starts_with("zh_cn") {
        return "zh-CN".to_owned();
    }
    lowered
        .split(['-', '_', '.'])
        .next()
        .unwrap_or_default()
        .to_owned()
}

/// Picks the UI language: saved preference, then locale, then English.
pub fn detect_language(saved: Option<&str>, locale: Option<&str>) -> &'static str {
    if let Some(info) = saved.and_then(language_info) {
        return info.code;
    }
    locale
        .map(extract_language_code)
        .and_then(|code| language_info(&code))
        .map_or(FALLBACK_LANGUAGE, |info| info.code)
}
