//! Static locale catalog.

use std::collections::HashMap;
use std::sync::LazyLock;

/// Language used when a locale is empty or not in the catalog.
pub const DEFAULT_LANGUAGE: &str = "en";

/// One catalog entry. `country` and `iso3_country` are empty for bare languages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Locale {
    pub code: &'static str,
    pub language: &'static str,
    pub country: &'static str,
    pub iso3_language: &'static str,
    pub iso3_country: &'static str,
    pub display_name: &'static str,
}

const fn locale(
    code: &'static str,
    language: &'static str,
    country: &'static str,
    iso3_language: &'static str,
    iso3_country: &'static str,
    display_name: &'static str,
) -> Locale {
    Locale {
        code,
        language,
        country,
        iso3_language,
        iso3_country,
        display_name,
    }
}

static LOCALES: &[Locale] = &[
    locale("af", "af", "", "afr", "", "Afrikaans"),
    locale("af-ZA", "af", "ZA", "afr", "ZAF", "Afrikaans (South Africa)"),
    locale("ar", "ar", "", "ara", "", "Arabic"),
    locale("ar-AE", "ar", "AE", "ara", "ARE", "Arabic (United Arab Emirates)"),
    locale("ar-EG", "ar", "EG", "ara", "EGY", "Arabic (Egypt)"),
    locale("ar-SA", "ar", "SA", "ara", "SAU", "Arabic (Saudi Arabia)"),
    locale("bg", "bg", "", "bul", "", "Bulgarian"),
    locale("bg-BG", "bg", "BG", "bul", "BGR", "Bulgarian (Bulgaria)"),
    locale("bn", "bn", "", "ben", "", "Bangla"),
    locale("bn-IN", "bn", "IN", "ben", "IND", "Bangla (India)"),
    locale("ca", "ca", "", "cat", "", "Catalan"),
    locale("ca-ES", "ca", "ES", "cat", "ESP", "Catalan (Spain)"),
    locale("cs", "cs", "", "ces", "", "Czech"),
    locale("cs-CZ", "cs", "CZ", "ces", "CZE", "Czech (Czechia)"),
    locale("da", "da", "", "dan", "", "Danish"),
    locale("da-DK", "da", "DK", "dan", "DNK", "Danish (Denmark)"),
    locale("de", "de", "", "deu", "", "German"),
    locale("de-AT", "de", "AT", "deu", "AUT", "German (Austria)"),
    locale("de-CH", "de", "CH", "deu", "CHE", "German (Switzerland)"),
    locale("de-DE", "de", "DE", "deu", "DEU", "German (Germany)"),
    locale("de-LI", "de", "LI", "deu", "LIE", "German (Liechtenstein)"),
    locale("de-LU", "de", "LU", "deu", "LUX", "German (Luxembourg)"),
    locale("el", "el", "", "ell", "", "Greek"),
    locale("el-GR", "el", "GR", "ell", "GRC", "Greek (Greece)"),
    locale("en", "en", "", "eng", "", "English"),
    locale("en-AU", "en", "AU", "eng", "AUS", "English (Australia)"),
    locale("en-CA", "en", "CA", "eng", "CAN", "English (Canada)"),
    locale("en-GB", "en", "GB", "eng", "GBR", "English (United Kingdom)"),
    locale("en-IE", "en", "IE", "eng", "IRL", "English (Ireland)"),
    locale("en-IN", "en", "IN", "eng", "IND", "English (India)"),
    locale("en-NZ", "en", "NZ", "eng", "NZL", "English (New Zealand)"),
    locale("en-SG", "en", "SG", "eng", "SGP", "English (Singapore)"),
    locale("en-US", "en", "US", "eng", "USA", "English (United States)"),
    locale("en-ZA", "en", "ZA", "eng", "ZAF", "English (South Africa)"),
    locale("es", "es", "", "spa", "", "Spanish"),
    locale("es-AR", "es", "AR", "spa", "ARG", "Spanish (Argentina)"),
    locale("es-CL", "es", "CL", "spa", "CHL", "Spanish (Chile)"),
    locale("es-CO", "es", "CO", "spa", "COL", "Spanish (Colombia)"),
    locale("es-ES", "es", "ES", "spa", "ESP", "Spanish (Spain)"),
    locale("es-MX", "es", "MX", "spa", "MEX", "Spanish (Mexico)"),
    locale("es-US", "es", "US", "spa", "USA", "Spanish (United States)"),
    locale("et", "et", "", "est", "", "Estonian"),
    locale("et-EE", "et", "EE", "est", "EST", "Estonian (Estonia)"),
    locale("fa", "fa", "", "fas", "", "Persian"),
    locale("fa-IR", "fa", "IR", "fas", "IRN", "Persian (Iran)"),
    locale("fi", "fi", "", "fin", "", "Finnish"),
    locale("fi-FI", "fi", "FI", "fin", "FIN", "Finnish (Finland)"),
    locale("fr", "fr", "", "fra", "", "French"),
    locale("fr-BE", "fr", "BE", "fra", "BEL", "French (Belgium)"),
    locale("fr-CA", "fr", "CA", "fra", "CAN", "French (Canada)"),
    locale("fr-CH", "fr", "CH", "fra", "CHE", "French (Switzerland)"),
    locale("fr-FR", "fr", "FR", "fra", "FRA", "French (France)"),
    locale("fr-LU", "fr", "LU", "fra", "LUX", "French (Luxembourg)"),
    locale("he", "he", "", "heb", "", "Hebrew"),
    locale("he-IL", "he", "IL", "heb", "ISR", "Hebrew (Israel)"),
    locale("hi", "hi", "", "hin", "", "Hindi"),
    locale("hi-IN", "hi", "IN", "hin", "IND", "Hindi (India)"),
    locale("hr", "hr", "", "hrv", "", "Croatian"),
    locale("hr-HR", "hr", "HR", "hrv", "HRV", "Croatian (Croatia)"),
    locale("hu", "hu", "", "hun", "", "Hungarian"),
    locale("hu-HU", "hu", "HU", "hun", "HUN", "Hungarian (Hungary)"),
    locale("id", "id", "", "ind", "", "Indonesian"),
    locale("id-ID", "id", "ID", "ind", "IDN", "Indonesian (Indonesia)"),
    locale("is", "is", "", "isl", "", "Icelandic"),
    locale("is-IS", "is", "IS", "isl", "ISL", "Icelandic (Iceland)"),
    locale("it", "it", "", "ita", "", "Italian"),
    locale("it-CH", "it", "CH", "ita", "CHE", "Italian (Switzerland)"),
    locale("it-IT", "it", "IT", "ita", "ITA", "Italian (Italy)"),
    locale("ja", "ja", "", "jpn", "", "Japanese"),
    locale("ja-JP", "ja", "JP", "jpn", "JPN", "Japanese (Japan)"),
    locale("ko", "ko", "", "kor", "", "Korean"),
    locale("ko-KR", "ko", "KR", "kor", "KOR", "Korean (South Korea)"),
    locale("lt", "lt", "", "lit", "", "Lithuanian"),
    locale("lt-LT", "lt", "LT", "lit", "LTU", "Lithuanian (Lithuania)"),
    locale("lv", "lv", "", "lav", "", "Latvian"),
    locale("lv-LV", "lv", "LV", "lav", "LVA", "Latvian (Latvia)"),
    locale("ms", "ms", "", "msa", "", "Malay"),
    locale("ms-MY", "ms", "MY", "msa", "MYS", "Malay (Malaysia)"),
    locale("nb", "nb", "", "nob", "", "Norwegian Bokmal"),
    locale("nb-NO", "nb", "NO", "nob", "NOR", "Norwegian Bokmal (Norway)"),
    locale("nl", "nl", "", "nld", "", "Dutch"),
    locale("nl-BE", "nl", "BE", "nld", "BEL", "Dutch (Belgium)"),
    locale("nl-NL", "nl", "NL", "nld", "NLD", "Dutch (Netherlands)"),
    locale("pl", "pl", "", "pol", "", "Polish"),
    locale("pl-PL", "pl", "PL", "pol", "POL", "Polish (Poland)"),
    locale("pt", "pt", "", "por", "", "Portuguese"),
    locale("pt-BR", "pt", "BR", "por", "BRA", "Portuguese (Brazil)"),
    locale("pt-PT", "pt", "PT", "por", "PRT", "Portuguese (Portugal)"),
    locale("ro", "ro", "", "ron", "", "Romanian"),
    locale("ro-RO", "ro", "RO", "ron", "ROU", "Romanian (Romania)"),
    locale("ru", "ru", "", "rus", "", "Russian"),
    locale("ru-RU", "ru", "RU", "rus", "RUS", "Russian (Russia)"),
    locale("sk", "sk", "", "slk", "", "Slovak"),
    locale("sk-SK", "sk", "SK", "slk", "SVK", "Slovak (Slovakia)"),
    locale("sl", "sl", "", "slv", "", "Slovenian"),
    locale("sl-SI", "sl", "SI", "slv", "SVN", "Slovenian (Slovenia)"),
    locale("sr", "sr", "", "srp", "", "Serbian"),
    locale("sr-RS", "sr", "RS", "srp", "SRB", "Serbian (Serbia)"),
    locale("sv", "sv", "", "swe", "", "Swedish"),
    locale("sv-FI", "sv", "FI", "swe", "FIN", "Swedish (Finland)"),
    locale("sv-SE", "sv", "SE", "swe", "SWE", "Swedish (Sweden)"),
    locale("sw", "sw", "", "swa", "", "Swahili"),
    locale("sw-KE", "sw", "KE", "swa", "KEN", "Swahili (Kenya)"),
    locale("ta", "ta", "", "tam", "", "Tamil"),
    locale("ta-IN", "ta", "IN", "tam", "IND", "Tamil (India)"),
    locale("th", "th", "", "tha", "", "Thai"),
    locale("th-TH", "th", "TH", "tha", "THA", "Thai (Thailand)"),
    locale("tr", "tr", "", "tur", "", "Turkish"),
    locale("tr-TR", "tr", "TR", "tur", "TUR", "Turkish (Turkey)"),
    locale("uk", "uk", "", "ukr", "", "Ukrainian"),
    locale("uk-UA", "uk", "UA", "ukr", "UKR", "Ukrainian (Ukraine)"),
    locale("vi", "vi", "", "vie", "", "Vietnamese"),
    locale("vi-VN", "vi", "VN", "vie", "VNM", "Vietnamese (Vietnam)"),
    locale("zh", "zh", "", "zho", "", "Chinese"),
    locale("zh-CN", "zh", "CN", "zho", "CHN", "Chinese (China)"),
    locale("zh-Hans", "zh", "", "zho", "", "Chinese (Simplified)"),
    locale("zh-Hant", "zh", "", "zho", "", "Chinese (Traditional)"),
    locale("zh-HK", "zh", "HK", "zho", "HKG", "Chinese (Hong Kong)"),
    locale("zh-TW", "zh", "TW", "zho", "TWN", "Chinese (Taiwan)"),
];

static BY_CODE: LazyLock<HashMap<String, &'static Locale>> = LazyLock::new(|| {
    LOCALES
        .iter()
        .map(|l| (l.code.to_ascii_lowercase(), l))
        .collect()
});

/// Catalog entry for `code`, matched case-insensitively; `_` is accepted for `-`.
#[must_use]
pub fn find(code: &str) -> Option<&'static Locale> {
    let key = code.trim().replace('_', "-").to_ascii_lowercase();
    BY_CODE.get(&key).copied()
}

/// Language code for `code`, or [`DEFAULT_LANGUAGE`] when it is empty or unknown.
#[must_use]
pub fn language_for_locale(code: &str) -> &'static str {
    find(code).map_or(DEFAULT_LANGUAGE, |l| l.language)
}

/// All catalog entries.
#[must_use]
pub fn all() -> &'static [Locale] {
    LOCALES
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn swiss_german_maps_to_german() {
        assert_eq!(language_for_locale("de-CH"), "de");
    }

    #[test]
    fn empty_and_unknown_fall_back_to_english() {
        assert_eq!(language_for_locale(""), "en");
        assert_eq!(language_for_locale("xx-YY"), "en");
    }

    #[test]
    fn lookup_ignores_case_and_separator() {
        assert_eq!(find("EN_us").map(|l| l.iso3_country), Some("USA"));
        assert_eq!(language_for_locale("zh-hant"), "zh");
    }

    #[test]
    fn codes_are_unique() {
        assert_eq!(BY_CODE.len(), all().len());
    }
}
