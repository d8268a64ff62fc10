//! Built-in data used when the editions API is unreachable, plus the static
//! tables the API does not provide.

use crate::core::models::{Reciter, Translation};

pub const DEFAULT_QURAN_API_URL: &str = "https://api.alquran.cloud/v1";
pub const DEFAULT_PRAYER_API_URL: &str = "https://api.aladhan.com/v1";

pub const DEFAULT_RECITER: &str = "ar.alafasy";
pub const DEFAULT_TRANSLATION: &str = "en.sahih";

/// Arabic commentary fetched for every ayah
pub const ARABIC_TAFSIR_EDITION: &str = "ar.muyassar";

pub const RADIO_STREAM_URL: &str = "https://n0e.radiojar.com/8s5u5tpdtwzuv";
pub const RADIO_TITLE: &str = "Quran Radio";
pub const RADIO_ARTIST: &str = "Cairo";

const RECITERS: &[(&str, &str)] = &[
    ("ar.husary", "Mahmoud Khalil Al-Husary"),
    ("ar.minshawi", "Mohamed Siddiq el-Minshawi"),
    ("ar.hudhaify", "Ali Al-Hudhaify"),
    ("ar.alafasy", "Mishary Rashid Alafasy"),
    ("ar.mahermuaiqly", "Maher Al Muaiqly"),
];

const TRANSLATIONS: &[(&str, &str, &str)] = &[
    ("en.sahih", "English", "Sahih International"),
    ("es.cortes", "Spanish", "Julio Cortes"),
    ("fr.hamidullah", "French", "Muhammad Hamidullah"),
    ("de.aburida", "German", "Abu Rida"),
    ("ru.kuliev", "Russian", "Elmir Kuliev"),
    ("id.indonesian", "Indonesian", "Bahasa Indonesia"),
    ("tr.yazir", "Turkish", "Elmalılı Hamdi Yazır"),
    ("ur.jalandhry", "Urdu", "Fateh Muhammad Jalandhry"),
    ("bn.bengali", "Bengali", "Zohurul Hoque"),
    ("da.rasmussen", "Danish", "Ellen Rasmussen"),
    ("el.greek", "Greek", "Greek"),
    ("he.goldman", "Hebrew", "Uri Rubin"),
    ("syr.peshitta", "Syriac", "Peshitta"),
];

/// Translated commentary, keyed by the translation's language code
const TAFSIR_EDITIONS: &[(&str, &str, &str)] = &[
    ("en", "en.maududi", "Tafheem-ul-Quran - Abul Ala Maududi"),
    ("id", "id.jalalayn", "Tafsir Al-Jalalayn"),
    ("ru", "ru.sadi", "Tafsir al-Sa'di"),
    ("tr", "tr.diyanet", "Diyanet Isleri"),
    ("ur", "ur.maududi", "Tafheem-ul-Quran - Syed Abu-al-A'la Maududi"),
    ("bn", "bn.hoque", "Tafsir Zohurul Hoque"),
];

/// Countries offered by the prayer-times location picker, each with its cities
const COUNTRIES: &[(&str, &[&str])] = &[
    ("Saudi Arabia", &["Madinah", "Makkah", "Riyadh", "Jeddah", "Dammam"]),
    ("Egypt", &["Cairo", "Alexandria", "Giza", "Luxor", "Aswan"]),
    ("United Arab Emirates", &["Dubai", "Abu Dhabi", "Sharjah"]),
    ("Jordan", &["Amman", "Irbid", "Zarqa"]),
    ("Morocco", &["Rabat", "Casablanca", "Marrakesh", "Fes"]),
    ("Turkey", &["Istanbul", "Ankara", "Izmir", "Bursa"]),
    ("Indonesia", &["Jakarta", "Surabaya", "Bandung", "Medan"]),
    ("Malaysia", &["Kuala Lumpur", "Penang", "Johor Bahru"]),
    ("Pakistan", &["Karachi", "Lahore", "Islamabad"]),
    ("United Kingdom", &["London", "Birmingham", "Manchester"]),
    ("United States", &["New York", "Chicago", "Houston", "Los Angeles"]),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TafsirEdition {
    pub identifier: &'static str,
    pub name: &'static str,
}

pub fn default_reciters() -> Vec<Reciter> {
    RECITERS
        .iter()
        .map(|(identifier, name)| Reciter {
            identifier: identifier.to_string(),
            name: name.to_string(),
        })
        .collect()
}

pub fn default_translations() -> Vec<Translation> {
    TRANSLATIONS
        .iter()
        .map(|(identifier, language, translator)| Translation {
            identifier: identifier.to_string(),
            language: language.to_string(),
            translator: translator.to_string(),
        })
        .collect()
}

pub fn tafsir_edition(language_code: &str) -> Option<TafsirEdition> {
    TAFSIR_EDITIONS
        .iter()
        .find(|(lang, _, _)| *lang == language_code)
        .map(|(_, identifier, name)| TafsirEdition { identifier, name })
}

pub fn countries() -> impl Iterator<Item = &'static str> {
    COUNTRIES.iter().map(|(name, _)| *name)
}

pub fn cities(country: &str) -> &'static [&'static str] {
    COUNTRIES
        .iter()
        .find(|(name, _)| *name == country)
        .map(|(_, cities)| *cities)
        .unwrap_or(&[])
}

/// Picking a country selects its first city
pub fn first_city(country: &str) -> &'static str {
    cities(country).first().copied().unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_include_preferred_editions() {
        assert!(default_reciters().iter().any(|r| r.identifier == DEFAULT_RECITER));
        assert!(default_translations().iter().any(|t| t.identifier == DEFAULT_TRANSLATION));
    }

    #[test]
    fn tafsir_edition_by_language() {
        assert_eq!(tafsir_edition("en").map(|e| e.identifier), Some("en.maududi"));
        assert!(tafsir_edition("es").is_none());
    }

    #[test]
    fn default_location_is_in_table() {
        assert!(countries().any(|c| c == "Saudi Arabia"));
        assert_eq!(first_city("Saudi Arabia"), "Madinah");
    }

    #[test]
    fn unknown_country_has_no_cities() {
        assert!(cities("Atlantis").is_empty());
        assert_eq!(first_city("Atlantis"), "");
    }
}
