use serde::{Deserialize, Serialize};
use std::fmt;

/// Global verse number, unique across the whole book (1..=6236).
pub type AyahId = u32;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Ayah {
    pub number: AyahId,
    pub number_in_surah: u32,
    pub text: String,
    #[serde(default)]
    pub translation_text: Option<String>,
    #[serde(default)]
    pub audio: Option<String>,
    pub juz: u32,
    pub page: u32,
}

impl Ayah {
    /// Playable audio URL, upgraded to https. `None` when the edition carries no audio.
    pub fn audio_url(&self) -> Option<String> {
        let url = self.audio.as_deref()?.trim();
        if url.is_empty() {
            return None;
        }

        match url.strip_prefix("http:") {
            Some(rest) => Some(format!("https:{}", rest)),
            None => Some(url.to_string()),
        }
    }
}

impl fmt::Display for Ayah {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.text, self.number_in_surah)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SurahInfo {
    pub number: u32,
    pub name: String,
    pub english_name: String,
    #[serde(default)]
    pub english_name_translation: String,
    #[serde(default)]
    pub number_of_ayahs: u32,
    pub revelation_type: String,
}

impl fmt::Display for SurahInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:3}. {} - {}", self.number, self.english_name, self.name)?;
        if self.number_of_ayahs > 0 {
            write!(f, " [{} ayahs]", self.number_of_ayahs)?;
        }
        Ok(())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SurahData {
    pub number: u32,
    pub name: String,
    pub english_name: String,
    pub revelation_type: String,
    pub ayahs: Vec<Ayah>,
}

impl SurahData {
    pub fn position_of(&self, id: AyahId) -> Option<usize> {
        self.ayahs.iter().position(|a| a.number == id)
    }

    pub fn ayah(&self, id: AyahId) -> Option<&Ayah> {
        self.ayahs.iter().find(|a| a.number == id)
    }

    pub fn ayah_in_surah(&self, number_in_surah: u32) -> Option<&Ayah> {
        self.ayahs.iter().find(|a| a.number_in_surah == number_in_surah)
    }

    pub fn is_first(&self, id: AyahId) -> bool {
        self.ayahs.first().is_some_and(|a| a.number == id)
    }

    pub fn is_last(&self, id: AyahId) -> bool {
        self.ayahs.last().is_some_and(|a| a.number == id)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Reciter {
    pub identifier: String,
    pub name: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Translation {
    pub identifier: String,
    pub language: String,
    pub translator: String,
}

impl Translation {
    /// Language code prefix of the edition identifier (`en.sahih` -> `en`).
    pub fn language_code(identifier: &str) -> &str {
        identifier.split('.').next().unwrap_or(identifier)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TafsirTranslation {
    pub text: Option<String>,
    pub name: String,
    pub lang: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Tafsir {
    pub arabic: Option<String>,
    pub translation: Option<TafsirTranslation>,
}

impl Tafsir {
    /// Content shown in place of commentary when nothing could be fetched.
    pub fn unavailable() -> Self {
        Self {
            arabic: Some("عذراً، لم نتمكن من تحميل التفسير. يرجى المحاولة مرة أخرى.".to_string()),
            translation: Some(TafsirTranslation {
                text: Some("Sorry, could not load the Tafsir. Please try again.".to_string()),
                name: "Error".to_string(),
                lang: "en".to_string(),
            }),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct Timings {
    pub fajr: String,
    pub sunrise: String,
    pub dhuhr: String,
    pub asr: String,
    pub maghrib: String,
    pub isha: String,
}

impl Timings {
    pub fn entries(&self) -> [(&'static str, &str); 6] {
        [
            ("Fajr", &self.fajr),
            ("Sunrise", &self.sunrise),
            ("Dhuhr", &self.dhuhr),
            ("Asr", &self.asr),
            ("Maghrib", &self.maghrib),
            ("Isha", &self.isha),
        ]
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PrayerTimes {
    pub timings: Timings,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub city: String,
    pub country: String,
}

impl Default for Location {
    fn default() -> Self {
        Self {
            city: "Madinah".to_string(),
            country: "Saudi Arabia".to_string(),
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.city, self.country)
    }
}
