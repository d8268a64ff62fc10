use crate::core::error::{ApiError, ApiResult};
use crate::core::models::{
    Ayah, AyahId, Reciter, SurahData, SurahInfo, Tafsir, TafsirTranslation, Translation,
};
use crate::core::traits::QuranSource;
use crate::modules::quran::catalog::{self, ARABIC_TAFSIR_EDITION};
use reqwest::blocking::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::sync::{Mutex, PoisonError};
use tracing::{debug, warn};

const TRANSLATION_FALLBACK: &str = "Translation not available.";

/// Standard `{ code, status, data }` envelope
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
struct EditionRef {
    identifier: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiSurahEdition {
    number: u32,
    name: String,
    english_name: String,
    revelation_type: String,
    ayahs: Vec<Ayah>,
    edition: EditionRef,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiEdition {
    identifier: String,
    #[serde(default)]
    language: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    english_name: String,
    #[serde(rename = "type", default)]
    kind: String,
}

#[derive(Debug, Deserialize)]
struct ApiAyahText {
    #[serde(default)]
    text: Option<String>,
}

/// Client for `api.alquran.cloud`.
///
/// The chapter list is fetched once and kept for the rest of the session.
pub struct AlQuranClient {
    base_url: String,
    http: Client,
    surah_cache: Mutex<Option<Vec<SurahInfo>>>,
}

impl AlQuranClient {
    pub fn new(base_url: &str, http: Client) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
            surah_cache: Mutex::new(None),
        }
    }

    fn get_json<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, "GET");

        let response = self.http.get(&url).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                code: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        let envelope: Envelope<T> = response.json()?;
        Ok(envelope.data)
    }

    /// Text of one ayah in one edition, or `None` when missing, blank or unreachable.
    fn edition_text(&self, ayah: AyahId, edition: &str) -> Option<String> {
        match self.get_json::<ApiAyahText>(&format!("/ayah/{}/{}", ayah, edition)) {
            Ok(data) => non_blank(data.text),
            Err(e) => {
                warn!(ayah, edition, "Tafsir request failed: {}", e);
                None
            }
        }
    }

    fn fetch_reciters(&self) -> ApiResult<Vec<Reciter>> {
        let editions: Vec<ApiEdition> = self.get_json("/edition/format/audio")?;
        Ok(verse_by_verse_reciters(editions))
    }

    fn fetch_translations(&self) -> ApiResult<Vec<Translation>> {
        let editions: Vec<ApiEdition> = self.get_json("/edition/type/translation")?;
        Ok(editions
            .into_iter()
            .map(|e| Translation {
                identifier: e.identifier,
                language: e.name,
                translator: e.english_name,
            })
            .collect())
    }
}

impl QuranSource for AlQuranClient {
    fn surahs(&self) -> ApiResult<Vec<SurahInfo>> {
        let mut cache = self.surah_cache.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(surahs) = cache.as_ref() {
            return Ok(surahs.clone());
        }

        let surahs: Vec<SurahInfo> = self.get_json("/surah")?;
        *cache = Some(surahs.clone());
        Ok(surahs)
    }

    fn surah(&self, number: u32, reciter: &str, translation: &str) -> ApiResult<SurahData> {
        let editions: Vec<ApiSurahEdition> = self.get_json(&format!(
            "/surah/{}/editions/{},{}",
            number, reciter, translation
        ))?;
        merge_editions(editions, reciter, translation)
    }

    fn tafsir(&self, ayah: AyahId, translation: &str) -> ApiResult<Tafsir> {
        let lang = Translation::language_code(translation);
        let edition = catalog::tafsir_edition(lang);

        let (arabic, translated) = in_parallel(
            || self.edition_text(ayah, ARABIC_TAFSIR_EDITION),
            || edition.and_then(|e| self.edition_text(ayah, e.identifier)),
        );
        let arabic = arabic.flatten();

        if arabic.is_none() && translated.is_none() {
            return Err(ApiError::NoTafsir);
        }

        Ok(Tafsir {
            arabic,
            translation: edition.map(|e| TafsirTranslation {
                text: translated,
                name: e.name.to_string(),
                lang: lang.to_string(),
            }),
        })
    }

    fn reciters(&self) -> Vec<Reciter> {
        match self.fetch_reciters() {
            Ok(reciters) if !reciters.is_empty() => reciters,
            Ok(_) => catalog::default_reciters(),
            Err(e) => {
                warn!("Could not fetch reciters, using defaults: {}", e);
                catalog::default_reciters()
            }
        }
    }

    fn translations(&self) -> Vec<Translation> {
        match self.fetch_translations() {
            Ok(translations) if !translations.is_empty() => translations,
            Ok(_) => catalog::default_translations(),
            Err(e) => {
                warn!("Could not fetch translations, using defaults: {}", e);
                catalog::default_translations()
            }
        }
    }
}

fn non_blank(text: Option<String>) -> Option<String> {
    text.filter(|t| !t.trim().is_empty())
}

fn verse_by_verse_reciters(editions: Vec<ApiEdition>) -> Vec<Reciter> {
    editions
        .into_iter()
        .filter(|e| e.kind == "versebyverse" && e.language == "ar")
        .map(|e| Reciter {
            identifier: e.identifier,
            name: e.english_name,
        })
        .collect()
}

/// Join the audio edition with the translation edition, ayah by ayah.
fn merge_editions(
    editions: Vec<ApiSurahEdition>,
    reciter: &str,
    translation: &str,
) -> ApiResult<SurahData> {
    let mut reciter_data = None;
    let mut translation_data = None;
    for edition in editions {
        if edition.edition.identifier == reciter && reciter_data.is_none() {
            reciter_data = Some(edition);
        } else if edition.edition.identifier == translation {
            translation_data = Some(edition);
        }
    }

    let reciter_data = reciter_data.ok_or_else(|| ApiError::MissingEdition(reciter.to_string()))?;
    if translation_data.is_none() {
        warn!(edition = translation, "Translation data not found");
    }

    let translated: Vec<Ayah> = translation_data.map(|t| t.ayahs).unwrap_or_default();
    let ayahs = reciter_data
        .ayahs
        .into_iter()
        .enumerate()
        .map(|(i, mut ayah)| {
            ayah.translation_text = Some(
                translated
                    .get(i)
                    .map(|t| t.text.clone())
                    .filter(|t| !t.is_empty())
                    .unwrap_or_else(|| TRANSLATION_FALLBACK.to_string()),
            );
            ayah
        })
        .collect();

    Ok(SurahData {
        number: reciter_data.number,
        name: reciter_data.name,
        english_name: reciter_data.english_name,
        revelation_type: reciter_data.revelation_type,
        ayahs,
    })
}

/// Runs `a` on a scoped thread while `b` runs here. A panic in `a` yields `None`.
fn in_parallel<A, B>(a: impl FnOnce() -> A + Send, b: impl FnOnce() -> B) -> (Option<A>, B)
where
    A: Send,
{
    std::thread::scope(|s| {
        let handle = s.spawn(a);
        let b = b();
        let a = handle.join().map_err(|_| warn!("Parallel fetch panicked")).ok();
        (a, b)
    })
}
