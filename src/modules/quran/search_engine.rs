use crate::core::models::SurahInfo;
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

/// Result of a fuzzy search operation
#[derive(Debug, Clone)]
pub struct SearchResult<'a> {
    /// Original index in the chapter list
    pub index: usize,
    /// The matched chapter
    pub surah: &'a SurahInfo,
    /// Match score (higher is better)
    pub score: i64,
}

/// Fuzzy filter for the chapter picker
pub struct SearchEngine {
    matcher: SkimMatcherV2,
}

impl SearchEngine {
    pub fn new() -> Self {
        Self {
            matcher: SkimMatcherV2::default(),
        }
    }

    /// Perform a fuzzy search across the chapter list
    ///
    /// Returns results sorted by relevance (best matches first). A query that
    /// is a chapter number matches that chapter exactly.
    pub fn search<'a>(&self, surahs: &'a [SurahInfo], query: &str) -> Vec<SearchResult<'a>> {
        let query = query.trim();
        if query.is_empty() {
            return Vec::new();
        }

        if let Ok(number) = query.parse::<u32>() {
            return surahs
                .iter()
                .enumerate()
                .filter(|(_, s)| s.number == number)
                .map(|(index, surah)| SearchResult {
                    index,
                    surah,
                    score: i64::MAX,
                })
                .collect();
        }

        let query_lower = query.to_lowercase();
        let mut results: Vec<SearchResult> = surahs
            .iter()
            .enumerate()
            .filter_map(|(index, surah)| {
                self.score_surah(surah, &query_lower).map(|score| SearchResult {
                    index,
                    surah,
                    score,
                })
            })
            .collect();

        // Best first; ties keep chapter order.
        results.sort_by(|a, b| b.score.cmp(&a.score).then(a.index.cmp(&b.index)));
        results
    }

    /// Best score across transliterated name, English meaning and Arabic name
    fn score_surah(&self, surah: &SurahInfo, query: &str) -> Option<i64> {
        [
            self.matcher.fuzzy_match(&surah.english_name, query),
            self.matcher.fuzzy_match(&surah.english_name_translation, query),
            self.matcher.fuzzy_match(&surah.name, query),
        ]
        .into_iter()
        .flatten()
        .max()
    }
}

impl Default for SearchEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn surah(number: u32, english_name: &str, meaning: &str, name: &str) -> SurahInfo {
        SurahInfo {
            number,
            name: name.to_string(),
            english_name: english_name.to_string(),
            english_name_translation: meaning.to_string(),
            number_of_ayahs: 0,
            revelation_type: "Meccan".to_string(),
        }
    }

    fn surahs() -> Vec<SurahInfo> {
        vec![
            surah(1, "Al-Faatiha", "The Opening", "سُورَةُ ٱلْفَاتِحَةِ"),
            surah(2, "Al-Baqara", "The Cow", "سُورَةُ البَقَرَةِ"),
            surah(18, "Al-Kahf", "The Cave", "سُورَةُ الكَهۡفِ"),
            surah(36, "Yaseen", "Yaseen", "سُورَةُ يسٓ"),
            surah(112, "Al-Ikhlaas", "Sincerity", "سُورَةُ الإِخۡلَاصِ"),
        ]
    }

    #[test]
    fn empty_query_returns_empty_results() {
        let engine = SearchEngine::new();
        assert!(engine.search(&surahs(), "  ").is_empty());
    }

    #[test]
    fn no_match_returns_empty_results() {
        let engine = SearchEngine::new();
        assert!(engine.search(&surahs(), "zxqwerty").is_empty());
    }

    #[test]
    fn transliterated_name_matches() {
        let engine = SearchEngine::new();
        let list = surahs();
        let results = engine.search(&list, "kahf");
        assert_eq!(results[0].surah.number, 18);
    }

    #[test]
    fn english_meaning_matches() {
        let engine = SearchEngine::new();
        let list = surahs();
        let results = engine.search(&list, "cow");
        assert!(!results.is_empty());
        assert_eq!(results[0].surah.english_name, "Al-Baqara");
    }

    #[test]
    fn number_query_is_exact() {
        let engine = SearchEngine::new();
        let list = surahs();
        let results = engine.search(&list, "36");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].surah.english_name, "Yaseen");
        assert_eq!(list[results[0].index].number, 36);
    }

    #[test]
    fn results_are_sorted_best_score_first() {
        let engine = SearchEngine::new();
        let list = surahs();
        let results = engine.search(&list, "al");
        assert!(results.len() >= 2);
        for window in results.windows(2) {
            assert!(window[0].score >= window[1].score);
        }
    }
}
