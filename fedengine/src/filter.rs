//! Merge-time filters: language, deduplication, playability
//!
//! Providers rarely tag tracks with a language, so the language filter also
//! accepts tracks from sources known to serve that language. The mapping is
//! configuration and only as good as the providers' catalogs.

use fedsource::{SourceId, Track};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Language token meaning "no filter"
pub const ANY_LANGUAGE: &str = "all";

/// Sources whose tracks are assumed to be in a given language
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AffinityRule {
    pub sources: Vec<SourceId>,
    /// Only accept tracks of these sources when their language is blank
    pub require_blank: bool,
}

impl AffinityRule {
    /// `hindi` → musiq, `english` → audius and jamendo when untagged
    pub fn defaults() -> BTreeMap<String, AffinityRule> {
        BTreeMap::from([
            (
                "hindi".to_string(),
                AffinityRule {
                    sources: vec![SourceId::Musiq],
                    require_blank: false,
                },
            ),
            (
                "english".to_string(),
                AffinityRule {
                    sources: vec![SourceId::Audius, SourceId::Jamendo],
                    require_blank: true,
                },
            ),
        ])
    }

    fn accepts(&self, track: &Track, language: &str) -> bool {
        self.sources.contains(&track.source) && (!self.require_blank || language.is_empty())
    }
}

/// Language filter configured with an affinity map
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageAffinity {
    rules: BTreeMap<String, AffinityRule>,
}

impl Default for LanguageAffinity {
    fn default() -> Self {
        Self::new(AffinityRule::defaults())
    }
}

impl LanguageAffinity {
    pub fn new(rules: BTreeMap<String, AffinityRule>) -> Self {
        let rules = rules
            .into_iter()
            .map(|(k, v)| (k.trim().to_lowercase(), v))
            .collect();
        Self { rules }
    }

    /// True when `track` is acceptable for the requested `language`
    ///
    /// An empty or `all` request accepts everything.
    pub fn matches(&self, track: &Track, language: &str) -> bool {
        let needle = language.trim().to_lowercase();
        if needle.is_empty() || needle == ANY_LANGUAGE {
            return true;
        }
        let lang = track.language_lowercase();
        if lang.contains(&needle) {
            return true;
        }
        self.rules
            .get(&needle)
            .is_some_and(|rule| rule.accepts(track, &lang))
    }

    pub fn filter(&self, tracks: Vec<Track>, language: &str) -> Vec<Track> {
        tracks
            .into_iter()
            .filter(|t| self.matches(t, language))
            .collect()
    }
}

/// Drops repeated ids, the first occurrence wins
pub fn dedup_by_id(tracks: Vec<Track>) -> Vec<Track> {
    let mut seen = HashSet::new();
    tracks
        .into_iter()
        .filter(|t| seen.insert(t.id.clone()))
        .collect()
}

/// Drops unplayable tracks unless none is playable
pub fn prefer_playable(tracks: Vec<Track>) -> Vec<Track> {
    if tracks.iter().any(Track::is_playable) {
        tracks.into_iter().filter(Track::is_playable).collect()
    } else {
        tracks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fedsource::TrackBuilder;

    fn track(source: SourceId, id: &str, language: Option<&str>, preview: bool) -> Track {
        TrackBuilder::new(source, id)
            .name(Some(id))
            .language(language)
            .preview_url(preview.then_some("https://cdn.example.org/a.mp3"))
            .build()
    }

    fn sample() -> Vec<Track> {
        vec![
            track(SourceId::Musiq, "1", None, true),
            track(SourceId::Audius, "2", None, true),
            track(SourceId::Audius, "3", Some("Spanish"), true),
            track(SourceId::Jamendo, "4", Some("English"), true),
            track(SourceId::Archive, "5", Some("hindi; urdu"), true),
            track(SourceId::Deezer, "6", None, true),
        ]
    }

    fn ids(tracks: &[Track]) -> Vec<&str> {
        tracks.iter().map(|t| t.id.as_str()).collect()
    }

    #[test]
    fn test_all_keeps_everything() {
        let affinity = LanguageAffinity::default();
        assert_eq!(affinity.filter(sample(), "all").len(), 6);
        assert_eq!(affinity.filter(sample(), "").len(), 6);
    }

    #[test]
    fn test_hindi_uses_musiq_affinity() {
        let affinity = LanguageAffinity::default();
        let hindi = affinity.filter(sample(), "Hindi");
        assert_eq!(ids(&hindi), vec!["musiq_1", "archive_5"]);
    }

    #[test]
    fn test_english_requires_blank_language() {
        let affinity = LanguageAffinity::default();
        let english = affinity.filter(sample(), "english");
        assert_eq!(ids(&english), vec!["audius_2", "jamendo_4"]);
    }

    #[test]
    fn test_unknown_language_is_substring_only() {
        let affinity = LanguageAffinity::default();
        let spanish = affinity.filter(sample(), "spanish");
        assert_eq!(ids(&spanish), vec!["audius_3"]);
    }

    #[test]
    fn test_language_filter_is_idempotent() {
        let affinity = LanguageAffinity::default();
        for language in ["all", "hindi", "english", "punjabi"] {
            let once = affinity.filter(sample(), language);
            let twice = affinity.filter(once.clone(), language);
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn test_dedup_keeps_first_occurrence() {
        let mut first = track(SourceId::Audius, "1", None, true);
        first.name = "First".to_string();
        let mut second = first.clone();
        second.name = "Second".to_string();
        let other = track(SourceId::Audius, "2", None, true);

        let deduped = dedup_by_id(vec![first, other, second]);
        assert_eq!(ids(&deduped), vec!["audius_1", "audius_2"]);
        assert_eq!(deduped[0].name, "First");
    }

    #[test]
    fn test_prefer_playable() {
        let mixed = vec![
            track(SourceId::Radio, "1", None, false),
            track(SourceId::Radio, "2", None, true),
        ];
        assert_eq!(ids(&prefer_playable(mixed)), vec!["radio_2"]);

        let none_playable = vec![track(SourceId::Radio, "1", None, false)];
        assert_eq!(prefer_playable(none_playable).len(), 1);
    }
}
