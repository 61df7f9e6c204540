//! Grammar table for open-vocabulary slot validation
//!
//! A static mapping from normalized utterance text to semantic attributes.
//! Lookup is exact-match only; unknown input yields empty/`None`, never an
//! error.

use std::collections::HashMap;
use std::sync::LazyLock;

/// Semantic attributes of one known utterance
#[derive(Debug, Clone, Copy, Default)]
pub struct GrammarEntry {
    /// Full person name (e.g. "vlad" -> "Vladislav Maraev")
    pub person: Option<&'static str>,
    /// Canonical day (e.g. "monday" -> "Monday")
    pub day: Option<&'static str>,
    /// Canonical time (e.g. "10" -> "10:00")
    pub time: Option<&'static str>,
    /// Canned informational response
    pub response: Option<&'static str>,
}

const fn person(name: &'static str) -> GrammarEntry {
    GrammarEntry {
        person: Some(name),
        day: None,
        time: None,
        response: None,
    }
}

const fn known_person(name: &'static str, response: &'static str) -> GrammarEntry {
    GrammarEntry {
        person: Some(name),
        day: None,
        time: None,
        response: Some(response),
    }
}

static GRAMMAR: LazyLock<HashMap<&'static str, GrammarEntry>> = LazyLock::new(|| {
    HashMap::from([
        ("vlad", person("Vladislav Maraev")),
        ("aya", person("Nayat Astaiza Soriano")),
        ("rasmus", person("Rasmus Blanck")),
        ("david", person("David")),
        (
            "monday",
            GrammarEntry {
                day: Some("Monday"),
                ..GrammarEntry::default()
            },
        ),
        (
            "tuesday",
            GrammarEntry {
                day: Some("Tuesday"),
                ..GrammarEntry::default()
            },
        ),
        (
            "10",
            GrammarEntry {
                time: Some("10:00"),
                ..GrammarEntry::default()
            },
        ),
        (
            "11",
            GrammarEntry {
                time: Some("11:00"),
                ..GrammarEntry::default()
            },
        ),
        (
            "yes",
            GrammarEntry {
                response: Some("yes"),
                ..GrammarEntry::default()
            },
        ),
        (
            "no",
            GrammarEntry {
                response: Some("no"),
                ..GrammarEntry::default()
            },
        ),
        (
            "nelson mandela",
            known_person("Nelson Mandela", "Nelson Mandela was South Africa's President."),
        ),
        (
            "fidel castro",
            known_person("Fidel Castro", "Fidel Castro was Cuba's President."),
        ),
        (
            "indira gandhi",
            known_person("Indira Gandhi", "Indira Gandhi was India's PM."),
        ),
        (
            "kobe bryant",
            known_person("Kobe Bryant", "Kobe Bryant was a basketball player."),
        ),
        (
            "noam chomsky",
            known_person("Noam Chomsky", "Noam Chomsky is the father of generative grammar."),
        ),
        (
            "dag hammarskjöld",
            known_person("Dag Hammarskjöld", "Dag Hammarskjöld was UN secretary general."),
        ),
        (
            "donald trump",
            known_person("Donald Trump", "Donald Trump is a former US president."),
        ),
        (
            "vladimir putin",
            known_person("Vladimir Putin", "Vladimir Putin is the current president of Russia."),
        ),
        (
            "haile gebrselassie",
            known_person("Haile Gebrselassie", "Haile Gebrselassie is a long-distance runner."),
        ),
        (
            "cristiano ronaldo",
            known_person("Cristiano Ronaldo", "Cristiano Ronaldo is a footballer."),
        ),
    ])
});

/// Normalize an utterance for grammar lookup
///
/// Lowercases, strips the characters `? . , !`, and trims surrounding
/// whitespace. Idempotent: normalizing a normalized string is a no-op.
#[must_use]
pub fn normalize(utterance: &str) -> String {
    let stripped: String = utterance
        .to_lowercase()
        .chars()
        .filter(|c| !matches!(c, '?' | '.' | ',' | '!'))
        .collect();
    stripped.trim().to_string()
}

/// True iff the normalized utterance is a grammar key
#[must_use]
pub fn is_known(utterance: &str) -> bool {
    GRAMMAR.contains_key(normalize(utterance).as_str())
}

/// The person attribute of the matching entry, or empty if absent/unknown
#[must_use]
pub fn person_for(utterance: &str) -> &'static str {
    lookup(utterance).and_then(|e| e.person).unwrap_or("")
}

/// The canned informational response of the matching entry, if any
#[must_use]
pub fn response_for(utterance: &str) -> Option<&'static str> {
    lookup(utterance).and_then(|e| e.response)
}

/// The canonical day of the matching entry, if any
#[must_use]
pub fn day_for(utterance: &str) -> Option<&'static str> {
    lookup(utterance).and_then(|e| e.day)
}

/// The canonical time of the matching entry, if any
#[must_use]
pub fn time_for(utterance: &str) -> Option<&'static str> {
    lookup(utterance).and_then(|e| e.time)
}

fn lookup(utterance: &str) -> Option<&'static GrammarEntry> {
    GRAMMAR.get(normalize(utterance).as_str())
}
