use super::patterns::*;
use super::types::{ClassificationResult, Intent, Slots, SLOT_APP_NAME, SLOT_QUERY};

/// Deterministic weighted keyword scorer.
///
/// Pure: the result depends only on the input text and the static tables in
/// [`patterns`](super::patterns). Ties go to the intent declared first.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleClassifier;

impl RuleClassifier {
    pub fn new() -> Self {
        Self
    }

    pub fn classify(&self, text: &str) -> ClassificationResult {
        let utterance = Utterance::new(text);

        let mut best: Option<(Intent, u32)> = None;
        for intent in Intent::actionable() {
            let score = score_intent(intent, &utterance);
            if score == 0 {
                continue;
            }
            if best.map_or(true, |(_, top)| score > top) {
                best = Some((intent, score));
            }
        }

        let Some((intent, score)) = best else {
            return ClassificationResult::unknown(0.0, text);
        };

        let confidence = score.min(100) as f32 / 100.0;
        if score < MIN_SCORE {
            return ClassificationResult::unknown(confidence, text);
        }

        let slots = extract_slots(intent, &utterance);
        ClassificationResult::new(intent, confidence, slots, text)
    }
}

/// Lower-cased, trimmed text plus its words with edge punctuation removed.
struct Utterance {
    text: String,
    words: Vec<String>,
}

impl Utterance {
    fn new(raw: &str) -> Self {
        let text = raw.trim().to_lowercase();
        let words = text
            .split_whitespace()
            .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()))
            .filter(|w| !w.is_empty())
            .map(str::to_string)
            .collect();
        Self { text, words }
    }

    fn first_word_in(&self, set: &[&str]) -> bool {
        self.words.first().is_some_and(|w| set.contains(&w.as_str()))
    }

    fn has_word(&self, word: &str) -> bool {
        self.words.iter().any(|w| w == word)
    }

    /// True when `phrase` occurs as a run of whole words.
    fn has_phrase(&self, phrase: &str) -> bool {
        let parts: Vec<&str> = phrase.split_whitespace().collect();
        if parts.is_empty() || parts.len() > self.words.len() {
            return false;
        }
        self.words
            .windows(parts.len())
            .any(|window| window.iter().zip(&parts).all(|(w, p)| w == p))
    }

    fn known_app(&self) -> Option<&'static str> {
        KNOWN_APPS.iter().copied().find(|app| self.text.contains(app))
    }

    fn len(&self) -> usize {
        self.words.len()
    }
}

fn score_intent(intent: Intent, u: &Utterance) -> u32 {
    let mut score = 0;
    let mut matched = false;

    for keyword in keywords_for(intent) {
        if u.has_phrase(keyword) {
            score += WORD_HIT;
            matched = true;
        } else if u.text.contains(keyword) {
            score += SUBSTRING_HIT;
            matched = true;
        }
    }

    let app = u.known_app().is_some();

    match intent {
        Intent::OpenApp => {
            if u.first_word_in(OPEN_VERBS) {
                score += 50;
            }
            if app {
                score += 30;
            }
            if u.len() <= 4 {
                score += 20;
            }
        }
        Intent::CloseApp => {
            if u.first_word_in(CLOSE_VERBS) {
                score += 40;
            }
            if app {
                score += 30;
                if u.len() <= 4 {
                    score += 20;
                }
            }
        }
        Intent::SearchWeb => {
            if u.first_word_in(SEARCH_VERBS) {
                score += 40;
            }
            if u.has_word("for") {
                score += 20;
            }
        }
        Intent::PlayMusic => {
            if u.first_word_in(PLAY_VERBS) {
                score += 40;
            }
        }
        Intent::StopMusic => {
            if u.first_word_in(PAUSE_VERBS) {
                score += 40;
            }
        }
        Intent::GetTime | Intent::GetDate if matched => {
            if u.text.starts_with("what") {
                score += 30;
            }
            if u.has_word("is") {
                score += 20;
            }
        }
        Intent::SystemInfo if matched => {
            if u.first_word_in(SHOW_VERBS) {
                score += 30;
            }
            if u.len() <= 4 {
                score += 20;
            }
        }
        Intent::Greeting => {
            if u.first_word_in(GREETING_WORDS) && u.len() <= 3 {
                score += 60;
            }
        }
        Intent::Exit => {
            if u.first_word_in(FAREWELL_WORDS) && u.len() <= 3 && !app {
                score += 60;
            }
        }
        Intent::PlayYoutube => {
            if u.first_word_in(WATCH_VERBS) {
                if MEDIA_NOUNS.iter().any(|n| u.has_word(n)) {
                    score += 40;
                }
                if !strip_triggers(&u.words, YOUTUBE_TRIGGERS).is_empty() {
                    score += 30;
                }
                if u.len() <= 6 {
                    score += 20;
                }
            }
        }
        Intent::SearchYoutube => {
            if u.has_word("youtube") && u.first_word_in(YOUTUBE_SEARCH_VERBS) {
                score += 40;
            }
        }
        _ => {}
    }

    score
}

fn extract_slots(intent: Intent, u: &Utterance) -> Slots {
    let mut slots = Slots::new();

    match intent {
        Intent::OpenApp | Intent::CloseApp => {
            if let Some(app) = u.known_app() {
                slots.insert(SLOT_APP_NAME.to_string(), app.to_string());
            }
        }
        Intent::SearchWeb => insert_query(&mut slots, strip_triggers(&u.words, WEB_TRIGGERS)),
        Intent::PlayYoutube | Intent::SearchYoutube => {
            insert_query(&mut slots, strip_triggers(&u.words, YOUTUBE_TRIGGERS))
        }
        _ => {}
    }

    slots
}

fn insert_query(slots: &mut Slots, query: String) {
    if !query.is_empty() {
        slots.insert(SLOT_QUERY.to_string(), query);
    }
}

/// Drop trigger phrases (whole words, longest phrase first at each position)
/// and join what is left.
fn strip_triggers(words: &[String], triggers: &[&str]) -> String {
    let mut phrases: Vec<Vec<&str>> = triggers
        .iter()
        .map(|t| t.split_whitespace().collect())
        .collect();
    phrases.sort_by(|a, b| b.len().cmp(&a.len()));

    let mut kept: Vec<&str> = Vec::new();
    let mut i = 0;
    while i < words.len() {
        let rest = &words[i..];
        let hit = phrases.iter().find(|p| {
            p.len() <= rest.len() && rest.iter().zip(p.iter()).all(|(w, t)| w == t)
        });
        match hit {
            Some(p) => i += p.len(),
            None => {
                kept.push(&words[i]);
                i += 1;
            }
        }
    }

    kept.join(" ")
}
