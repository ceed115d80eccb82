use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

pub const SLOT_APP_NAME: &str = "app_name";
pub const SLOT_QUERY: &str = "query";

/// Named parameters pulled out of an utterance. Ordered so serialized output is stable.
pub type Slots = BTreeMap<String, String>;

/// Closed set of action categories. Declaration order is the tie-break order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Intent {
    OpenApp,
    CloseApp,
    SearchWeb,
    PlayMusic,
    StopMusic,
    GetTime,
    GetDate,
    SystemInfo,
    Greeting,
    Exit,
    PlayYoutube,
    SearchYoutube,
    /// Universal fallback. Never executable.
    Unknown,
}

impl Intent {
    pub const ALL: [Intent; 13] = [
        Intent::OpenApp,
        Intent::CloseApp,
        Intent::SearchWeb,
        Intent::PlayMusic,
        Intent::StopMusic,
        Intent::GetTime,
        Intent::GetDate,
        Intent::SystemInfo,
        Intent::Greeting,
        Intent::Exit,
        Intent::PlayYoutube,
        Intent::SearchYoutube,
        Intent::Unknown,
    ];

    /// Every intent a classifier may actually pick.
    pub fn actionable() -> impl Iterator<Item = Intent> {
        Self::ALL.into_iter().filter(|i| !i.is_unknown())
    }

    pub fn is_unknown(self) -> bool {
        self == Intent::Unknown
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Intent::OpenApp => "OPEN_APP",
            Intent::CloseApp => "CLOSE_APP",
            Intent::SearchWeb => "SEARCH_WEB",
            Intent::PlayMusic => "PLAY_MUSIC",
            Intent::StopMusic => "STOP_MUSIC",
            Intent::GetTime => "GET_TIME",
            Intent::GetDate => "GET_DATE",
            Intent::SystemInfo => "SYSTEM_INFO",
            Intent::Greeting => "GREETING",
            Intent::Exit => "EXIT",
            Intent::PlayYoutube => "PLAY_YOUTUBE",
            Intent::SearchYoutube => "SEARCH_YOUTUBE",
            Intent::Unknown => "UNKNOWN",
        }
    }

    /// Slot keys this intent defines. Anything else is dropped on construction.
    pub fn slot_keys(self) -> &'static [&'static str] {
        match self {
            Intent::OpenApp | Intent::CloseApp => &[SLOT_APP_NAME],
            Intent::SearchWeb | Intent::PlayYoutube | Intent::SearchYoutube => &[SLOT_QUERY],
            _ => &[],
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output of one classification stage. Fields are private so the
/// confidence and slot invariants hold for every value in circulation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationResult {
    intent: Intent,
    confidence: f32,
    slots: Slots,
    raw_text: String,
}

impl ClassificationResult {
    pub fn new(intent: Intent, confidence: f32, mut slots: Slots, raw_text: impl Into<String>) -> Self {
        let keys = intent.slot_keys();
        slots.retain(|k, _| keys.contains(&k.as_str()));

        Self {
            intent,
            confidence: clamp_unit(confidence),
            slots,
            raw_text: raw_text.into(),
        }
    }

    pub fn unknown(confidence: f32, raw_text: impl Into<String>) -> Self {
        Self::new(Intent::Unknown, confidence, Slots::new(), raw_text)
    }

    pub fn intent(&self) -> Intent {
        self.intent
    }

    pub fn confidence(&self) -> f32 {
        self.confidence
    }

    pub fn slots(&self) -> &Slots {
        &self.slots
    }

    pub fn slot(&self, key: &str) -> Option<&str> {
        self.slots.get(key).map(String::as_str)
    }

    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }
}

/// Clamp to [0, 1]; NaN collapses to 0.
pub fn clamp_unit(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}
