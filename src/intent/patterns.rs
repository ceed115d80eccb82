//! Static vocabulary for both classifier stages.
//!
//! Weights are integer hundredths: a score of 75 is a confidence of 0.75.

use super::types::Intent;

/// Keyword present as a standalone word sequence.
pub const WORD_HIT: u32 = 30;
/// Keyword present only inside a longer word.
pub const SUBSTRING_HIT: u32 = 10;
/// Best score below this is reported as UNKNOWN.
pub const MIN_SCORE: u32 = 40;

pub const KEYWORDS: &[(Intent, &[&str])] = &[
    (Intent::OpenApp, &["open", "launch", "start", "run"]),
    (Intent::CloseApp, &["close", "quit", "exit", "kill", "stop"]),
    (Intent::SearchWeb, &["search", "google", "look up", "find"]),
    (Intent::PlayMusic, &["play music", "resume", "music", "playback"]),
    (Intent::StopMusic, &["stop", "pause", "halt", "music", "playback"]),
    (Intent::GetTime, &["time", "what time", "current time"]),
    (Intent::GetDate, &["date", "what date", "today", "current date"]),
    (Intent::SystemInfo, &["system", "info", "status", "cpu", "memory", "disk"]),
    (
        Intent::Greeting,
        &["hello", "hi", "hey", "greetings", "good morning", "good afternoon", "good evening"],
    ),
    (Intent::Exit, &["exit", "quit", "goodbye", "bye", "stop listening"]),
    (Intent::PlayYoutube, &["play", "youtube", "video", "song", "music"]),
    (Intent::SearchYoutube, &["search", "youtube", "find", "video", "videos"]),
];

pub fn keywords_for(intent: Intent) -> &'static [&'static str] {
    KEYWORDS
        .iter()
        .find(|(i, _)| *i == intent)
        .map(|(_, words)| *words)
        .unwrap_or(&[])
}

/// Application names recognized in utterances, searched in this order.
pub const KNOWN_APPS: &[&str] = &[
    "firefox", "chrome", "code", "terminal", "spotify", "slack", "discord", "vscode", "browser",
];

// First-word cues per intent.
pub const OPEN_VERBS: &[&str] = &["open", "launch"];
pub const CLOSE_VERBS: &[&str] = &["close", "quit", "exit", "kill"];
pub const SEARCH_VERBS: &[&str] = &["search", "google", "find", "look"];
pub const PLAY_VERBS: &[&str] = &["play", "resume"];
pub const PAUSE_VERBS: &[&str] = &["stop", "pause", "halt"];
pub const SHOW_VERBS: &[&str] = &["show", "check", "display", "get"];
pub const GREETING_WORDS: &[&str] = &["hello", "hi", "hey", "greetings", "good"];
pub const FAREWELL_WORDS: &[&str] = &["exit", "quit", "goodbye", "bye", "stop"];
pub const WATCH_VERBS: &[&str] = &["play", "watch", "put"];
pub const MEDIA_NOUNS: &[&str] = &["youtube", "video", "song"];
pub const YOUTUBE_SEARCH_VERBS: &[&str] = &["search", "find", "look"];

/// Phrases stripped from a web search utterance to leave the query.
pub const WEB_TRIGGERS: &[&str] = &["search", "google", "look up", "find", "for"];

/// Phrases stripped from a YouTube utterance to leave the video query.
pub const YOUTUBE_TRIGGERS: &[&str] = &[
    "on youtube", "youtube", "search", "find", "look up", "play", "watch", "put on", "videos",
    "video", "some music", "music", "a song", "song", "for",
];

/// Example utterances per intent. Their embedding centroids anchor the semantic stage.
pub const CANONICAL_PHRASES: &[(Intent, &[&str])] = &[
    (
        Intent::OpenApp,
        &["open firefox", "launch chrome", "open the terminal", "launch the code editor", "start the browser"],
    ),
    (
        Intent::CloseApp,
        &["close firefox", "quit chrome", "close the terminal", "kill the code editor", "close the browser"],
    ),
    (
        Intent::SearchWeb,
        &[
            "search for python documentation",
            "search the web for machine learning",
            "look up the weather forecast",
            "google linux tutorials",
        ],
    ),
    (
        Intent::PlayMusic,
        &["play music", "resume the music", "continue playback", "unpause the music"],
    ),
    (
        Intent::StopMusic,
        &["stop the music", "pause the music", "pause playback", "stop playing music"],
    ),
    (
        Intent::GetTime,
        &["what time is it", "tell me the current time", "what's the time", "current time please"],
    ),
    (
        Intent::GetDate,
        &["what's today's date", "tell me the date", "what day is it", "what is the date today"],
    ),
    (
        Intent::SystemInfo,
        &["show system information", "display system stats", "show cpu and memory usage", "check the system status"],
    ),
    (Intent::Greeting, &["hello", "hi there", "hey assistant", "good morning"]),
    (
        Intent::Exit,
        &["goodbye", "bye", "goodbye assistant", "exit the assistant", "stop listening"],
    ),
    (
        Intent::PlayYoutube,
        &[
            "play despacito on youtube",
            "play bohemian rhapsody on youtube",
            "watch gangnam style on youtube",
            "youtube play never gonna give you up",
            "play a video on youtube",
        ],
    ),
    (
        Intent::SearchYoutube,
        &[
            "search youtube for python tutorials",
            "find videos about machine learning",
            "search for cooking videos on youtube",
            "look up travel vlogs on youtube",
        ],
    ),
];
