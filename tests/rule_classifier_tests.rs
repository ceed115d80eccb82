use vox::intent::{Intent, RuleClassifier, RULE_ACCEPT_THRESHOLD, SLOT_APP_NAME, SLOT_QUERY};

fn classify(text: &str) -> vox::intent::ClassificationResult {
    RuleClassifier::new().classify(text)
}

#[test]
fn test_open_known_app() {
    let result = classify("open firefox");

    assert_eq!(result.intent(), Intent::OpenApp);
    assert_eq!(result.confidence(), 1.0, "Score above 1 must be capped");
    assert_eq!(result.slot(SLOT_APP_NAME), Some("firefox"));
    assert_eq!(result.raw_text(), "open firefox");
}

#[test]
fn test_punctuation_and_case_are_ignored() {
    let result = classify("  Open Firefox.  ");

    assert_eq!(result.intent(), Intent::OpenApp);
    assert_eq!(result.slot(SLOT_APP_NAME), Some("firefox"));
}

#[test]
fn test_open_unknown_app_has_no_slot() {
    let result = classify("open zoom");

    assert_eq!(result.intent(), Intent::OpenApp);
    assert!(result.confidence() >= 0.75);
    assert!(result.slots().is_empty(), "zoom is not a known app");
}

#[test]
fn test_gibberish_is_unknown_below_floor() {
    let result = classify("do the thing");

    assert_eq!(result.intent(), Intent::Unknown);
    assert!(result.confidence() < 0.4, "Got {}", result.confidence());
    assert!(result.slots().is_empty());
}

#[test]
fn test_empty_input_is_unknown() {
    for text in ["", "   ", "?!"] {
        let result = classify(text);
        assert_eq!(result.intent(), Intent::Unknown, "Input {text:?}");
    }
}

#[test]
fn test_greeting() {
    let result = classify("hello");

    assert_eq!(result.intent(), Intent::Greeting);
    assert!((result.confidence() - 0.9).abs() < 1e-6);
}

#[test]
fn test_time_question() {
    let result = classify("what time is it");
    assert_eq!(result.intent(), Intent::GetTime);
    assert_eq!(result.confidence(), 1.0);
}

#[test]
fn test_close_known_app() {
    let result = classify("close firefox");
    assert_eq!(result.intent(), Intent::CloseApp);
    assert_eq!(result.slot(SLOT_APP_NAME), Some("firefox"));
}

#[test]
fn test_bare_exit_is_exit_not_close() {
    let result = classify("exit");
    assert_eq!(result.intent(), Intent::Exit);

    let result = classify("goodbye");
    assert_eq!(result.intent(), Intent::Exit);
    assert_eq!(result.confidence(), 1.0);

    let result = classify("stop listening");
    assert_eq!(result.intent(), Intent::Exit);
}

#[test]
fn test_bare_stop_is_unsure_stop_music() {
    // No app, so CLOSE_APP gets no boost; EXIT needs "stop listening"
    let result = classify("stop");

    assert_eq!(result.intent(), Intent::StopMusic);
    assert!((result.confidence() - 0.7).abs() < 1e-6);
    assert!(result.confidence() < RULE_ACCEPT_THRESHOLD);
}

#[test]
fn test_play_music_beats_youtube_without_query() {
    let result = classify("play music");
    assert_eq!(result.intent(), Intent::PlayMusic);
    assert!(result.slots().is_empty(), "PLAY_MUSIC defines no slots");
}

#[test]
fn test_play_on_youtube_extracts_query() {
    let result = classify("play despacito on youtube");

    assert_eq!(result.intent(), Intent::PlayYoutube);
    assert_eq!(result.slot(SLOT_QUERY), Some("despacito"));
}

#[test]
fn test_search_youtube_beats_web_search() {
    let result = classify("search youtube for python tutorials");

    assert_eq!(result.intent(), Intent::SearchYoutube);
    assert_eq!(result.slot(SLOT_QUERY), Some("python tutorials"));
}

#[test]
fn test_web_search_query() {
    let result = classify("search for rust tutorials");

    assert_eq!(result.intent(), Intent::SearchWeb);
    assert!((result.confidence() - 0.9).abs() < 1e-6);
    assert_eq!(result.slot(SLOT_QUERY), Some("rust tutorials"));
}

#[test]
fn test_trigger_removal_keeps_whole_words() {
    // "info" and "find" must not be cut out of "information"
    let result = classify("search for system information");

    assert_eq!(result.intent(), Intent::SearchWeb);
    assert_eq!(result.slot(SLOT_QUERY), Some("system information"));
}

#[test]
fn test_search_without_query_has_no_slot() {
    let result = classify("search for");

    assert_eq!(result.intent(), Intent::SearchWeb);
    assert_eq!(result.slot(SLOT_QUERY), None, "Empty query must be absent");
}

#[test]
fn test_system_info() {
    let result = classify("show system information");

    assert_eq!(result.intent(), Intent::SystemInfo);
    assert!((result.confidence() - 0.9).abs() < 1e-6);
}

#[test]
fn test_tie_goes_to_earlier_intent() {
    // PLAY_MUSIC and STOP_MUSIC both score 0.6
    let result = classify("music playback");

    assert_eq!(result.intent(), Intent::PlayMusic);
    assert!((result.confidence() - 0.6).abs() < 1e-6);
}

#[test]
fn test_confidence_always_in_unit_range() {
    let inputs = [
        "open firefox open chrome open code launch terminal",
        "what time is it what date is it today",
        "hello hi hey greetings good morning",
        "play play play youtube video song music",
        "ünïcödé ☃ text",
        "x",
    ];

    for text in inputs {
        let result = classify(text);
        assert!(
            (0.0..=1.0).contains(&result.confidence()),
            "{text:?} gave {}",
            result.confidence()
        );
    }
}

#[test]
fn test_classify_is_pure() {
    let classifier = RuleClassifier::new();
    for text in ["open firefox", "do the thing", "play despacito on youtube"] {
        assert_eq!(classifier.classify(text), classifier.classify(text));
    }
}

#[test]
fn test_slots_only_hold_defined_keys() {
    for text in [
        "open firefox",
        "search for cats",
        "play despacito on youtube",
        "what time is it",
    ] {
        let result = classify(text);
        let allowed = result.intent().slot_keys();
        for key in result.slots().keys() {
            assert!(allowed.contains(&key.as_str()), "{text:?} leaked slot {key}");
        }
    }
}
