//! Fixed phrases spoken at startup and shutdown.

pub fn time_of_day_greeting(hour: u32) -> &'static str {
    match hour {
        5..=11 => "Good morning",
        12..=16 => "Good afternoon",
        17..=20 => "Good evening",
        _ => "Hello",
    }
}

pub fn startup_greeting(name: &str, title: &str, hour: u32) -> String {
    format!(
        "{}, {title}. {name} is ready and systems are online.",
        time_of_day_greeting(hour)
    )
}

pub fn shutdown_message(name: &str) -> String {
    format!("Goodbye. {name} shutting down.")
}

pub fn interrupt_message() -> &'static str {
    "Interrupted. Shutting down."
}
