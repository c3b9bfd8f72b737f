use client_core::{FeedBatch, Progress};
use shared::domain::{Candidate, SwipeDirection};

pub const HELP: &str = "commands: y/right = interested, n/left = pass, m/more = load more, q = quit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    Swipe(SwipeDirection),
    More,
    Quit,
    Help,
}

pub fn parse_input(line: &str) -> Option<Input> {
    let input = match line.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" | "right" | "r" | "accept" => Input::Swipe(SwipeDirection::Accept),
        "n" | "no" | "left" | "l" | "reject" => Input::Swipe(SwipeDirection::Reject),
        "m" | "more" | "load" => Input::More,
        "q" | "quit" | "exit" => Input::Quit,
        "?" | "h" | "help" => Input::Help,
        _ => return None,
    };
    Some(input)
}

pub fn render_card(candidate: &Candidate, progress: Progress) -> String {
    let payload = &candidate.payload;
    let title = if payload.title.trim().is_empty() {
        "(untitled)"
    } else {
        payload.title.as_str()
    };

    let mut card = format!("[{progress}] {title}");
    if let Some(description) = payload.description.as_deref().filter(|d| !d.trim().is_empty()) {
        card.push_str("\n    ");
        card.push_str(description.trim());
    }
    if !payload.tags.is_empty() {
        card.push_str("\n    #");
        card.push_str(&payload.tags.join(" #"));
    }
    if let Some(image_url) = &payload.image_url {
        card.push_str("\n    image: ");
        card.push_str(image_url);
    }
    card
}

/// What to tell the user once nothing is left to swipe.
pub fn exhausted_message(last_batch: Option<&FeedBatch>) -> String {
    match last_batch {
        Some(FeedBatch::Loaded(_)) => {
            "You're all caught up. Type 'm' to look for more.".to_string()
        }
        Some(FeedBatch::Empty) | None => {
            "Nothing new right now. Type 'm' to check again.".to_string()
        }
        Some(FeedBatch::Unavailable(reason)) => {
            format!("The feed is unavailable ({reason}). Type 'm' to retry.")
        }
    }
}

#[cfg(test)]
#[path = "tests/prompt_tests.rs"]
mod tests;
