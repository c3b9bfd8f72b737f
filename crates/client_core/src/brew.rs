use std::fmt;

use shared::{domain::FeedMode, protocol::EventCreateRequest};
use thiserror::Error;

pub const MATCHA_TAGS: &[&str] = &[
    "Yoga",
    "Meditation",
    "Book Club",
    "Cooking",
    "Hiking",
    "Photography",
    "Gardening",
    "Art & Crafts",
    "Music",
    "Dance",
    "Gaming",
    "Fitness",
    "Reading",
    "Writing",
    "Volunteering",
    "Painting",
    "Ceramics",
    "Knitting",
    "Board Games",
    "Nature Walks",
];

pub const COFFEE_TAGS: &[&str] = &[
    "Networking",
    "Workshop",
    "Career Development",
    "Coding",
    "Data Analysis",
    "Marketing",
    "Product Management",
    "UX Research",
    "Design Review",
    "Consulting",
    "Teaching",
    "Engineering",
    "Public Speaking",
    "Leadership",
    "Entrepreneurship",
    "Sales",
    "Finance",
    "Project Management",
    "Mentorship",
    "Panel Discussion",
];

pub fn suggested_tags(mode: FeedMode) -> &'static [&'static str] {
    match mode {
        FeedMode::Matcha => MATCHA_TAGS,
        FeedMode::Coffee => COFFEE_TAGS,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BrewStep {
    #[default]
    Mode,
    Title,
    Details,
}

impl BrewStep {
    fn next(self) -> Option<Self> {
        match self {
            Self::Mode => Some(Self::Title),
            Self::Title => Some(Self::Details),
            Self::Details => None,
        }
    }

    fn previous(self) -> Option<Self> {
        match self {
            Self::Mode => None,
            Self::Title => Some(Self::Mode),
            Self::Details => Some(Self::Title),
        }
    }
}

impl fmt::Display for BrewStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Mode => "mode",
            Self::Title => "title",
            Self::Details => "details",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BrewError {
    #[error("the {0} step is incomplete")]
    StepIncomplete(BrewStep),
    #[error("the draft is still at the {0} step")]
    NotFinalStep(BrewStep),
}

#[derive(Debug, Clone, Default)]
pub struct EventDraft {
    step: BrewStep,
    mode: FeedMode,
    title: String,
    description: String,
    tags: Vec<String>,
}

impl EventDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(&self) -> BrewStep {
        self.step
    }

    pub fn mode(&self) -> FeedMode {
        self.mode
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Tags belong to one mode's vocabulary, so switching mode clears them.
    pub fn set_mode(&mut self, mode: FeedMode) {
        if self.mode != mode {
            self.mode = mode;
            self.tags.clear();
        }
    }

    pub fn toggle_mode(&mut self) -> FeedMode {
        self.set_mode(self.mode.toggled());
        self.mode
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    /// Selects or deselects a tag; returns whether it is selected afterwards.
    pub fn toggle_tag(&mut self, tag: &str) -> bool {
        let tag = tag.trim();
        if tag.is_empty() {
            return false;
        }
        if let Some(index) = self.tags.iter().position(|existing| existing == tag) {
            self.tags.remove(index);
            false
        } else {
            self.tags.push(tag.to_string());
            true
        }
    }

    pub fn can_proceed(&self) -> bool {
        self.step_complete(self.step)
    }

    pub fn advance(&mut self) -> Result<BrewStep, BrewError> {
        if !self.can_proceed() {
            return Err(BrewError::StepIncomplete(self.step));
        }
        if let Some(next) = self.step.next() {
            self.step = next;
        }
        Ok(self.step)
    }

    pub fn back(&mut self) -> BrewStep {
        if let Some(previous) = self.step.previous() {
            self.step = previous;
        }
        self.step
    }

    pub fn submit_request(&self) -> Result<EventCreateRequest, BrewError> {
        if self.step.next().is_some() {
            return Err(BrewError::NotFinalStep(self.step));
        }
        for step in [BrewStep::Mode, BrewStep::Title, BrewStep::Details] {
            if !self.step_complete(step) {
                return Err(BrewError::StepIncomplete(step));
            }
        }

        Ok(EventCreateRequest {
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            tags: self.tags.clone(),
            matcha_mode: self.mode.is_matcha(),
        })
    }

    fn step_complete(&self, step: BrewStep) -> bool {
        match step {
            BrewStep::Mode => true,
            BrewStep::Title => !self.title.trim().is_empty(),
            BrewStep::Details => !self.description.trim().is_empty() && !self.tags.is_empty(),
        }
    }
}

#[cfg(test)]
#[path = "tests/brew_tests.rs"]
mod tests;
