//! Prompt entry modes: a fixed list of per-slot descriptions, or one bulk text
//! split by a separator line. Both project onto the same canonical slot
//! sequence before orchestration, so the orchestrator never sees the mode.

use serde::{Deserialize, Serialize};

use crate::orchestrator::is_blank;

/// Separator between scenes in bulk mode.
pub const BULK_SEPARATOR: &str = "\n---\n";

/// Number of slots the list mode offers.
pub const DEFAULT_MAX_SLOTS: usize = 10;

fn default_separator() -> String {
    BULK_SEPARATOR.to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum PromptEntry {
    List {
        prompts: Vec<String>,
    },
    Bulk {
        text: String,
        #[serde(default = "default_separator")]
        separator: String,
    },
}

impl PromptEntry {
    pub fn list<I, S>(prompts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        PromptEntry::List {
            prompts: prompts.into_iter().map(Into::into).collect(),
        }
    }

    pub fn bulk(text: impl Into<String>) -> Self {
        PromptEntry::Bulk {
            text: text.into(),
            separator: default_separator(),
        }
    }

    /// An empty list of `max_slots` blank slots.
    pub fn empty_list(max_slots: usize) -> Self {
        PromptEntry::List {
            prompts: vec![String::new(); max_slots],
        }
    }

    /// Canonical slot sequence. Bulk pieces are kept verbatim (blank pieces
    /// stay as inactive slots) so result positions line up with what the
    /// user typed.
    pub fn to_slots(&self) -> Vec<String> {
        match self {
            PromptEntry::List { prompts } => prompts.clone(),
            PromptEntry::Bulk { text, separator } => split_bulk(text, separator),
        }
    }

    pub fn has_active_prompt(&self) -> bool {
        match self {
            PromptEntry::List { prompts } => prompts.iter().any(|p| !is_blank(p)),
            PromptEntry::Bulk { text, .. } => !is_blank(text),
        }
    }

    /// Switch to list mode: first `max_slots` pieces, trimmed, padded with
    /// blanks to exactly `max_slots`.
    pub fn into_list(self, max_slots: usize) -> Self {
        match self {
            PromptEntry::List { .. } => self,
            PromptEntry::Bulk { text, separator } => {
                let mut prompts: Vec<String> = split_bulk(&text, &separator)
                    .into_iter()
                    .take(max_slots)
                    .map(|p| p.trim().to_string())
                    .collect();
                prompts.resize(max_slots, String::new());
                PromptEntry::List { prompts }
            }
        }
    }

    /// Switch to bulk mode: non-blank entries joined by `separator`.
    pub fn into_bulk(self, separator: &str) -> Self {
        match self {
            PromptEntry::Bulk { .. } => self,
            PromptEntry::List { prompts } => PromptEntry::Bulk {
                text: prompts
                    .iter()
                    .filter(|p| !is_blank(p))
                    .map(String::as_str)
                    .collect::<Vec<_>>()
                    .join(separator),
                separator: separator.to_string(),
            },
        }
    }
}

fn split_bulk(text: &str, separator: &str) -> Vec<String> {
    if separator.is_empty() {
        return vec![text.to_string()];
    }
    text.split(separator).map(str::to_string).collect()
}
