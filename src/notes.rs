use crate::error::{MaternaError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoteType {
    Tip,
    Affirmation,
    Milestone,
    Custom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NoteFilter {
    #[default]
    All,
    Only(NoteType),
}

impl NoteFilter {
    fn matches(&self, note: &Note) -> bool {
        match self {
            Self::All => true,
            Self::Only(t) => note.note_type == *t,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: String,
    pub content: String,
    #[serde(rename = "type")]
    pub note_type: NoteType,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub is_pinned: bool,
}

/// Pinned notes first; within each group newest first.
pub fn display_order(a: &Note, b: &Note) -> Ordering {
    b.is_pinned
        .cmp(&a.is_pinned)
        .then_with(|| b.created_at.cmp(&a.created_at))
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Notes {
    items: Vec<Note>,
}

impl Notes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, content: &str, note_type: NoteType) -> Result<&Note> {
        self.add_at(content, note_type, Utc::now())
    }

    pub fn add_at(
        &mut self,
        content: &str,
        note_type: NoteType,
        created_at: DateTime<Utc>,
    ) -> Result<&Note> {
        let content = content.trim();
        if content.is_empty() {
            return Err(MaternaError::Validation("Note content is empty".to_string()));
        }

        self.items.insert(
            0,
            Note {
                id: uuid::Uuid::new_v4().to_string()[..8].to_string(),
                content: content.to_string(),
                note_type,
                created_at,
                is_pinned: false,
            },
        );
        Ok(&self.items[0])
    }

    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|n| n.id != id);
        self.items.len() != before
    }

    /// Flips the pin flag and returns the new value, or `None` for an unknown id.
    pub fn toggle_pin(&mut self, id: &str) -> Option<bool> {
        let note = self.items.iter_mut().find(|n| n.id == id)?;
        note.is_pinned = !note.is_pinned;
        Some(note.is_pinned)
    }

    pub fn get(&self, id: &str) -> Option<&Note> {
        self.items.iter().find(|n| n.id == id)
    }

    pub fn sorted(&self) -> Vec<&Note> {
        let mut notes: Vec<&Note> = self.items.iter().collect();
        notes.sort_by(|a, b| display_order(a, b));
        notes
    }

    pub fn filtered(&self, filter: NoteFilter, search: &str) -> Vec<&Note> {
        let needle = search.to_lowercase();
        let mut notes: Vec<&Note> = self
            .items
            .iter()
            .filter(|n| filter.matches(n) && n.content.to_lowercase().contains(&needle))
            .collect();
        notes.sort_by(|a, b| display_order(a, b));
        notes
    }

    pub fn pinned_count(&self) -> usize {
        self.items.iter().filter(|n| n.is_pinned).count()
    }

    pub fn custom_count(&self) -> usize {
        self.items
            .iter()
            .filter(|n| n.note_type == NoteType::Custom)
            .count()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Note> {
        self.items.iter()
    }
}
