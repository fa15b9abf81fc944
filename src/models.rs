use serde::{Deserialize, Serialize};

/// One flashcard row as stored in the `cards` table.
pub struct Card {
    pub id: String,
    pub batch_number: i64,
    pub front_text: String,
    pub back_text: String,
    pub learned_timestamp: i64,
}

/// A `(front, back)` pair drawn from a card for one pipeline run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VocabItem {
    pub front: String,
    pub back: String,
}

impl VocabItem {
    /// Items with nothing on either side carry no material for the prompt.
    pub fn is_empty(&self) -> bool {
        self.front.is_empty() && self.back.is_empty()
    }
}

/// One speaker turn of a generated dialogue.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DialogueLine {
    /// Speaker identifier, "A" or "B".
    pub speaker: String,
    /// Sentence in the source language.
    pub source: String,
    /// Translation in the target language.
    pub target: String,
}

/// An ordered dialogue as returned by the generative service.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Dialogue {
    pub lines: Vec<DialogueLine>,
}
