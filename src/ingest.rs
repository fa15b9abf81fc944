use crate::models::Card;
use anyhow::{Context, Result};
use flate2::read::GzDecoder;
use serde::Deserialize;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use uuid::Uuid;

// Serde view of the Pauker lesson XML. Every part of a card may be absent;
// missing text defaults to "" and a missing LearnedTimestamp to 0.

#[derive(Deserialize)]
struct Lesson {
    #[serde(rename = "Batch", default)]
    batches: Vec<Batch>,
}

#[derive(Deserialize)]
struct Batch {
    #[serde(rename = "Card", default)]
    cards: Vec<XmlCard>,
}

#[derive(Deserialize)]
struct XmlCard {
    #[serde(rename = "FrontSide")]
    front_side: Option<Side>,
    #[serde(rename = "ReverseSide")]
    reverse_side: Option<Side>,
}

#[derive(Deserialize)]
struct Side {
    #[serde(rename = "@LearnedTimestamp")]
    learned_timestamp: Option<i64>,
    #[serde(rename = "Text")]
    text: Option<String>,
}

/// Reads a gzipped Pauker lesson and returns its cards in deck order.
pub fn read_deck(path: &Path) -> Result<Vec<Card>> {
    let file = File::open(path).with_context(|| format!("Failed to open {:?}", path))?;
    let reader = BufReader::new(GzDecoder::new(file));
    parse_deck(reader).with_context(|| format!("Failed to parse deck {:?}", path))
}

/// Parses the decompressed lesson XML. Batch numbers are 1-based, matching
/// the numbering Pauker shows to the user.
pub fn parse_deck<R: BufRead>(reader: R) -> Result<Vec<Card>> {
    let lesson: Lesson = quick_xml::de::from_reader(reader)?;
    let mut cards = Vec::new();
    for (batch_index, batch) in lesson.batches.iter().enumerate() {
        for card in &batch.cards {
            let (front_text, learned_timestamp) = match &card.front_side {
                Some(side) => (
                    side.text.clone().unwrap_or_default(),
                    side.learned_timestamp.unwrap_or(0),
                ),
                None => (String::new(), 0),
            };
            let back_text = card
                .reverse_side
                .as_ref()
                .and_then(|side| side.text.clone())
                .unwrap_or_default();
            cards.push(Card {
                id: Uuid::new_v4().to_string(),
                batch_number: (batch_index + 1) as i64,
                front_text,
                back_text,
                learned_timestamp,
            });
        }
    }
    Ok(cards)
}

#[test]
fn test_parse_deck_extracts_cards_per_batch() {
    use std::io::Cursor;

    let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<Lesson LessonFormat="1.7">
  <Description>Test lesson</Description>
  <Batch>
    <Card>
      <FrontSide LearnedTimestamp="1700000000">
        <Text>Guten Morgen</Text>
      </FrontSide>
      <ReverseSide>
        <Text>Dzie&#324; dobry</Text>
      </ReverseSide>
    </Card>
  </Batch>
  <Batch>
    <Card>
      <FrontSide>
        <Text>Danke</Text>
      </FrontSide>
    </Card>
  </Batch>
</Lesson>"#;
    let cards = parse_deck(Cursor::new(xml.as_bytes())).unwrap();

    assert_eq!(cards.len(), 2);
    assert_eq!(cards[0].batch_number, 1);
    assert_eq!(cards[0].front_text, "Guten Morgen");
    assert_eq!(cards[0].back_text, "Dzień dobry");
    assert_eq!(cards[0].learned_timestamp, 1700000000);
    assert_eq!(cards[1].batch_number, 2);
    assert_eq!(cards[1].front_text, "Danke");
    assert_eq!(cards[1].back_text, "");
    assert_eq!(cards[1].learned_timestamp, 0);
    assert_ne!(cards[0].id, cards[1].id);
}

#[test]
fn test_parse_deck_rejects_malformed_xml() {
    use std::io::Cursor;

    let result = parse_deck(Cursor::new(b"<Lesson><Batch>" as &[u8]));
    assert!(result.is_err());
}
