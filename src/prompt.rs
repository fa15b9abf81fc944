use crate::models::VocabItem;

/// Register and language pair the dialogue is written for.
pub struct PromptConfig {
    pub source_language: &'static str,
    pub target_language: &'static str,
    /// CEFR proficiency level of the intended reader.
    pub level: &'static str,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            source_language: "German",
            target_language: "Polish",
            level: "A1 beginner",
        }
    }
}

/// System-role persona sent alongside the instruction document.
pub fn persona(config: &PromptConfig) -> String {
    format!(
        "You are an expert in dialog creation for {} level learners of {}. \
         Create a dialog with a clear structure.",
        config.level, config.target_language
    )
}

/// Builds the instruction document for the generative service. Pure function
/// of the vocabulary list and the configuration; the item order is whatever
/// the sampler produced.
pub fn build_prompt(items: &[VocabItem], config: &PromptConfig) -> String {
    let item_list = items
        .iter()
        .map(|item| format!("{},{}", item.front, item.back))
        .collect::<Vec<_>>()
        .join(";");

    format!(
        "\
Create a natural dialogue between two people (A and B) following these strict rules:
1. Input Vocabulary Format:
- Items are provided in format (front/back): {source} sentence,{target} translation — joined by ';'
- Vocabulary items serve as INSPIRATION for unique dialogue content

2. Dialogue Creation Guidelines:
- The dialog is in {source} AND {target}.
- Every sentence is presented in {source} and has the {target} translation in […]
- Begin each line with 'A:' or 'B:'
- Maintain natural, logical conversation flow
- USE ALL provided vocabulary items exactly once
- Distribute vocabulary items RANDOMLY throughout dialogue
- CRUCIAL REQUIREMENT: Create ENTIRELY NEW contexts and examples
    - NO direct repetition of input scenarios
    - RADICAL transformation of original context
    - Generate completely original dialogue scenarios
- Avoid ANY literal repetition or direct adaptation of input examples

3. Creativity Mandate:
- Invent fresh narrative contexts
- Demonstrate linguistic creativity
- Ensure vocabulary items feel organic and spontaneous in use

Example Transformation Principle:
Input: a 2nd person, present tense statement
FORBIDDEN: Repeating the same person and tense scenario
REQUIRED: Completely different context (e.g., different person, time, object)

Objective: Generate a dialogue that feels natural, surprising, and completely \
divorced from the original input while faithfully incorporating all provided \
vocabulary items.

Items:
{items}
",
        source = config.source_language,
        target = config.target_language,
        items = item_list,
    )
}

#[test]
fn test_prompt_enumerates_items_with_semicolons() {
    let items = vec![
        VocabItem {
            front: "Guten Morgen".to_string(),
            back: "Dzień dobry".to_string(),
        },
        VocabItem {
            front: "Danke".to_string(),
            back: "Dziękuję".to_string(),
        },
    ];
    let prompt = build_prompt(&items, &PromptConfig::default());

    assert!(prompt.contains("Guten Morgen,Dzień dobry;Danke,Dziękuję"));
    assert!(prompt.contains("'A:' or 'B:'"));
    assert!(prompt.contains("exactly once"));
}

#[test]
fn test_prompt_names_configured_languages() {
    let config = PromptConfig {
        source_language: "French",
        target_language: "English",
        level: "B2",
    };
    let prompt = build_prompt(&[], &config);

    assert!(prompt.contains("French AND English"));
    assert!(persona(&config).contains("B2 level learners of English"));
}

#[test]
fn test_prompt_with_empty_vocabulary_still_builds() {
    let prompt = build_prompt(&[], &PromptConfig::default());
    assert!(prompt.ends_with("Items:\n\n"));
}
