//! # Prompt Composition Tests
//!
//! Checks the combined batch prompt and the report block prompt as the
//! model will see them.

use knowbatch::{
    prompts::{
        compose_batch_prompt, compose_block_prompt, PromptComposer, DEFAULT_REPORT_BLOCK_PROMPT,
        DEFAULT_REPORT_USER_PROMPT,
    },
    types::ResultField,
    WorkItem,
};

fn items(terms: &[&str]) -> Vec<WorkItem> {
    terms.iter().map(|t| WorkItem::new(t)).collect()
}

#[test]
fn test_batch_prompt_lists_terms_in_order() {
    let prompt = compose_batch_prompt(&items(&["photosynthesis", "entropy", "osmosis"]), "-----");

    assert!(prompt.starts_with("You are processing 3 knowledge terms."));
    let first = prompt.find("1. photosynthesis").unwrap();
    let second = prompt.find("2. entropy").unwrap();
    let third = prompt.find("3. osmosis").unwrap();
    assert!(first < second && second < third);
    assert!(prompt.ends_with("photosynthesis\n-----\nentropy\n-----\nosmosis"));
}

#[test]
fn test_batch_prompt_describes_each_field() {
    let prompt = compose_batch_prompt(&items(&["entropy"]), "-----");
    for field in ResultField::ALL {
        assert!(
            prompt.contains(field.instruction()),
            "instruction for '{}' missing",
            field.key()
        );
    }
    // The example reply shows the delimiter between two objects.
    assert!(prompt.contains("}\n-----\n{...}"));
}

#[test]
fn test_terms_are_trimmed_before_composition() {
    let composer = PromptComposer::new("-----").unwrap();
    let prompt = composer.compose(&[WorkItem::new("  padded term \t")]);
    assert!(prompt.contains("1. padded term\n"));
    assert!(prompt.ends_with("\n\npadded term"));
}

#[test]
fn test_block_prompt_fills_every_placeholder() {
    let csv = "knowledge_term,definition\nentropy,disorder\n";
    let prompt = compose_block_prompt(
        DEFAULT_REPORT_BLOCK_PROMPT,
        31,
        60,
        csv,
        DEFAULT_REPORT_USER_PROMPT,
    );

    assert!(prompt.starts_with("Below are rows 31 to 60 of the CSV data:\n"));
    assert!(prompt.contains(csv));
    assert!(prompt.ends_with(DEFAULT_REPORT_USER_PROMPT));
    for placeholder in ["{start}", "{end}", "{csv}", "{user_prompt}"] {
        assert!(!prompt.contains(placeholder));
    }
}
