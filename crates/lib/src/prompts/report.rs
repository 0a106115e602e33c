//! # Report Prompts
//!
//! Templates for the report flow, where blocks of an already-enriched table
//! are sent back to the model for review and returned as a Markdown table.

/// The user prompt used when none is supplied.
pub const DEFAULT_REPORT_USER_PROMPT: &str = r#"Analyze the following data and provide complete knowledge-learning suggestions. Pay particular attention to:
  1. A clear definition and explanation of each knowledge term;
  2. Extended suggestions: related knowledge or fields worth studying next;
  3. Practical application: how the knowledge is used in real life, with concrete examples;
  4. Up-to-date external information or learning resources related to each term;
  5. Finally, 3-5 simple concept-check questions (multiple choice or short answer) to confirm understanding.
Provide a complete, easy-to-follow reply with real learning value."#;

/// The instruction template for one block of CSV rows.
///
/// Placeholders: `{start}`, `{end}`, `{csv}`, `{user_prompt}`
pub const DEFAULT_REPORT_BLOCK_PROMPT: &str = r#"Below are rows {start} to {end} of the CSV data:
{csv}

Analyze the data according to the following rules and produce a report as a Markdown table:
1. For each knowledge term, check whether its definition, extended suggestions, practical application, external resources and concept questions are complete.
2. If any field is missing or incomplete, supply the missing content (for example a detailed definition or a concrete application case).
3. The output must be a Markdown table containing all original columns, with the supplementary content placed in the appropriate columns.
4. Supplementary content must be clear, specific and consistent with the existing data.
{user_prompt}"#;

/// Fills the block template. `start` and `end` are 1-based and inclusive.
pub fn compose_block_prompt(
    template: &str,
    start: usize,
    end: usize,
    csv: &str,
    user_prompt: &str,
) -> String {
    template
        .replace("{start}", &start.to_string())
        .replace("{end}", &end.to_string())
        .replace("{csv}", csv)
        .replace("{user_prompt}", user_prompt)
}
