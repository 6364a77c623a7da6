//! Prompt templates sent to the language model.

use crate::feedback::FeedbackRecord;

/// Build the prompt that condenses one batch of document chunks.
pub(crate) fn build_batch_prompt(batch: &[String]) -> String {
    let mut prompt = String::from(
        "The following excerpts come from a PDF document, in reading order. Condense them into a concise summary that keeps every key point.\n\n",
    );
    for chunk in batch {
        prompt.push_str(&format!("- {chunk}\n"));
    }
    prompt.push_str(
        "\nRespond with the summary text only, without any introduction, heading, or closing remark.",
    );
    prompt
}

/// Build the prompt that condenses feedback collected about a volunteer.
pub(crate) fn build_feedback_prompt(volunteer_id: &str, records: &[FeedbackRecord]) -> String {
    let mut prompt = format!(
        "Below is feedback collected about volunteer '{volunteer_id}'. Summarize their strengths, recurring concerns, and overall reception in a short paragraph.\n\n"
    );
    for record in records {
        let line = record.describe();
        if line.is_empty() {
            continue;
        }
        prompt.push_str(&format!("- {line}\n"));
    }
    prompt.push_str("\nRespond with the summary text only, without any introduction.");
    prompt
}
