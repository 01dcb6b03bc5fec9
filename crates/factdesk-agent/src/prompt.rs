//! Prompt construction.
//!
//! The prompt is one string: a fixed instruction preamble, the fact list as
//! `- ` bullets, and the user's question verbatim.

use crate::knowledge::KnowledgeBase;

/// The reply the model must give when the facts do not cover the question.
pub const NO_INFORMATION_REPLY: &str = "I'm sorry, I don't have information about that.";

/// Instructions placed before the fact list.
///
/// The "no information" reply is always requested in the language of the
/// question, as is every other answer.
pub const PREAMBLE: &str = "You are a helpful assistant on a company's website. \
Answer the user's question strictly based on the \"Known Information\" provided below. \
Do not use any external knowledge. \
If the answer is not in the \"Known Information\", you must reply with \
\"I'm sorry, I don't have information about that.\" translated into the language of the user's question. \
Always answer in the language of the user's question.";

const KNOWN_INFORMATION_HEADER: &str = "[Known Information]";
const QUESTION_HEADER: &str = "[User's Question]";

/// Build the completion prompt for `question`.
pub fn build_prompt(knowledge: &KnowledgeBase, question: &str) -> String {
    let facts_len: usize = knowledge.facts().iter().map(|f| f.len() + 3).sum();
    let mut prompt = String::with_capacity(PREAMBLE.len() + facts_len + question.len() + 64);

    prompt.push_str(PREAMBLE);
    prompt.push_str("\n\n");
    prompt.push_str(KNOWN_INFORMATION_HEADER);
    for fact in knowledge.facts() {
        prompt.push_str("\n- ");
        prompt.push_str(fact);
    }
    prompt.push_str("\n\n");
    prompt.push_str(QUESTION_HEADER);
    prompt.push('\n');
    prompt.push_str(question);

    prompt
}
