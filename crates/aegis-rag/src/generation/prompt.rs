//! Prompt templates for conversational retrieval

use crate::retrieval::ScoredChunk;

use super::session::Turn;

/// Prompt builder for RAG queries
pub struct PromptBuilder;

impl PromptBuilder {
    /// Build numbered context from retrieved chunks
    pub fn build_context(results: &[ScoredChunk]) -> String {
        let mut context = String::new();

        for (i, result) in results.iter().enumerate() {
            let source_ref = result.chunk.source.format_citation(result.chunk.chunk_index);

            context.push_str(&format!(
                "[{}] {}\n{}\n\n---\n\n",
                i + 1,
                source_ref,
                result.chunk.content
            ));
        }

        context
    }

    /// Render prior turns, oldest first
    pub fn format_history(turns: &[Turn]) -> String {
        turns
            .iter()
            .map(|t| format!("User: {}\nAssistant: {}", t.question, t.answer))
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Build the full answer prompt
    pub fn build_answer_prompt(question: &str, results: &[ScoredChunk], history: &[Turn]) -> String {
        let history = if history.is_empty() {
            "(no previous questions)".to_string()
        } else {
            Self::format_history(history)
        };

        format!(
            r#"You are an assistant answering questions about the user's uploaded documents.

INSTRUCTIONS:
1. Answer using only the information in the context below
2. Use the conversation history to resolve follow-up questions
3. Mention the source file when you rely on a specific passage
4. If the answer is not in the context, say that you cannot find it in the provided documents

CONTEXT FROM DOCUMENTS:
{context}
CONVERSATION HISTORY:
{history}

QUESTION: {question}

Answer:"#,
            context = Self::build_context(results),
            history = history,
            question = question
        )
    }

    /// Build a prompt that rewrites a follow-up into a standalone question
    pub fn build_condense_prompt(question: &str, history: &[Turn]) -> String {
        format!(
            r#"Given the following conversation and a follow-up question, rephrase the follow-up question to be a standalone question. Reply with the question only.

Chat History:
{history}

Follow-up question: {question}

Standalone question:"#,
            history = Self::format_history(history),
            question = question
        )
    }
}
