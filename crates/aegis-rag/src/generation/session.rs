//! Conversation history

use serde::{Deserialize, Serialize};

/// One question and the answer it received
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub question: String,
    pub answer: String,
}

/// Ordered question/answer turns supplying context to follow-up questions
#[derive(Debug, Clone, Default)]
pub struct ConversationSession {
    turns: Vec<Turn>,
    /// Oldest turns are dropped beyond this many (0 = unbounded)
    max_turns: usize,
}

impl ConversationSession {
    pub fn new(max_turns: usize) -> Self {
        Self {
            turns: Vec::new(),
            max_turns,
        }
    }

    /// Append a completed turn
    pub fn push(&mut self, question: impl Into<String>, answer: impl Into<String>) {
        self.turns.push(Turn {
            question: question.into(),
            answer: answer.into(),
        });

        if self.max_turns > 0 && self.turns.len() > self.max_turns {
            let excess = self.turns.len() - self.max_turns;
            self.turns.drain(..excess);
        }
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Drop all history
    pub fn clear(&mut self) {
        self.turns.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_turns_keep_order() {
        let mut session = ConversationSession::default();
        assert!(session.is_empty());

        session.push("q1", "a1");
        session.push("q2", "a2");

        assert_eq!(session.len(), 2);
        assert_eq!(session.turns()[0].question, "q1");
        assert_eq!(session.turns()[1].answer, "a2");
    }

    #[test]
    fn test_max_turns_drops_oldest() {
        let mut session = ConversationSession::new(2);
        session.push("q1", "a1");
        session.push("q2", "a2");
        session.push("q3", "a3");

        let questions: Vec<&str> = session.turns().iter().map(|t| t.question.as_str()).collect();
        assert_eq!(questions, vec!["q2", "q3"]);

        session.clear();
        assert!(session.is_empty());
    }
}
