//! Budget Tracker. The question budget is derived from the transcript, never stored.

use crate::models::transcript::{ConversationTurn, Speaker};

/// Number of interviewer turns that presented a base question.
pub fn presented_base_count(transcript: &[ConversationTurn]) -> usize {
    transcript
        .iter()
        .filter(|t| t.presents_base_question())
        .count()
}

/// `amount - presented`, floored at zero.
pub fn remaining_budget(amount: u32, transcript: &[ConversationTurn]) -> u32 {
    let presented = u32::try_from(presented_base_count(transcript)).unwrap_or(u32::MAX);
    amount.saturating_sub(presented)
}

/// Ordinal of the next unconsumed base question: one past the highest presented.
pub fn next_base_ordinal(transcript: &[ConversationTurn]) -> u32 {
    transcript
        .iter()
        .filter_map(|t| t.base_ordinal)
        .max()
        .map_or(0, |last| last + 1)
}

/// Untagged interviewer turns after the most recent base question
/// (or since the start when none was presented).
pub fn follow_ups_since_last_base(transcript: &[ConversationTurn]) -> usize {
    transcript
        .iter()
        .rev()
        .take_while(|t| !t.presents_base_question())
        .filter(|t| t.role == Speaker::Interviewer)
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::interview::BaseQuestion;

    fn base(ordinal: u32) -> ConversationTurn {
        ConversationTurn::presenting(&BaseQuestion {
            text: format!("Question {ordinal}"),
            ordinal,
        })
    }

    #[test]
    fn test_budget_is_amount_minus_presented() {
        let transcript = vec![
            ConversationTurn::interviewer("Hello"),
            base(0),
            ConversationTurn::candidate("answer"),
            base(1),
        ];
        assert_eq!(presented_base_count(&transcript), 2);
        assert_eq!(remaining_budget(5, &transcript), 3);
    }

    #[test]
    fn test_budget_never_negative() {
        let transcript = vec![base(0), base(1), base(2), base(3)];
        assert_eq!(remaining_budget(3, &transcript), 0);
    }

    #[test]
    fn test_candidate_and_follow_up_turns_do_not_consume_budget() {
        let transcript = vec![
            base(0),
            ConversationTurn::candidate("answer"),
            ConversationTurn::interviewer("Can you expand on that?"),
            ConversationTurn::candidate("more"),
        ];
        assert_eq!(remaining_budget(2, &transcript), 1);
    }

    #[test]
    fn test_next_ordinal_follows_highest_presented() {
        assert_eq!(next_base_ordinal(&[]), 0);
        assert_eq!(next_base_ordinal(&[base(0), base(1)]), 2);
    }

    #[test]
    fn test_follow_ups_counted_since_last_base() {
        let transcript = vec![
            ConversationTurn::interviewer("Hello"),
            base(0),
            ConversationTurn::candidate("a"),
            ConversationTurn::interviewer("Why?"),
            ConversationTurn::candidate("b"),
        ];
        assert_eq!(follow_ups_since_last_base(&transcript), 1);
        assert_eq!(follow_ups_since_last_base(&transcript[..3]), 0);
        assert_eq!(
            follow_ups_since_last_base(&[ConversationTurn::interviewer("Hello")]),
            1
        );
    }
}
