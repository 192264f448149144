use crate::history::{render_history, Turn};
use crate::rag::RetrievedPassage;

const PREAMBLE: &str = "You are a knowledgeable and friendly medical assistant.\n\
Use the conversation history and the retrieved context to answer clearly and accurately.";

pub const HISTORY_HEADER: &str = "Conversation History:";
pub const CONTEXT_HEADER: &str = "Retrieved Medical Context:";
pub const QUESTION_HEADER: &str = "User Question:";
const ANSWER_CUE: &str = "Helpful and concise answer:";

/// Joins passage texts with blank lines, keeping retrieval order.
pub fn join_passages(passages: &[RetrievedPassage]) -> String {
    passages
        .iter()
        .map(|p| p.content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Assembles the single user message sent to the completion service:
/// preamble, history, retrieved context, then the question.
pub fn build_prompt(history: &[Turn], passages: &[RetrievedPassage], question: &str) -> String {
    format!(
        "{PREAMBLE}\n\n\
         {HISTORY_HEADER}\n{history}\n\n\
         {CONTEXT_HEADER}\n{context}\n\n\
         {QUESTION_HEADER}\n{question}\n\n\
         {ANSWER_CUE}\n",
        history = render_history(history),
        context = join_passages(passages),
        question = question,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn passages(texts: &[&str]) -> Vec<RetrievedPassage> {
        texts
            .iter()
            .map(|t| RetrievedPassage::new(*t, "test"))
            .collect()
    }

    #[test]
    fn passages_are_joined_with_blank_lines_in_order() {
        assert_eq!(join_passages(&passages(&["P2", "P1"])), "P2\n\nP1");
        assert_eq!(join_passages(&[]), "");
    }

    #[test]
    fn sections_appear_in_fixed_order() {
        let history = vec![Turn::user("hi"), Turn::assistant("hello")];
        let prompt = build_prompt(&history, &passages(&["P1", "P2"]), "What is gout?");

        let preamble = prompt.find("medical assistant").unwrap();
        let hist = prompt.find(HISTORY_HEADER).unwrap();
        let ctx = prompt.find(CONTEXT_HEADER).unwrap();
        let q = prompt.find(QUESTION_HEADER).unwrap();
        let cue = prompt.find(ANSWER_CUE).unwrap();
        assert!(preamble < hist && hist < ctx && ctx < q && q < cue);

        let user_line = prompt.find("user: hi").unwrap();
        let assistant_line = prompt.find("assistant: hello").unwrap();
        assert!(hist < user_line && user_line < assistant_line && assistant_line < ctx);

        let p1 = prompt.find("P1").unwrap();
        let p2 = prompt.find("P2").unwrap();
        assert!(ctx < p1 && p1 < p2 && p2 < q);
        assert!(prompt[q..].contains("What is gout?"));
    }

    #[test]
    fn empty_history_and_context_keep_headers() {
        let prompt = build_prompt(&[], &[], "q?");
        assert!(prompt.contains(
            "Conversation History:\n\n\nRetrieved Medical Context:\n\n\nUser Question:\nq?"
        ));
    }
}
