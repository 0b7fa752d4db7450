use crate::models::{ChatMessage, Match};
use crate::sanitize::sanitize;

/// Build the grounding context from retrieved matches: sanitized chunk
/// texts in index order, separated by blank lines. Matches without a
/// `text` field contribute nothing; zero matches yields an empty context.
pub fn build_context(matches: &[Match]) -> String {
    matches
        .iter()
        .filter_map(|m| m.metadata.text.as_deref())
        .map(sanitize)
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Build the system instruction. The language directive is appended only
/// when the caller asked for one; an empty directive would read as an
/// instruction to the model and skew answers.
pub fn build_system_prompt(org_name: &str, language: Option<&str>) -> String {
    let mut prompt = format!(
        "You are a helpful assistant that accurately answers questions about {org_name} \
         from its published documents. Use the text provided to form your answer, but \
         avoid copying word-for-word from the original text. Try to use your own words \
         when possible. Keep your answer under 5 sentences. Be accurate, helpful, \
         concise, and clear. If you cannot find the answer in the context, say so \
         politely and suggest contacting {org_name} directly for more accurate \
         information."
    );

    if let Some(language) = language.map(str::trim).filter(|l| !l.is_empty()) {
        prompt.push_str(&format!(
            "\n\nIMPORTANT: You MUST respond in {language} regardless of the language \
             of the source text. If you need to translate information from the source \
             text, do so accurately while maintaining the meaning."
        ));
    }

    prompt
}

/// Assemble the two-message prompt: the system instruction and a user turn
/// carrying the context block and the question.
pub fn build_messages(system_prompt: String, context: &str, question: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(system_prompt),
        ChatMessage::user(format!("Context:\n{context}\n\nQuestion:\n{question}")),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MatchMetadata;

    fn make_match(id: &str, score: f32, text: &str) -> Match {
        Match {
            id: id.to_string(),
            score,
            metadata: MatchMetadata {
                text: Some(text.to_string()),
                ..Default::default()
            },
        }
    }

    // ─── Context assembly ────────────────────────────────

    #[test]
    fn test_build_context_preserves_index_order() {
        let matches = vec![make_match("a", 0.9, "A"), make_match("b", 0.7, "B")];
        assert_eq!(build_context(&matches), "A\n\nB");
    }

    #[test]
    fn test_build_context_empty_matches() {
        assert_eq!(build_context(&[]), "");
    }

    #[test]
    fn test_build_context_skips_matches_without_text() {
        let mut matches = vec![make_match("a", 0.9, "first")];
        matches.push(Match {
            id: "b".to_string(),
            score: 0.8,
            metadata: MatchMetadata::default(),
        });
        matches.push(make_match("c", 0.7, "second"));
        assert_eq!(build_context(&matches), "first\n\nsecond");
    }

    #[test]
    fn test_build_context_sanitizes_chunk_text() {
        let matches = vec![make_match("a", 0.9, "fees \u{2014} “overview”")];
        assert_eq!(build_context(&matches), "fees - \"overview\"");
    }

    // ─── System prompt ───────────────────────────────────

    #[test]
    fn test_system_prompt_names_organization() {
        let prompt = build_system_prompt("Acme Credit Union", None);
        assert!(prompt.contains("questions about Acme Credit Union"));
        assert!(prompt.contains("contacting Acme Credit Union directly"));
    }

    #[test]
    fn test_system_prompt_language_directive_when_requested() {
        let prompt = build_system_prompt("Acme", Some("French"));
        assert!(prompt.contains("MUST respond in French"));
    }

    #[test]
    fn test_system_prompt_no_language_directive_by_default() {
        let prompt = build_system_prompt("Acme", None);
        assert!(!prompt.contains("respond in"));
        assert!(!prompt.contains("IMPORTANT"));
    }

    #[test]
    fn test_system_prompt_blank_language_treated_as_absent() {
        let prompt = build_system_prompt("Acme", Some("   "));
        assert!(!prompt.contains("IMPORTANT"));
    }

    // ─── Message assembly ────────────────────────────────

    #[test]
    fn test_messages_are_system_then_user() {
        let msgs = build_messages("sys".to_string(), "some context", "what is X?");
        assert_eq!(msgs.len(), 2);
        assert_eq!(msgs[0].role, "system");
        assert_eq!(msgs[0].content, "sys");
        assert_eq!(msgs[1].role, "user");
        assert_eq!(
            msgs[1].content,
            "Context:\nsome context\n\nQuestion:\nwhat is X?"
        );
    }

    #[test]
    fn test_messages_well_formed_with_empty_context() {
        let msgs = build_messages("sys".to_string(), "", "anything indexed?");
        assert_eq!(msgs.len(), 2);
        assert_eq!(msgs[1].content, "Context:\n\n\nQuestion:\nanything indexed?");
    }
}
