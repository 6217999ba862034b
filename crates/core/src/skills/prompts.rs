//! Default prompt templates bundled at compile time.
//!
//! These are used for seeding the database on first run.
//! At runtime, the coordinator prefers the database copy so prompts stay
//! editable without a rebuild.

/// Responder - answers the human's question from recalled context
pub const RESPONDER: &str = include_str!("defaults/responder.md");

/// Analyst - judges whether the exchange holds durable facts
pub const ANALYST: &str = include_str!("defaults/analyst.md");

/// Confirmer - final yes/no call on saving the memory
pub const CONFIRMER: &str = include_str!("defaults/confirmer.md");

/// All default prompts with their slugs for seeding
pub fn all_defaults() -> Vec<(&'static str, &'static str)> {
    vec![
        ("responder", RESPONDER),
        ("analyst", ANALYST),
        ("confirmer", CONFIRMER),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_prompts_non_empty() {
        for (slug, content) in all_defaults() {
            assert!(!content.is_empty(), "Prompt '{}' should not be empty", slug);
            assert!(content.len() > 50, "Prompt '{}' seems too short", slug);
        }
    }

    #[test]
    fn test_prompt_count() {
        assert_eq!(all_defaults().len(), 3, "Should have 3 default prompts");
    }
}
