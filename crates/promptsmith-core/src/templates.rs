//! Prompt-engineering templates, one per [`ContextStyle`].
//!
//! Every template contains [`TEMPLATE_MARKER`] exactly once. The catalog is a
//! set of `&'static str` constants and is never mutated.

use crate::types::ContextStyle;

/// Placeholder replaced by the user's prompt.
pub const TEMPLATE_MARKER: &str = "{USER_PROMPT}";

const COMPREHENSIVE: &str = "You are an expert prompt engineer. Analyze the user's prompt and return ONLY an improved version that follows prompt engineering best practices. Do not include explanations, analysis, or additional commentary.

Original Prompt:
{USER_PROMPT}

Improvement Guidelines: Apply these best practices to create a superior prompt:
• **Be explicit and specific**: Use clear action verbs (Analyze, Create, Extract, Generate, etc.) and specify desired output format, length, and style
• **Add helpful context**: Include relevant background information and specify target audience if needed
• **Use positive instructions**: Tell the AI what TO do rather than what NOT to do
• **Include examples**: Add 1-2 relevant examples if they would significantly improve clarity (few-shot prompting)
• **Specify output format**: Request structured output (JSON, markdown, bullet points) when appropriate
• **Add role context**: Include \"Act as [expert role]\" if it would improve the response
• **Request reasoning**: For complex tasks, ask for step-by-step thinking or explanation of approach
• **Control scope**: Be specific about depth, length, and focus areas

Instructions: Transform the original prompt into a significantly improved version that preserves the user's intent while applying prompt engineering best practices. Return ONLY the improved prompt in markdown format with no additional text, explanations, or formatting markers.";

const QUICK: &str = "You are an expert prompt engineer. Improve the following prompt by making it clearer, more specific, and better structured. Apply core prompt engineering principles: use clear action verbs, specify output format, add helpful context, and use positive instructions.

Original prompt: {USER_PROMPT}

Return ONLY the improved prompt in markdown format with no explanations.";

const STRUCTURED: &str = "You are an expert prompt engineer specializing in structured prompts. Transform the following prompt using these principles:
• Clear action verbs and specific instructions
• Defined output format (markdown, JSON, bullets, etc.)
• Proper context and background information
• Step-by-step approach for complex tasks
• Specific scope and requirements

Original prompt: {USER_PROMPT}

Return ONLY the restructured prompt in markdown format that follows these best practices.";

const CREATIVE: &str = "You are an expert prompt engineer focused on creative enhancement. Improve the following prompt to unlock innovative AI responses by:
• Adding role context (\"Act as [creative expert]\")
• Encouraging multiple perspectives and original thinking
• Including example formats for creative outputs
• Specifying creative constraints and desired style
• Requesting iterative or exploratory approaches

Original prompt: {USER_PROMPT}

Return ONLY the enhanced creative prompt in markdown format with no additional commentary.";

impl ContextStyle {
    /// Template text for this style, marker included.
    pub const fn template(self) -> &'static str {
        match self {
            Self::Comprehensive => COMPREHENSIVE,
            Self::Quick => QUICK,
            Self::Structured => STRUCTURED,
            Self::Creative => CREATIVE,
        }
    }

    /// One-line description for listings.
    pub const fn description(self) -> &'static str {
        match self {
            Self::Comprehensive => "Full best-practice rewrite with role, format, and scope guidance",
            Self::Quick => "Short clarity pass on wording and output format",
            Self::Structured => "Restructure into explicit instructions and steps",
            Self::Creative => "Encourage original, exploratory responses",
        }
    }

    /// Substitutes `user_prompt` into this style's template.
    ///
    /// The user's text is inserted once and never rescanned, so a literal
    /// marker inside it survives unchanged.
    pub fn render(self, user_prompt: &str) -> String {
        let template = self.template();
        match template.split_once(TEMPLATE_MARKER) {
            Some((head, tail)) => {
                let mut instruction =
                    String::with_capacity(head.len() + user_prompt.len() + tail.len());
                instruction.push_str(head);
                instruction.push_str(user_prompt);
                instruction.push_str(tail);
                instruction
            }
            None => template.to_owned(),
        }
    }
}

/// Builds the instruction for `context_style`, falling back to the
/// comprehensive template for unknown styles.
pub fn resolve_template(context_style: &str, user_prompt: &str) -> String {
    ContextStyle::resolve(Some(context_style)).render(user_prompt)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_template_has_one_marker() {
        for style in ContextStyle::ALL {
            assert_eq!(
                style.template().matches(TEMPLATE_MARKER).count(),
                1,
                "{style} must contain the marker exactly once"
            );
        }
    }

    #[test]
    fn test_substitution_keeps_surrounding_text() {
        for style in ContextStyle::ALL {
            let rendered = resolve_template(style.as_str(), "Write a haiku");
            let (head, tail) = style.template().split_once(TEMPLATE_MARKER).unwrap();
            assert!(rendered.starts_with(head));
            assert!(rendered.ends_with(tail));
            assert_eq!(rendered.len(), head.len() + "Write a haiku".len() + tail.len());
            assert!(!rendered.contains(TEMPLATE_MARKER));
        }
    }

    #[test]
    fn test_unknown_style_uses_comprehensive() {
        assert_eq!(
            resolve_template("bogus", "hi"),
            resolve_template("comprehensive", "hi")
        );
        assert_eq!(resolve_template("", "hi"), resolve_template("comprehensive", "hi"));
    }

    #[test]
    fn test_marker_in_user_prompt_is_not_replaced() {
        let rendered = resolve_template("quick", "explain {USER_PROMPT} tokens");
        assert!(rendered.contains("Original prompt: explain {USER_PROMPT} tokens\n"));
        assert_eq!(rendered.matches(TEMPLATE_MARKER).count(), 1);
    }

    #[test]
    fn test_prompt_inserted_verbatim() {
        let prompt = "  keep   spacing\nand \"quotes\" <tags> ";
        let rendered = resolve_template("structured", prompt);
        assert!(rendered.contains(&format!("Original prompt: {prompt}\n")));
    }
}
