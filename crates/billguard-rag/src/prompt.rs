//! Prompt templates with `{context}` and `{input}` slots

use billguard_core::{Error, Result};

pub const DEFAULT_PROMPT_TEMPLATE: &str = "Answer the following question based only on the provided context:

<context>
{context}
</context>

Question: {input}";

const CONTEXT_SLOT: &str = "{context}";
const INPUT_SLOT: &str = "{input}";

/// A validated prompt template
#[derive(Debug, Clone, PartialEq)]
pub struct PromptTemplate {
    template: String,
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self {
            template: DEFAULT_PROMPT_TEMPLATE.to_string(),
        }
    }
}

impl PromptTemplate {
    /// Parse a custom template; both slots must be present
    pub fn parse(template: impl Into<String>) -> Result<Self> {
        let template = template.into();
        let missing: Vec<&str> = [CONTEXT_SLOT, INPUT_SLOT]
            .into_iter()
            .filter(|slot| !template.contains(slot))
            .collect();

        if !missing.is_empty() {
            return Err(Error::InvalidInput(format!(
                "prompt template must contain {}",
                missing.join(" and ")
            )));
        }

        Ok(Self { template })
    }

    pub fn as_str(&self) -> &str {
        &self.template
    }

    /// Fill both slots in a single pass, so text substituted into one slot
    /// is never re-expanded.
    pub fn render(&self, context: &str, input: &str) -> String {
        let mut rendered = String::with_capacity(self.template.len() + context.len() + input.len());
        let mut rest = self.template.as_str();

        loop {
            let next = [(CONTEXT_SLOT, context), (INPUT_SLOT, input)]
                .into_iter()
                .filter_map(|(slot, value)| rest.find(slot).map(|at| (at, slot, value)))
                .min_by_key(|(at, _, _)| *at);

            match next {
                Some((at, slot, value)) => {
                    rendered.push_str(&rest[..at]);
                    rendered.push_str(value);
                    rest = &rest[at + slot.len()..];
                }
                None => {
                    rendered.push_str(rest);
                    return rendered;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_snapshot;

    #[test]
    fn test_default_render() {
        let prompt = PromptTemplate::default().render("Total Amount Due: $42.00", "How much do I owe?");
        assert_snapshot!(prompt, @r###"
        Answer the following question based only on the provided context:

        <context>
        Total Amount Due: $42.00
        </context>

        Question: How much do I owe?
        "###);
    }

    #[test]
    fn test_missing_slots_rejected() {
        let err = PromptTemplate::parse("Just answer: {input}").unwrap_err();
        assert_eq!(err.to_string(), "Invalid input: prompt template must contain {context}");

        let err = PromptTemplate::parse("nothing here").unwrap_err();
        assert!(err.to_string().contains("{context} and {input}"));
    }

    #[test]
    fn test_substituted_text_not_reexpanded() {
        let template = PromptTemplate::parse("{input} | {context} | {input}").unwrap();
        assert_eq!(template.render("ctx {input}", "q"), "q | ctx {input} | q");
    }
}
