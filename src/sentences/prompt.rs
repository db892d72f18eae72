use super::SentenceRequest;

const DEFAULT_TEMPLATE: &str = "Generate {count} exercises for learning the word '{spelling}'.
Word: '{spelling}'. Definition: '{definition}'. Lexical Category: {category}.

Instructions:
- Each sentence should use the word '{spelling}'.
- Format each sentence with the word '{spelling}' prefixed with <% and postfixed with %>.
- Ensure the sentences are varied and cover different tenses if applicable.";

/// Prompt text with `{count}`, `{spelling}`, `{definition}` and `{category}`
/// placeholders.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    template: String,
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self::new(DEFAULT_TEMPLATE)
    }
}

impl PromptTemplate {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    pub fn render(&self, request: SentenceRequest<'_>, count: usize) -> String {
        // Single pass so placeholder-like text inside a value stays literal.
        let mut out = String::with_capacity(self.template.len() + 64);
        let mut rest = self.template.as_str();
        while let Some(start) = rest.find('{') {
            out.push_str(&rest[..start]);
            let tail = &rest[start..];
            let value = tail.find('}').and_then(|end| {
                let replacement = match &tail[1..end] {
                    "count" => count.to_string(),
                    "spelling" => request.spelling.to_string(),
                    "definition" => request.definition.to_string(),
                    "category" => request.lexical_category.to_string(),
                    _ => return None,
                };
                Some((replacement, end + 1))
            });
            match value {
                Some((replacement, consumed)) => {
                    out.push_str(&replacement);
                    rest = &tail[consumed..];
                }
                None => {
                    out.push('{');
                    rest = &tail[1..];
                }
            }
        }
        out.push_str(rest);
        out
    }
}
