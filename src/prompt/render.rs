//! Prompt Renderer - Render templates with context variables using Handlebars
//!
//! Built-in templates are registered at construction; callers may register
//! more or render ad-hoc template strings.

use handlebars::Handlebars;
use serde::Serialize;

use crate::error::{AgentError, Result};

/// System prompt for every tool-calling agent.
///
/// Context: `instructions` (may be empty) and `tools` (list of `{name, description}`).
pub const AGENT_SYSTEM_TEMPLATE: &str = "\
{{#if instructions}}{{instructions}}

{{/if}}Answer the following request as best you can. You have access to the following tools:

{{#each tools}}- {{name}}: {{description}}
{{/each}}
Call a tool whenever it helps. Once you know the final answer, reply with it directly \
without calling any tool.";

/// Instructions for the tabular-data agent.
///
/// Context: `path`, `rows`, `preview`.
pub const CSV_INSTRUCTIONS_TEMPLATE: &str = "\
You are working with a pandas dataframe in Python. The name of the dataframe is `df`; \
it is loaded from `{{path}}` before every snippet you run.
Answer questions by running code over the whole dataframe. The preview below shows only the \
first {{rows}} lines of the file and is not enough to answer counting or ranking questions.

```
{{preview}}
```";

/// Renders prompt templates using Handlebars templating
pub struct PromptRenderer {
    handlebars: Handlebars<'static>,
}

impl Default for PromptRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl PromptRenderer {
    /// Create a renderer with the built-in templates registered
    pub fn new() -> Self {
        let mut handlebars = Handlebars::new();
        handlebars.set_strict_mode(false);
        // Prompts are plain text, not HTML
        handlebars.register_escape_fn(handlebars::no_escape);

        let mut renderer = Self { handlebars };
        for (name, template) in [
            ("agent_system", AGENT_SYSTEM_TEMPLATE),
            ("csv_instructions", CSV_INSTRUCTIONS_TEMPLATE),
        ] {
            if let Err(e) = renderer.register_template(name, template) {
                log::error!("Built-in template {} failed to register: {}", name, e);
            }
        }
        renderer
    }

    /// Render a template string with any serializable context
    pub fn render_with<T: Serialize>(&self, template: &str, context: &T) -> Result<String> {
        self.handlebars
            .render_template(template, context)
            .map_err(|e| AgentError::Prompt(format!("Failed to render template: {}", e)))
    }

    /// Register a named template for later use
    pub fn register_template(&mut self, name: &str, template: &str) -> Result<()> {
        self.handlebars
            .register_template_string(name, template)
            .map_err(|e| AgentError::Prompt(format!("Failed to register template '{}': {}", name, e)))
    }

    /// Render a previously registered template
    pub fn render_named<T: Serialize>(&self, name: &str, context: &T) -> Result<String> {
        self.handlebars
            .render(name, context)
            .map_err(|e| AgentError::Prompt(format!("Failed to render template '{}': {}", name, e)))
    }

    /// Check if a named template is registered
    pub fn has_template(&self, name: &str) -> bool {
        self.handlebars.get_template(name).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_builtins_registered() {
        let renderer = PromptRenderer::new();
        assert!(renderer.has_template("agent_system"));
        assert!(renderer.has_template("csv_instructions"));
        assert!(!renderer.has_template("nonexistent"));
    }

    #[test]
    fn test_render_no_escape_html() {
        let renderer = PromptRenderer::new();
        let result = renderer
            .render_with("Code: {{code}}", &json!({"code": "df[df['x'] > 1] & <b>"}))
            .unwrap();
        assert_eq!(result, "Code: df[df['x'] > 1] & <b>");
    }

    #[test]
    fn test_agent_system_with_instructions() {
        let renderer = PromptRenderer::new();
        let prompt = renderer
            .render_named(
                "agent_system",
                &json!({
                    "instructions": "You write python.",
                    "tools": [
                        {"name": "python_repl", "description": "A Python shell."},
                        {"name": "multiply", "description": "Multiply two numbers."}
                    ]
                }),
            )
            .unwrap();

        assert!(prompt.starts_with("You write python.\n\nAnswer the following request"));
        assert!(prompt.contains("- python_repl: A Python shell.\n- multiply: Multiply two numbers.\n"));
        assert!(prompt.ends_with("without calling any tool."));
    }

    #[test]
    fn test_agent_system_without_instructions() {
        let renderer = PromptRenderer::new();
        let prompt = renderer
            .render_named("agent_system", &json!({"instructions": "", "tools": []}))
            .unwrap();
        assert!(prompt.starts_with("Answer the following request"));
    }

    #[test]
    fn test_csv_instructions() {
        let renderer = PromptRenderer::new();
        let prompt = renderer
            .render_named(
                "csv_instructions",
                &json!({"path": "episode_info.csv", "rows": 2, "preview": "a,b\n1,2"}),
            )
            .unwrap();
        assert!(prompt.contains("loaded from `episode_info.csv`"));
        assert!(prompt.contains("first 2 lines"));
        assert!(prompt.contains("```\na,b\n1,2\n```"));
    }

    #[test]
    fn test_render_named_not_found() {
        let renderer = PromptRenderer::new();
        assert!(matches!(
            renderer.render_named("nonexistent", &json!({})),
            Err(AgentError::Prompt(_))
        ));
    }

    #[test]
    fn test_register_invalid_template() {
        let mut renderer = PromptRenderer::new();
        assert!(renderer.register_template("broken", "{{#if}}").is_err());
    }
}
