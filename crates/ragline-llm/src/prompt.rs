//! Minimal `{name}` placeholder prompt templates.

/// A prompt template with `{name}` placeholders.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    template: String,
}

impl PromptTemplate {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    /// Substitute every `{name}` placeholder with its value.
    /// Unknown placeholders are left in place.
    pub fn fill(&self, vars: &[(&str, &str)]) -> String {
        let mut out = self.template.clone();
        for (name, value) in vars {
            out = out.replace(&format!("{{{}}}", name), value);
        }
        out
    }
}
