use regex::Regex;

/// Generic free-text constraints.
#[derive(Debug, Clone)]
pub struct TextRule {
    pub required: bool,
    pub min_length: usize,
    pub max_length: usize,
    pub pattern: Option<Regex>,
    pub pattern_message: String,
}

impl Default for TextRule {
    fn default() -> Self {
        Self {
            required: true,
            min_length: 0,
            max_length: 1000,
            pattern: None,
            pattern_message: "Invalid format".to_string(),
        }
    }
}

impl TextRule {
    pub fn optional() -> Self {
        Self {
            required: false,
            ..Self::default()
        }
    }

    pub fn with_length(mut self, min_length: usize, max_length: usize) -> Self {
        self.min_length = min_length;
        self.max_length = max_length;
        self
    }

    pub fn with_pattern(mut self, pattern: Regex, message: impl Into<String>) -> Self {
        self.pattern = Some(pattern);
        self.pattern_message = message.into();
        self
    }

    /// Validates `text`; `field_name` labels the messages.
    ///
    /// Length and pattern checks only apply to non-empty text.
    pub fn validate(&self, text: &str, field_name: &str) -> Option<String> {
        if self.required && text.trim().is_empty() {
            return Some(format!("{} is required", field_name));
        }
        if text.is_empty() {
            return None;
        }
        let length = text.chars().count();
        if length < self.min_length {
            return Some(format!(
                "{} must be at least {} characters long",
                field_name, self.min_length
            ));
        }
        if length > self.max_length {
            return Some(format!(
                "{} must be no more than {} characters long",
                field_name, self.max_length
            ));
        }
        if let Some(pattern) = &self.pattern {
            if !pattern.is_match(text) {
                return Some(self.pattern_message.clone());
            }
        }
        None
    }
}

pub fn validate_text(text: &str, field_name: &str, rule: &TextRule) -> Option<String> {
    rule.validate(text, field_name)
}
