//! Compiled title transforms.

use regex_lite::Regex;

use super::rules::RegexRule;

/// A compiled [`RegexRule`]. Every match is replaced; captures use `$1` / `${name}`.
#[derive(Debug, Clone)]
pub struct TitleRewrite {
    pattern: Regex,
    replacement: String,
}

impl TitleRewrite {
    pub fn compile(rule: &RegexRule) -> Result<Self, regex_lite::Error> {
        Ok(Self {
            pattern: Regex::new(&rule.pattern)?,
            replacement: rule.replace.clone(),
        })
    }

    pub fn apply(&self, title: &str) -> String {
        self.pattern
            .replace_all(title, self.replacement.as_str())
            .into_owned()
    }
}
