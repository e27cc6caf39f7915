//! Command parser - turns message text into command invocations

use crate::domain::entities::Invocation;

/// Recognises `<prefix><name>[@bot] [args...]`
#[derive(Debug, Clone)]
pub struct CommandParser {
    prefixes: Vec<String>,
    bot_username: Option<String>,
}

impl CommandParser {
    pub fn new(prefixes: Vec<String>) -> Self {
        let prefixes = prefixes.into_iter().filter(|p| !p.is_empty()).collect();
        Self {
            prefixes,
            bot_username: None,
        }
    }

    /// Only accept `name@username` mentions addressed to this bot
    pub fn with_bot_username(mut self, username: impl Into<String>) -> Self {
        self.bot_username = Some(username.into());
        self
    }

    /// The prefix shown in help texts
    pub fn main_prefix(&self) -> &str {
        self.prefixes.first().map(String::as_str).unwrap_or("/")
    }

    /// Parse `text` as a command, or `None` when it is ordinary text
    pub fn parse(&self, text: &str) -> Option<Invocation> {
        let text = text.trim_start();
        let rest = self.prefixes.iter().find_map(|p| text.strip_prefix(p.as_str()))?;
        if rest.starts_with(char::is_whitespace) {
            return None;
        }

        let mut parts = rest.split_whitespace();
        let head = parts.next()?;
        let name = match head.split_once('@') {
            Some((name, target)) => {
                if let Some(username) = &self.bot_username {
                    if !target.eq_ignore_ascii_case(username) {
                        return None;
                    }
                }
                name
            }
            None => head,
        };
        if name.is_empty() {
            return None;
        }

        let args = parts.map(str::to_string).collect();
        Some(Invocation::new(name.to_lowercase(), args))
    }
}
