//! Provider identities, model allow-lists and bearer credentials

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const GROQ_MODELS: &[&str] = &[
    "mixtral-8x7b-32768",
    "llama3-8b-8192",
    "llama3-70b-8192",
    "gemma-7b-it",
];

const OPENAI_MODELS: &[&str] = &["gpt-4o", "gpt-4o-mini", "gpt-3.5-turbo"];

/// Remote completion provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProviderId {
    #[serde(rename = "Groq")]
    Groq,
    #[serde(rename = "OpenAI")]
    OpenAi,
}

impl ProviderId {
    pub const ALL: [ProviderId; 2] = [ProviderId::Groq, ProviderId::OpenAi];

    pub fn name(&self) -> &'static str {
        match self {
            ProviderId::Groq => "Groq",
            ProviderId::OpenAi => "OpenAI",
        }
    }

    /// Models this provider may be asked for
    pub fn models(&self) -> &'static [&'static str] {
        match self {
            ProviderId::Groq => GROQ_MODELS,
            ProviderId::OpenAi => OPENAI_MODELS,
        }
    }

    pub fn default_model(&self) -> &'static str {
        self.models()[0]
    }

    pub fn supports_model(&self, model: &str) -> bool {
        self.models().contains(&model)
    }

    /// Environment variable read for this provider's key at session start
    pub fn credential_env_var(&self) -> &'static str {
        match self {
            ProviderId::Groq => "GROQ_API_KEY",
            ProviderId::OpenAi => "OPENAI_API_KEY",
        }
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ProviderId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown provider: {}", s))
    }
}

/// Bearer tokens held in memory for one session
#[derive(Clone, Default)]
pub struct Credentials {
    groq: Option<String>,
    openai: Option<String>,
}

impl Credentials {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read both keys from their environment variables
    pub fn from_env() -> Self {
        let mut credentials = Self::new();
        for provider in ProviderId::ALL {
            credentials.set(provider, std::env::var(provider.credential_env_var()).ok());
        }
        credentials
    }

    /// Replace a key; blank input clears it
    pub fn set(&mut self, provider: ProviderId, token: Option<String>) {
        let token = token
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());
        *self.slot_mut(provider) = token;
    }

    pub fn get(&self, provider: ProviderId) -> Option<&str> {
        match provider {
            ProviderId::Groq => self.groq.as_deref(),
            ProviderId::OpenAi => self.openai.as_deref(),
        }
    }

    pub fn has(&self, provider: ProviderId) -> bool {
        self.get(provider).is_some()
    }

    fn slot_mut(&mut self, provider: ProviderId) -> &mut Option<String> {
        match provider {
            ProviderId::Groq => &mut self.groq,
            ProviderId::OpenAi => &mut self.openai,
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |t: &Option<String>| if t.is_some() { "<set>" } else { "<unset>" };
        f.debug_struct("Credentials")
            .field("groq", &redact(&self.groq))
            .field("openai", &redact(&self.openai))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_allow_lists() {
        assert!(ProviderId::Groq.supports_model("llama3-70b-8192"));
        assert!(!ProviderId::Groq.supports_model("gpt-4o"));
        assert!(ProviderId::OpenAi.supports_model("gpt-4o-mini"));
        assert_eq!(ProviderId::OpenAi.default_model(), "gpt-4o");
    }

    #[test]
    fn test_provider_parse() {
        assert_eq!("groq".parse::<ProviderId>(), Ok(ProviderId::Groq));
        assert_eq!("OpenAI".parse::<ProviderId>(), Ok(ProviderId::OpenAi));
        assert!("anthropic".parse::<ProviderId>().is_err());
    }

    #[test]
    fn test_blank_token_clears() {
        let mut creds = Credentials::new();
        creds.set(ProviderId::Groq, Some("  gsk_abc  ".to_string()));
        assert_eq!(creds.get(ProviderId::Groq), Some("gsk_abc"));

        creds.set(ProviderId::Groq, Some("   ".to_string()));
        assert!(!creds.has(ProviderId::Groq));
    }

    #[test]
    fn test_debug_redacts_tokens() {
        let mut creds = Credentials::new();
        creds.set(ProviderId::OpenAi, Some("sk-secret".to_string()));
        let debug = format!("{:?}", creds);
        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("<set>"));
    }

    #[test]
    #[serial]
    fn test_from_env() {
        unsafe {
            std::env::set_var("GROQ_API_KEY", "gsk_env");
            std::env::remove_var("OPENAI_API_KEY");
        }

        let creds = Credentials::from_env();

        unsafe { std::env::remove_var("GROQ_API_KEY") };

        assert_eq!(creds.get(ProviderId::Groq), Some("gsk_env"));
        assert!(!creds.has(ProviderId::OpenAi));
    }
}
