//! Agent client adapters and roster construction
//!
//! - [`scripted`]: deterministic offline client (`scripted:<model>`)
//! - [`openai_compat`]: chat completions over HTTP (feature `http`)
//! - [`roster`]: turns `[[agents]]` entries into session agents

#[cfg(feature = "http")]
pub mod openai_compat;
pub mod roster;
pub mod scripted;

/// Provider families an agent can be backed by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Scripted,
    OpenAi,
    OpenRouter,
    Ollama,
    /// Any other OpenAI-compatible endpoint (requires `endpoint`)
    Compatible,
}

impl ProviderKind {
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "scripted" => ProviderKind::Scripted,
            "openai" => ProviderKind::OpenAi,
            "openrouter" => ProviderKind::OpenRouter,
            "ollama" => ProviderKind::Ollama,
            _ => ProviderKind::Compatible,
        }
    }

    /// Well-known endpoint of the provider
    pub fn default_endpoint(&self) -> Option<&'static str> {
        match self {
            ProviderKind::OpenAi => Some("https://api.openai.com/v1"),
            ProviderKind::OpenRouter => Some("https://openrouter.ai/api/v1"),
            ProviderKind::Ollama => Some("http://localhost:11434/v1"),
            ProviderKind::Scripted | ProviderKind::Compatible => None,
        }
    }

    /// Environment variable consulted for the API key unless configured
    pub fn default_api_key_env(&self) -> Option<&'static str> {
        match self {
            ProviderKind::OpenAi => Some("OPENAI_API_KEY"),
            ProviderKind::OpenRouter => Some("OPENROUTER_API_KEY"),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_kind_from_name() {
        assert_eq!(ProviderKind::from_name("Scripted"), ProviderKind::Scripted);
        assert_eq!(ProviderKind::from_name("openai"), ProviderKind::OpenAi);
        assert_eq!(ProviderKind::from_name("vllm"), ProviderKind::Compatible);
        assert!(ProviderKind::Compatible.default_endpoint().is_none());
        assert_eq!(
            ProviderKind::OpenRouter.default_api_key_env(),
            Some("OPENROUTER_API_KEY")
        );
    }
}
