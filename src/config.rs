//! Configuration for super-livro.
//!
//! All settings come from environment variables with documented defaults.
//! The resulting struct is immutable and passed explicitly to every
//! component, so tests can substitute their own configuration.

use std::env;
use std::fs;
use std::path::PathBuf;

/// Groq chat-completion settings.
#[derive(Debug, Clone)]
pub struct GroqConfig {
    /// `GROQ_API_KEY`, mandatory for any generation.
    pub api_key: Option<String>,
    /// `GROQ_MODEL`.
    pub model: String,
    /// OpenAI-compatible base URL; any compliant backend works here.
    pub base_url: String,
}

impl Default for GroqConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "llama-3.3-70b-versatile".into(),
            base_url: "https://api.groq.com/openai/v1".into(),
        }
    }
}

impl GroqConfig {
    fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            api_key: env_nonempty("GROQ_API_KEY"),
            model: env_nonempty("GROQ_MODEL").unwrap_or(defaults.model),
            base_url: defaults.base_url,
        }
    }
}

/// Azure Speech (Microsoft Cognitive Services) settings.
///
/// Key and region are optional: without them the synthesis hook runs in
/// degraded console-echo mode instead of failing.
#[derive(Debug, Clone)]
pub struct SpeechConfig {
    /// `AZURE_SPEECH_KEY`.
    pub key: Option<String>,
    /// `AZURE_SPEECH_REGION`, e.g. `brazilsouth`.
    pub region: Option<String>,
    /// `AZURE_SPEECH_VOICE`.
    pub voice: String,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            key: None,
            region: None,
            voice: "pt-BR-FranciscaNeural".into(),
        }
    }
}

impl SpeechConfig {
    fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            key: env_nonempty("AZURE_SPEECH_KEY"),
            region: env_nonempty("AZURE_SPEECH_REGION"),
            voice: env_nonempty("AZURE_SPEECH_VOICE").unwrap_or(defaults.voice),
        }
    }

    /// Both credentials present, so synthesis can reach the cloud endpoint.
    pub fn is_configured(&self) -> bool {
        self.key.is_some() && self.region.is_some()
    }
}

/// Where passage documents and audio artifacts live on disk.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// `SUPER_LIVRO_DIR`, the passage library root.
    pub passages_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        Self {
            passages_dir: home.join(".super-livro").join("livro"),
        }
    }
}

impl StorageConfig {
    fn from_env() -> Self {
        match env_nonempty("SUPER_LIVRO_DIR") {
            Some(dir) => Self {
                passages_dir: PathBuf::from(dir),
            },
            None => Self::default(),
        }
    }

    /// Audio artifacts go in a subdirectory of the passage library.
    pub fn audio_dir(&self) -> PathBuf {
        self.passages_dir.join("audio")
    }

    /// Idempotent; creates intermediate directories as needed.
    pub fn ensure_passages_dir(&self) -> std::io::Result<()> {
        fs::create_dir_all(&self.passages_dir)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub groq: GroqConfig,
    pub speech: SpeechConfig,
    pub storage: StorageConfig,
}

impl Config {
    /// Build the process-wide configuration once, at entry.
    pub fn from_env() -> Self {
        Self {
            groq: GroqConfig::from_env(),
            speech: SpeechConfig::from_env(),
            storage: StorageConfig::from_env(),
        }
    }
}

/// Treat unset and empty environment variables the same way.
fn env_nonempty(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_passages_dir_is_idempotent() {
        let tmp = tempfile::tempdir().unwrap();
        let storage = StorageConfig {
            passages_dir: tmp.path().join("nested").join("livro"),
        };
        storage.ensure_passages_dir().unwrap();
        storage.ensure_passages_dir().unwrap();
        assert!(storage.passages_dir.is_dir());
    }

    #[test]
    fn audio_dir_is_a_subdirectory() {
        let storage = StorageConfig {
            passages_dir: PathBuf::from("/tmp/livro"),
        };
        assert_eq!(storage.audio_dir(), PathBuf::from("/tmp/livro/audio"));
    }

    #[test]
    fn speech_config_needs_both_credentials() {
        let mut speech = SpeechConfig::default();
        assert!(!speech.is_configured());
        speech.key = Some("k".into());
        assert!(!speech.is_configured());
        speech.region = Some("brazilsouth".into());
        assert!(speech.is_configured());
    }
}
