//! Azure Speech (Microsoft Cognitive Services) text-to-speech hook.
//!
//! Sends SSML to the regional synthesis endpoint and writes the returned
//! WAV bytes next to the passage library. Without credentials the hook
//! degrades to a console echo instead of failing; synthesis errors are
//! printed and swallowed, since narration is a courtesy, never a requirement.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::Client;
use serde::Serialize;
use tracing::debug;

use crate::config::{SpeechConfig, StorageConfig};
use crate::storage::{filename_stamp, sanitize_title, AUDIO_TITLE_MAX};

/// Slightly slower delivery suits the meditative register.
const SPEECH_RATE: &str = "-15%";
const OUTPUT_FORMAT: &str = "riff-24khz-16bit-mono-pcm";

/// Temporary authorization token for browser clients; the subscription key
/// itself never leaves the server.
#[derive(Debug, Serialize)]
pub struct SpeechToken {
    pub token: String,
    pub region: String,
}

pub struct SpeechSynthesizer {
    config: SpeechConfig,
    storage: StorageConfig,
    client: Client,
}

impl SpeechSynthesizer {
    pub fn new(config: SpeechConfig, storage: StorageConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            config,
            storage,
            client,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.config.is_configured()
    }

    /// Synthesize `text` into a timestamped WAV file.
    ///
    /// Returns the output path on success, `None` in degraded mode or on
    /// any synthesis failure (which is printed, not raised).
    pub async fn synthesize(&self, text: &str, title: &str) -> Option<PathBuf> {
        if text.trim().is_empty() {
            return None;
        }

        let (Some(key), Some(region)) = (&self.config.key, &self.config.region) else {
            self.echo_to_console(text, title);
            return None;
        };

        let audio_dir = self.storage.audio_dir();
        if let Err(e) = fs::create_dir_all(&audio_dir) {
            println!("[Azure Speech] Falha ao criar {}: {e}", audio_dir.display());
            return None;
        }

        let safe_title = sanitize_title(title, AUDIO_TITLE_MAX);
        let safe_title = if safe_title.is_empty() {
            "meditacao".to_string()
        } else {
            safe_title
        };
        let out_path = audio_dir.join(format!("{}_{safe_title}.wav", filename_stamp()));

        let ssml = format!(
            "<speak version='1.0' xml:lang='pt-BR'><voice name='{}'><prosody rate='{SPEECH_RATE}'>{}</prosody></voice></speak>",
            self.config.voice,
            escape_ssml(text),
        );

        let url = format!("https://{region}.tts.speech.microsoft.com/cognitiveservices/v1");
        debug!("Synthesizing {} chars with voice {}", text.len(), self.config.voice);

        let resp = match self
            .client
            .post(&url)
            .header("Ocp-Apim-Subscription-Key", key)
            .header("Content-Type", "application/ssml+xml")
            .header("X-Microsoft-OutputFormat", OUTPUT_FORMAT)
            .header("User-Agent", "super-livro")
            .body(ssml)
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(e) => {
                println!("[Azure Speech] Falha: erro de rede - {e}");
                return None;
            }
        };

        let status = resp.status();
        if !status.is_success() {
            let detail = resp.text().await.unwrap_or_default();
            println!("[Azure Speech] Falha: {status} - {detail}");
            return None;
        }

        let audio = match resp.bytes().await {
            Ok(bytes) => bytes,
            Err(e) => {
                println!("[Azure Speech] Falha ao receber áudio: {e}");
                return None;
            }
        };

        if let Err(e) = fs::write(&out_path, &audio) {
            println!("[Azure Speech] Falha ao salvar {}: {e}", out_path.display());
            return None;
        }

        println!("\n[Azure Speech] Áudio salvo: {}", out_path.display());
        play_audio_if_macos(&out_path);
        Some(out_path)
    }

    /// Degraded mode: no credentials, so the text goes to the console.
    fn echo_to_console(&self, text: &str, title: &str) {
        let rule = "=".repeat(60);
        println!("\n{rule}");
        println!("[Azure Speech] Título: {title}");
        println!("(Configure AZURE_SPEECH_KEY e AZURE_SPEECH_REGION para ativar o TTS.)");
        println!("{rule}");
        println!("{text}");
        println!("{rule}\n");
    }

    /// Issue a temporary authorization token for the Speech SDK.
    pub async fn issue_token(&self) -> Result<SpeechToken, String> {
        let (Some(key), Some(region)) = (&self.config.key, &self.config.region) else {
            return Err(
                "Azure Speech não configurado (AZURE_SPEECH_KEY / AZURE_SPEECH_REGION).".to_string(),
            );
        };

        let url = format!("https://{region}.api.cognitive.microsoft.com/sts/v1.0/issueToken");
        let resp = self
            .client
            .post(&url)
            .header("Ocp-Apim-Subscription-Key", key)
            .header("Content-Length", "0")
            .send()
            .await
            .map_err(|e| format!("falha ao obter token Azure: {e}"))?;

        let status = resp.status();
        if !status.is_success() {
            let detail = resp.text().await.unwrap_or_default();
            let msg = match status.as_u16() {
                401 => "Chave Azure inválida. Confira AZURE_SPEECH_KEY (Chave 1 do recurso Speech)."
                    .to_string(),
                404 => "Região inválida. Confira AZURE_SPEECH_REGION (ex.: brazilsouth).".to_string(),
                _ => format!("Falha ao obter token Azure ({status}). {detail}"),
            };
            return Err(msg);
        }

        let token = resp
            .text()
            .await
            .map_err(|e| format!("falha ao ler token Azure: {e}"))?;

        Ok(SpeechToken {
            token,
            region: region.clone(),
        })
    }
}

fn escape_ssml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// Courtesy playback on macOS only; a missing player is not an error.
#[cfg(target_os = "macos")]
fn play_audio_if_macos(path: &Path) {
    if let Err(e) = std::process::Command::new("afplay").arg(path).status() {
        tracing::warn!("afplay unavailable: {e}");
    }
}

#[cfg(not(target_os = "macos"))]
fn play_audio_if_macos(_path: &Path) {}
