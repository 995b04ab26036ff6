//! AI reader: a short reflection or meditation question on a passage.

use crate::groq::GroqClient;

const SYSTEM_PROMPT: &str = "\
Tu és um leitor contemplativo. Recebes um trecho sobre vida espiritual (Padres do Deserto, monges, místicos)
e respondes com uma breve reflexão ou uma pergunta de meditação, em português.
Sê conciso: um parágrafo ou duas frases que ajudem a interiorizar o texto, sem repetir o que já foi dito.";

const TEMPERATURE: f32 = 0.5;
const MAX_TOKENS: u32 = 350;

pub struct Reflector {
    groq: GroqClient,
}

impl Reflector {
    pub fn new(groq: GroqClient) -> Self {
        Self { groq }
    }

    /// Reflect on a passage body. The title is never part of the input.
    pub async fn reflect(&self, content: &str) -> Result<String, String> {
        let user = format!("Trecho para refletir:\n\n{content}");
        self.groq.chat(SYSTEM_PROMPT, &user, TEMPERATURE, MAX_TOKENS).await
    }
}
