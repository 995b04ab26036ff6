//! Passage generation in the voice of the contemplative tradition
//! (Desert Fathers, Benedictine and Carthusian monks, mystic saints).

use crate::groq::GroqClient;

const SYSTEM_PROMPT: &str = "\
Tu és um escritor que compõe textos no espírito da tradição contemplativa cristã:
Padres do Deserto, monges beneditinos e cartuxos, e santos místicos (São João da Cruz, Santa Teresa, etc.).
Escreves em português, com linguagem sóbria e profunda, como aforismos ou breves meditações.
Cada texto deve ser autocontido, entre 2 e 5 parágrafos curtos, sem título no início.
Não inventes citações literais; inspira-te no estilo e nos temas (silêncio, humildade, oração, deserto interior, abandono).";

const TEMPERATURE: f32 = 0.8;
// Generous ceiling for 2-5 short Portuguese paragraphs.
const MAX_TOKENS: u32 = 1024;

pub struct PassageGenerator {
    groq: GroqClient,
}

impl PassageGenerator {
    pub fn new(groq: GroqClient) -> Self {
        Self { groq }
    }

    /// Generate a passage about the spiritual life, optionally steered by
    /// a seed theme.
    pub async fn generate(&self, seed_theme: Option<&str>) -> Result<String, String> {
        let mut user =
            String::from("Gera um novo trecho de meditação ou aforismo sobre a vida espiritual.");
        if let Some(theme) = seed_theme {
            user.push_str(&format!(" Tema ou fio condutor: {theme}"));
        }

        self.groq.chat(SYSTEM_PROMPT, &user, TEMPERATURE, MAX_TOKENS).await
    }
}
