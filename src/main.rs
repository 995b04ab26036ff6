//! super-livro: gera, guarda e "lê" trechos de espiritualidade com IA.

mod api;
mod config;
mod generator;
mod groq;
mod reflector;
mod speech;
mod storage;

use std::sync::Arc;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use config::Config;
use generator::PassageGenerator;
use groq::GroqClient;
use reflector::Reflector;
use speech::SpeechSynthesizer;

const DEFAULT_TITLE: &str = "Trecho espiritual";
const TITLE_MAX_CHARS: usize = 50;

#[derive(Parser, Debug)]
#[command(name = "super-livro", about = "Super Livro — gerar e ler conteúdo espiritual com IA")]
struct Args {
    /// Apenas gerar e salvar um trecho
    #[arg(long)]
    only_generate: bool,

    /// Apenas "ler" (refletir sobre) o último trecho
    #[arg(long)]
    only_read: bool,

    /// Tema opcional para a geração
    #[arg(long)]
    theme: Option<String>,

    /// Listar os trechos mais recentes e sair
    #[arg(long)]
    list: bool,

    /// Servir a API HTTP (geração, reflexão, token de voz)
    #[arg(long)]
    serve: bool,

    /// Porta da API HTTP
    #[arg(long, default_value_t = 8787)]
    port: u16,

    /// Ativar logs detalhados (debug)
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let filter = if args.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = Config::from_env();

    if args.list {
        for path in storage::list_recent_passages(&config.storage, storage::DEFAULT_LIST_LIMIT) {
            println!("{}", path.display());
        }
        return Ok(());
    }

    // Fail fast, before any generation is attempted.
    if config.groq.api_key.is_none() {
        eprintln!("Erro: GROQ_API_KEY não definida. Exporte a variável de ambiente e tente de novo.");
        std::process::exit(1);
    }

    config.storage.ensure_passages_dir()?;

    let groq = GroqClient::new(&config.groq)?;
    let generator = PassageGenerator::new(groq.clone());
    let reflector = Reflector::new(groq);
    let synthesizer = SpeechSynthesizer::new(config.speech.clone(), config.storage.clone());

    if args.serve {
        let state = api::ApiState {
            generator: Arc::new(generator),
            reflector: Arc::new(reflector),
            speech: Arc::new(synthesizer),
        };
        api::serve(state, args.port).await?;
        return Ok(());
    }

    if args.only_read {
        let Some(latest) = storage::load_latest_passage(&config.storage)? else {
            eprintln!(
                "Nenhum trecho encontrado em {}. Gere antes com: super-livro --only-generate",
                config.storage.passages_dir.display()
            );
            std::process::exit(1);
        };
        info!(
            "Reading \"{}\" from {} ({} chars)",
            latest.title,
            latest.path.display(),
            latest.full_text.len()
        );

        println!("--- Último trecho ---\n");
        println!("{}", latest.body);
        println!("\n--- Reflexão (IA) ---\n");
        let reflection = reflector.reflect(&latest.body).await?;
        println!("{reflection}");
        return Ok(());
    }

    println!("Gerando trecho...");
    let content = generator.generate(args.theme.as_deref()).await?;
    let (title, content) = derive_title(&content);

    if args.only_generate {
        let path = storage::save_passage(&config.storage, &title, &content, None)?;
        println!("Salvo em: {}\n", path.display());
        println!("{content}");
        return Ok(());
    }

    println!("Lendo / refletindo...");
    let reflection = reflector.reflect(&content).await?;
    let path = storage::save_passage(&config.storage, &title, &content, Some(&reflection))?;
    println!("Salvo em: {}\n", path.display());
    println!("--- Trecho ---\n");
    println!("{content}");
    println!("\n--- Reflexão (IA) ---\n");
    println!("{reflection}");

    // Narration gets the whole of what was written, body and reflection.
    synthesizer
        .synthesize(&format!("{content}\n\n{reflection}"), &title)
        .await;

    Ok(())
}

/// Split generated prose into a title and a body.
///
/// A leading `#` heading becomes the title (markers stripped) with the rest
/// as body; otherwise the first line, capped at 50 chars with an ellipsis
/// when truncated, titles the unchanged text.
fn derive_title(raw: &str) -> (String, String) {
    let text = raw.trim();

    if text.starts_with('#') {
        let (first_line, rest) = match text.split_once('\n') {
            Some((first, rest)) => (first, rest),
            None => (text, ""),
        };
        let title = first_line.trim_start_matches(['#', ' ']).trim();
        let title = if title.is_empty() { DEFAULT_TITLE } else { title };
        return (title.to_string(), rest.trim().to_string());
    }

    let first_line = text.lines().next().unwrap_or("");
    let truncated: String = first_line.chars().take(TITLE_MAX_CHARS).collect();
    let title = if first_line.chars().count() > TITLE_MAX_CHARS {
        format!("{truncated}...")
    } else if truncated.is_empty() {
        DEFAULT_TITLE.to_string()
    } else {
        truncated
    };

    (title, text.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heading_line_becomes_title() {
        let (title, body) = derive_title("## A cela interior\n\nFica na tua cela.");
        assert_eq!(title, "A cela interior");
        assert_eq!(body, "Fica na tua cela.");
    }

    #[test]
    fn short_first_line_is_the_title() {
        let (title, body) = derive_title("O deserto ensina.\n\nSegundo parágrafo.");
        assert_eq!(title, "O deserto ensina.");
        assert_eq!(body, "O deserto ensina.\n\nSegundo parágrafo.");
    }

    #[test]
    fn long_first_line_is_truncated_with_ellipsis() {
        let first = "a".repeat(80);
        let (title, _body) = derive_title(&format!("{first}\nresto"));
        assert_eq!(title.chars().count(), TITLE_MAX_CHARS + 3);
        assert!(title.ends_with("..."));
    }

    #[test]
    fn exactly_bounded_line_keeps_no_ellipsis() {
        let first = "b".repeat(TITLE_MAX_CHARS);
        let (title, _body) = derive_title(&first);
        assert_eq!(title, first);
    }

    #[test]
    fn empty_generation_falls_back_to_default_title() {
        let (title, body) = derive_title("   ");
        assert_eq!(title, DEFAULT_TITLE);
        assert_eq!(body, "");
    }

    #[test]
    fn bare_heading_marker_falls_back_to_default_title() {
        let (title, body) = derive_title("#\nCorpo do texto.");
        assert_eq!(title, DEFAULT_TITLE);
        assert_eq!(body, "Corpo do texto.");
    }
}
