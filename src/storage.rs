//! Passage document store: one Markdown file per passage.
//!
//! Filenames are `<timestamp>_<sanitized-title>.md`, so lexical sort order
//! equals chronological order. Documents are written once and never mutated
//! or deleted by the program.

use std::fs;
use std::path::PathBuf;
use std::time::SystemTime;

use chrono::Local;
use tracing::debug;

use crate::config::StorageConfig;

/// Title fragment bound for passage filenames.
const PASSAGE_TITLE_MAX: usize = 60;
/// Title fragment bound for audio filenames.
pub const AUDIO_TITLE_MAX: usize = 50;

pub const DEFAULT_LIST_LIMIT: usize = 20;

/// Boundary between the passage body and the appended reflection section.
/// The full tagged marker (rule plus heading) keeps the split unambiguous:
/// a body would have to contain this exact sequence to collide.
const REFLECTION_MARKER: &str = "\n\n---\n\n## Reflexão (IA)\n\n";

/// The most recent stored passage, parsed back from disk.
#[derive(Debug)]
pub struct StoredPassage {
    pub title: String,
    /// Body without the title line and without any reflection section,
    /// ready to be fed back to the reflector.
    pub body: String,
    pub full_text: String,
    pub path: PathBuf,
}

/// Reduce a title to a bounded alphanumeric-plus-separator fragment.
/// Idempotent: sanitizing an already-sanitized title is a no-op.
pub fn sanitize_title(title: &str, max_len: usize) -> String {
    title
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == ' ' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .take(max_len)
        .collect::<String>()
        .trim()
        .to_string()
}

/// Second-precision local timestamp used in filenames.
pub fn filename_stamp() -> String {
    Local::now().format("%Y%m%d_%H%M%S").to_string()
}

fn compose_document(title: &str, body: &str, reflection: Option<&str>) -> String {
    let mut document = format!("# {title}\n\n{body}");
    if let Some(reflection) = reflection {
        document.push_str(REFLECTION_MARKER);
        document.push_str(reflection);
    }
    document
}

/// Save a passage (and optional reflection) as a new Markdown document.
/// Returns the path of the written file.
pub fn save_passage(
    storage: &StorageConfig,
    title: &str,
    body: &str,
    reflection: Option<&str>,
) -> Result<PathBuf, String> {
    storage
        .ensure_passages_dir()
        .map_err(|e| format!("falha ao criar {}: {e}", storage.passages_dir.display()))?;

    let safe_title = sanitize_title(title, PASSAGE_TITLE_MAX);
    let safe_title = if safe_title.is_empty() {
        "trecho".to_string()
    } else {
        safe_title
    };

    let name = format!("{}_{safe_title}.md", filename_stamp());
    let path = storage.passages_dir.join(name);

    let document = compose_document(title, body, reflection);
    fs::write(&path, document).map_err(|e| format!("falha ao salvar {}: {e}", path.display()))?;

    debug!("Saved passage to {}", path.display());
    Ok(path)
}

/// All passage documents, most recently modified first.
fn passages_by_recency(storage: &StorageConfig) -> Vec<PathBuf> {
    let Ok(entries) = fs::read_dir(&storage.passages_dir) else {
        return Vec::new();
    };

    let mut files: Vec<(SystemTime, PathBuf)> = entries
        .flatten()
        .filter_map(|entry| {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "md") {
                let modified = entry.metadata().ok()?.modified().ok()?;
                Some((modified, path))
            } else {
                None
            }
        })
        .collect();

    files.sort_by(|a, b| b.0.cmp(&a.0));
    files.into_iter().map(|(_, path)| path).collect()
}

/// Load the most recent passage, or `None` when the library is empty.
pub fn load_latest_passage(storage: &StorageConfig) -> Result<Option<StoredPassage>, String> {
    let Some(path) = passages_by_recency(storage).into_iter().next() else {
        return Ok(None);
    };

    let full_text =
        fs::read_to_string(&path).map_err(|e| format!("falha ao ler {}: {e}", path.display()))?;

    let lines: Vec<&str> = full_text.split('\n').collect();
    let title = lines
        .first()
        .map(|line| line.trim_start_matches(['#', ' ']).trim())
        .filter(|t| !t.is_empty())
        .unwrap_or("Sem título")
        .to_string();

    // Everything from line index 2 onward, truncated at the reflection
    // boundary, is the reusable body.
    let body = if lines.len() > 2 {
        lines[2..].join("\n")
    } else {
        String::new()
    };
    let body = body
        .split(REFLECTION_MARKER)
        .next()
        .unwrap_or("")
        .trim()
        .to_string();

    Ok(Some(StoredPassage {
        title,
        body,
        full_text,
        path,
    }))
}

/// The `limit` most recent passage files, newest first.
pub fn list_recent_passages(storage: &StorageConfig, limit: usize) -> Vec<PathBuf> {
    let mut files = passages_by_recency(storage);
    files.truncate(limit);
    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn temp_storage() -> (tempfile::TempDir, StorageConfig) {
        let tmp = tempfile::tempdir().unwrap();
        let storage = StorageConfig {
            passages_dir: tmp.path().join("livro"),
        };
        (tmp, storage)
    }

    fn set_mtime(path: &PathBuf, secs: u64) {
        let file = fs::OpenOptions::new().append(true).open(path).unwrap();
        file.set_modified(SystemTime::UNIX_EPOCH + Duration::from_secs(secs))
            .unwrap();
    }

    #[test]
    fn sanitize_is_idempotent_and_bounded() {
        let raw = "Trecho: a cela & o silêncio! (III)";
        let once = sanitize_title(raw, PASSAGE_TITLE_MAX);
        let twice = sanitize_title(&once, PASSAGE_TITLE_MAX);
        assert_eq!(once, twice);
        assert_eq!(once, "Trecho_ a cela _ o silêncio_ _III_");

        let long = "x".repeat(200);
        assert_eq!(sanitize_title(&long, PASSAGE_TITLE_MAX).chars().count(), 60);
        assert_eq!(sanitize_title(&long, AUDIO_TITLE_MAX).chars().count(), 50);
    }

    #[test]
    fn document_without_reflection_has_no_marker() {
        let doc = compose_document("Trecho espiritual", "Linha um.\n\nLinha dois.", None);
        let lines: Vec<&str> = doc.split('\n').collect();
        assert_eq!(lines[0], "# Trecho espiritual");
        assert_eq!(lines[1], "");
        assert_eq!(lines[2..].join("\n"), "Linha um.\n\nLinha dois.");
        assert!(!doc.contains(REFLECTION_MARKER));
    }

    #[test]
    fn document_with_reflection_appends_tagged_section() {
        let doc = compose_document(
            "Trecho espiritual",
            "Linha um.\n\nLinha dois.",
            Some("Pense nisso."),
        );
        assert!(doc.ends_with("\n\n---\n\n## Reflexão (IA)\n\nPense nisso."));
    }

    #[test]
    fn save_then_load_latest_round_trips() {
        let (_tmp, storage) = temp_storage();
        let path = save_passage(&storage, "Trecho espiritual", "Linha um.\n\nLinha dois.", None)
            .unwrap();
        assert!(path.file_name().unwrap().to_string_lossy().ends_with("_Trecho espiritual.md"));

        let latest = load_latest_passage(&storage).unwrap().unwrap();
        assert_eq!(latest.title, "Trecho espiritual");
        assert_eq!(latest.body, "Linha um.\n\nLinha dois.");
        assert_eq!(latest.path, path);
    }

    #[test]
    fn load_latest_strips_reflection_from_body() {
        let (_tmp, storage) = temp_storage();
        save_passage(
            &storage,
            "Trecho espiritual",
            "Linha um.\n\nLinha dois.",
            Some("Pense nisso."),
        )
        .unwrap();

        let latest = load_latest_passage(&storage).unwrap().unwrap();
        assert_eq!(latest.body, "Linha um.\n\nLinha dois.");
        assert!(latest.full_text.contains("Pense nisso."));
    }

    #[test]
    fn load_latest_on_empty_library_is_none() {
        let (_tmp, storage) = temp_storage();
        assert!(load_latest_passage(&storage).unwrap().is_none());

        storage.ensure_passages_dir().unwrap();
        assert!(load_latest_passage(&storage).unwrap().is_none());
    }

    #[test]
    fn blank_title_falls_back_to_fixed_slug() {
        let (_tmp, storage) = temp_storage();
        let path = save_passage(&storage, "   ", "corpo", None).unwrap();
        assert!(path.file_name().unwrap().to_string_lossy().ends_with("_trecho.md"));
    }

    #[test]
    fn list_recent_caps_at_limit_and_is_prefix_consistent() {
        let (_tmp, storage) = temp_storage();
        let a = save_passage(&storage, "a", "corpo", None).unwrap();
        let b = save_passage(&storage, "b", "corpo", None).unwrap();
        let c = save_passage(&storage, "c", "corpo", None).unwrap();
        set_mtime(&a, 100);
        set_mtime(&b, 200);
        set_mtime(&c, 300);

        let top_two = list_recent_passages(&storage, 2);
        assert_eq!(top_two, vec![c.clone(), b.clone()]);

        let all = list_recent_passages(&storage, DEFAULT_LIST_LIMIT);
        assert_eq!(all, vec![c, b, a]);
        assert_eq!(&all[..2], &top_two[..]);
    }
}
