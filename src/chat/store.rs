use crate::chat::{ConversationSummary, HistoryFile, HISTORY_LIMIT, SCHEMA_VERSION};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

fn home_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("USERPROFILE").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("."))
}

fn data_dir() -> PathBuf {
    home_dir().join(".faqboard")
}

fn history_path() -> PathBuf {
    data_dir().join("history.json")
}

fn read_history_file(path: &Path) -> Result<HistoryFile, String> {
    let data = fs::read(path).map_err(|err| format!("failed to read {}: {err}", path.display()))?;
    let history: HistoryFile = serde_json::from_slice(&data)
        .map_err(|err| format!("failed to parse {}: {err}", path.display()))?;

    if history.schema_version != SCHEMA_VERSION {
        return Err(format!(
            "unknown schema_version in {}: {}",
            path.display(),
            history.schema_version
        ));
    }
    Ok(history)
}

fn write_history_file(path: &Path, history: &HistoryFile) -> io::Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }

    let tmp_path = path.with_extension("json.tmp");
    let bytes = serde_json::to_vec_pretty(history)
        .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err.to_string()))?;

    fs::write(&tmp_path, bytes)?;
    match fs::rename(&tmp_path, path) {
        Ok(()) => Ok(()),
        Err(rename_err) => {
            if path.exists() {
                fs::remove_file(path)?;
                fs::rename(&tmp_path, path)?;
                Ok(())
            } else {
                Err(rename_err)
            }
        }
    }
}

/// Moves (or inserts) the conversation to the front and enforces the cap.
pub fn upsert(conversations: &mut Vec<ConversationSummary>, conversation: ConversationSummary) {
    conversations.retain(|existing| existing.id != conversation.id);
    conversations.insert(0, conversation);
    conversations.truncate(HISTORY_LIMIT);
}

/// Loads the persisted conversation list, most recent first. A missing file
/// is an empty history; an unreadable one yields a warning and starts fresh.
pub fn load() -> (Vec<ConversationSummary>, Option<String>) {
    let path = history_path();
    if !path.exists() {
        return (Vec::new(), None);
    }

    match read_history_file(&path) {
        Ok(mut history) => {
            history.conversations.truncate(HISTORY_LIMIT);
            (history.conversations, None)
        }
        Err(warning) => (Vec::new(), Some(warning)),
    }
}

pub fn persist(conversations: &[ConversationSummary]) -> io::Result<()> {
    let history = HistoryFile {
        schema_version: SCHEMA_VERSION,
        conversations: conversations.to_vec(),
    };
    write_history_file(&history_path(), &history)
}
