//! API key loading.

use std::{fs, path::Path};

use log::{info, warn};

/// Reads the suggestion service API key from `path`.
///
/// The key is trimmed. No path, an unreadable file and an empty file all
/// yield `None`; suggestions are then disabled rather than failing the run.
pub fn load_api_key(path: Option<impl AsRef<Path>>) -> Option<String> {
    let Some(path) = path else {
        info!("No API key file given, voicing suggestions are disabled");
        return None;
    };
    let path = path.as_ref();

    let key = match fs::read_to_string(path) {
        Ok(text) => text.trim().to_string(),
        Err(err) => {
            warn!(path = path.display().to_string(), err:err; "Failed to read API key file");
            return None;
        }
    };

    if key.is_empty() {
        warn!(path = path.display().to_string(); "API key file is empty");
        return None;
    }
    Some(key)
}
