use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Serialize, Deserialize)]
struct ProfileFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    last_player: Option<String>,
}

/// Remembered participant details between runs.
///
/// Holds the last name entered at the door so the next run can offer it as
/// a default instead of demanding `--player` every time.
#[derive(Debug, Default, Clone)]
pub struct PlayerProfile {
    last_player: Option<String>,
    dirty: bool,
    backing_path: Option<PathBuf>,
}

impl PlayerProfile {
    pub fn from_json_file(path: Option<&Path>) -> Result<Self> {
        let mut profile = PlayerProfile {
            last_player: None,
            dirty: false,
            backing_path: path.map(|p| p.to_path_buf()),
        };
        if let Some(p) = path {
            if p.exists() {
                let raw = fs::read_to_string(p)
                    .with_context(|| format!("failed to read profile file: {}", p.display()))?;
                let file: ProfileFile = serde_json::from_str(&raw)
                    .with_context(|| format!("failed to parse profile json: {}", p.display()))?;
                profile.last_player = file.last_player;
            }
        }
        Ok(profile)
    }

    pub fn last_player(&self) -> Option<&str> {
        self.last_player.as_deref()
    }

    pub fn remember(&mut self, display_name: &str) {
        if self.last_player.as_deref() != Some(display_name) {
            self.last_player = Some(display_name.to_string());
            self.dirty = true;
        }
    }

    pub fn save(&mut self) -> Result<()> {
        let Some(path) = self.backing_path.as_ref() else {
            // No configured backing file; treat as successful no-op.
            self.dirty = false;
            return Ok(());
        };

        if !self.dirty {
            return Ok(());
        }

        if let Some(parent) = path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent).with_context(|| {
                    format!("failed to create profile directory: {}", parent.display())
                })?;
            }
        }

        let file = ProfileFile {
            last_player: self.last_player.clone(),
        };
        let serialized = serde_json::to_string_pretty(&file)
            .with_context(|| format!("failed to serialize profile to JSON: {}", path.display()))?;
        fs::write(path, serialized)
            .with_context(|| format!("failed to write profile file: {}", path.display()))?;
        self.dirty = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_roundtrip_remembers_the_player() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("nested").join("profile.json");

        let mut profile = PlayerProfile::from_json_file(Some(&path))?;
        assert_eq!(profile.last_player(), None);
        profile.remember("Alice");
        profile.save()?;

        let reloaded = PlayerProfile::from_json_file(Some(&path))?;
        assert_eq!(reloaded.last_player(), Some("Alice"));
        Ok(())
    }

    #[test]
    fn unchanged_profile_is_not_rewritten() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("profile.json");
        fs::write(&path, r#"{ "last_player": "Alice" }"#)?;

        let mut profile = PlayerProfile::from_json_file(Some(&path))?;
        profile.remember("Alice");
        fs::remove_file(&path)?;
        profile.save()?;
        assert!(!path.exists(), "clean profile must not touch the file");
        Ok(())
    }

    #[test]
    fn save_without_backing_path_is_a_noop() -> Result<()> {
        let mut profile = PlayerProfile::from_json_file(None)?;
        profile.remember("Alice");
        profile.save()?;
        assert_eq!(profile.last_player(), Some("Alice"));
        Ok(())
    }
}
