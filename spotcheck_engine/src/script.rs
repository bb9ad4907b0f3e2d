use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

/// One scripted input, mirroring what a player would do with the mouse
/// and the scene navigation buttons.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    Click { x: f32, y: f32 },
    Next,
    Prev,
    Reset,
    Finish,
}

/// Scripted stand-in for an interactive session, used by demos and tests.
#[derive(Debug, Clone, Deserialize)]
pub struct ClickScript {
    pub steps: Vec<Step>,
}

impl ClickScript {
    pub fn from_json_str(raw: &str) -> Result<Self> {
        let script: ClickScript =
            serde_json::from_str(raw).context("failed to parse click script")?;
        Ok(script)
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read script file: {}", path.display()))?;
        Self::from_json_str(&raw)
            .with_context(|| format!("failed to parse script file: {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
    {
      "steps": [
        { "op": "click", "x": 905, "y": 180 },
        { "op": "next" },
        { "op": "prev" },
        { "op": "reset" },
        { "op": "finish" }
      ]
    }
    "#;

    #[test]
    fn sample_script_parses() -> Result<()> {
        let script = ClickScript::from_json_str(SAMPLE)?;
        assert_eq!(script.steps.len(), 5);
        assert_eq!(script.steps[0], Step::Click { x: 905.0, y: 180.0 });
        assert_eq!(script.steps[4], Step::Finish);
        Ok(())
    }

    #[test]
    fn unknown_op_is_rejected() {
        let raw = r#"{ "steps": [ { "op": "teleport" } ] }"#;
        let err = ClickScript::from_json_str(raw).expect_err("teleport is not a step");
        assert!(format!("{err:#}").contains("click script"));
    }

    #[test]
    fn file_load_reports_the_path() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("walkthrough.json");
        fs::write(&path, "{ not json")?;
        let err = ClickScript::from_json_file(&path).expect_err("malformed file must fail");
        assert!(format!("{err:#}").contains("walkthrough.json"));
        Ok(())
    }
}
