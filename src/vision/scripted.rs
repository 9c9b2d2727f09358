//! Replay engine
//!
//! Returns pre-recorded engine responses in call order. Drives the CLI when no
//! native recognizer is linked, and the pipeline tests.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::info;

use crate::capture::CapturedFrame;
use crate::vision::{EngineError, RawEngineResult, RecognitionConfig, RecognitionEngine};

/// One recorded engine response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScriptedResponse {
    Result(RawEngineResult),
    Failure(EngineError),
}

/// Engine that replays a fixed script, then reports empty results
#[derive(Debug, Default)]
pub struct ScriptedEngine {
    responses: Vec<ScriptedResponse>,
    calls: AtomicUsize,
}

impl ScriptedEngine {
    pub fn new(responses: Vec<ScriptedResponse>) -> Self {
        Self {
            responses,
            calls: AtomicUsize::new(0),
        }
    }

    /// Load a JSON array of responses
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read engine script {:?}", path))?;
        let responses: Vec<ScriptedResponse> = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse engine script {:?}", path))?;
        info!("Loaded {} scripted engine responses", responses.len());
        Ok(Self::new(responses))
    }

    /// Number of times the engine has been called
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.responses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.responses.is_empty()
    }
}

impl RecognitionEngine for ScriptedEngine {
    fn recognize(
        &self,
        _frame: &CapturedFrame,
        _config: &RecognitionConfig,
    ) -> Result<RawEngineResult, EngineError> {
        let index = self.calls.fetch_add(1, Ordering::SeqCst);
        match self.responses.get(index) {
            Some(ScriptedResponse::Result(result)) => Ok(result.clone()),
            Some(ScriptedResponse::Failure(err)) => Err(err.clone()),
            None => Ok(RawEngineResult::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::ScanRegion;
    use crate::vision::CustomModelConfig;
    use std::io::Write;
    use std::time::Instant;
    use tempfile::NamedTempFile;

    fn config() -> RecognitionConfig {
        RecognitionConfig {
            license: String::new(),
            template: String::new(),
            template_name: "locr".to_string(),
            custom_model: CustomModelConfig {
                folder: "MRZ".to_string(),
                file_names: vec![],
            },
            scan_region: ScanRegion::default(),
            include_image_base64: false,
        }
    }

    #[test]
    fn test_replays_in_order_then_empty() {
        let engine = ScriptedEngine::new(vec![
            ScriptedResponse::Failure(EngineError::Unavailable("warming up".to_string())),
            ScriptedResponse::Result(RawEngineResult {
                groups: vec![],
                image_base64: Some("AAAA".to_string()),
            }),
        ]);
        let frame = CapturedFrame::blank(2, 2, Instant::now());

        assert!(engine.recognize(&frame, &config()).is_err());
        assert_eq!(
            engine.recognize(&frame, &config()).unwrap().image_base64.as_deref(),
            Some("AAAA")
        );
        assert_eq!(engine.recognize(&frame, &config()).unwrap(), RawEngineResult::default());
        assert_eq!(engine.call_count(), 3);
    }

    #[test]
    fn test_load_script_from_json() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[
                {{"failure": {{"license_rejected": "expired"}}}},
                {{"failure": {{"unreadable_frame": {{"width": 0, "height": 0}}}}}},
                {{"result": {{"groups": [{{"lines": [{{"text": "P<UTO"}}]}}]}}}}
            ]"#
        )
        .unwrap();

        let engine = ScriptedEngine::from_file(file.path()).unwrap();
        assert_eq!(engine.len(), 3);

        let frame = CapturedFrame::blank(2, 2, Instant::now());
        assert_eq!(
            engine.recognize(&frame, &config()),
            Err(EngineError::LicenseRejected("expired".to_string()))
        );
        assert_eq!(
            engine.recognize(&frame, &config()),
            Err(EngineError::UnreadableFrame { width: 0, height: 0 })
        );
        let result = engine.recognize(&frame, &config()).unwrap();
        assert_eq!(result.groups[0].lines[0].text, "P<UTO");
        assert!(result.groups[0].lines[0].characters.is_empty());
    }

    #[test]
    fn test_load_script_invalid_json() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "not json").unwrap();
        assert!(ScriptedEngine::from_file(file.path()).is_err());
    }
}
