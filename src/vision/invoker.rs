//! Adapter between admitted frames and the recognition engine

use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

use crate::capture::CapturedFrame;
use crate::vision::{EngineError, RawEngineResult, RecognitionConfig, RecognitionEngine};

/// Calls the engine once per admitted frame with the session configuration.
/// Holds no per-call state and never retries.
#[derive(Clone)]
pub struct RecognitionInvoker {
    engine: Arc<dyn RecognitionEngine>,
    config: Arc<RecognitionConfig>,
}

impl RecognitionInvoker {
    pub fn new(engine: Arc<dyn RecognitionEngine>, config: RecognitionConfig) -> Self {
        Self {
            engine,
            config: Arc::new(config),
        }
    }

    /// Run recognition on one frame
    pub fn invoke(&self, frame: &CapturedFrame) -> Result<RawEngineResult, EngineError> {
        let start = Instant::now();
        let result = self.engine.recognize(frame, &self.config);
        debug!(
            "Recognition on {}x{} frame finished in {:?} (ok: {})",
            frame.width,
            frame.height,
            start.elapsed(),
            result.is_ok()
        );
        result
    }

    pub fn config(&self) -> &RecognitionConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::ScanRegion;
    use crate::vision::{CustomModelConfig, LineResult, ResultGroup};
    use parking_lot::Mutex;

    struct RecordingEngine {
        seen: Mutex<Vec<(u32, u32, String)>>,
        fail: bool,
    }

    impl RecognitionEngine for RecordingEngine {
        fn recognize(
            &self,
            frame: &CapturedFrame,
            config: &RecognitionConfig,
        ) -> Result<RawEngineResult, EngineError> {
            self.seen
                .lock()
                .push((frame.width, frame.height, config.template_name.clone()));
            if self.fail {
                return Err(EngineError::LicenseRejected("expired".to_string()));
            }
            Ok(RawEngineResult {
                groups: vec![ResultGroup {
                    lines: vec![LineResult {
                        text: "ABC".to_string(),
                        characters: vec![],
                    }],
                }],
                image_base64: None,
            })
        }
    }

    fn test_config() -> RecognitionConfig {
        RecognitionConfig {
            license: "trial".to_string(),
            template: "{}".to_string(),
            template_name: "locr".to_string(),
            custom_model: CustomModelConfig {
                folder: "MRZ".to_string(),
                file_names: vec!["NumberUppercase".to_string()],
            },
            scan_region: ScanRegion::default(),
            include_image_base64: true,
        }
    }

    #[test]
    fn test_invoke_passes_frame_and_config_through() {
        let engine = Arc::new(RecordingEngine {
            seen: Mutex::new(Vec::new()),
            fail: false,
        });
        let invoker = RecognitionInvoker::new(engine.clone(), test_config());

        let frame = CapturedFrame::blank(8, 4, Instant::now());
        let result = invoker.invoke(&frame).unwrap();

        assert_eq!(result.groups[0].lines[0].text, "ABC");
        assert_eq!(*engine.seen.lock(), vec![(8, 4, "locr".to_string())]);
    }

    #[test]
    fn test_invoke_returns_engine_failure_without_retry() {
        let engine = Arc::new(RecordingEngine {
            seen: Mutex::new(Vec::new()),
            fail: true,
        });
        let invoker = RecognitionInvoker::new(engine.clone(), test_config());

        let frame = CapturedFrame::blank(8, 4, Instant::now());
        let err = invoker.invoke(&frame).unwrap_err();

        assert_eq!(err, EngineError::LicenseRejected("expired".to_string()));
        assert_eq!(engine.seen.lock().len(), 1);
    }
}
