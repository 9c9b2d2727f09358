//! Recognition engine boundary types
//!
//! Shapes produced by the external label recognizer. Downstream code treats
//! them as read-only.

use serde::{Deserialize, Serialize};

use crate::geometry::ScanRegion;

/// A point in engine coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// One located character
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterResult {
    /// Recognized character
    pub text: String,
    /// Quadrilateral corners, ordered top-left, top-right, bottom-right, bottom-left
    pub corners: [Point; 4],
    /// Engine confidence (0 - 100)
    pub confidence: f32,
}

/// One recognized text line with its characters, left to right
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineResult {
    pub text: String,
    #[serde(default)]
    pub characters: Vec<CharacterResult>,
}

impl LineResult {
    /// Corner geometry of every character, in engine order
    pub fn character_corners(&self) -> Vec<[Point; 4]> {
        self.characters.iter().map(|c| c.corners).collect()
    }
}

/// A group of lines matched by one reference region of the template
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ResultGroup {
    #[serde(default)]
    pub lines: Vec<LineResult>,
}

/// Everything the engine returns for one frame
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RawEngineResult {
    #[serde(default)]
    pub groups: Vec<ResultGroup>,
    /// Base64 JPEG of the processed (cropped) frame, when requested
    #[serde(default)]
    pub image_base64: Option<String>,
}

/// Character model assets the engine loads for MRZ glyphs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomModelConfig {
    pub folder: String,
    pub file_names: Vec<String>,
}

/// Immutable per-session engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecognitionConfig {
    pub license: String,
    /// Declarative recognizer template (JSON)
    pub template: String,
    pub template_name: String,
    pub custom_model: CustomModelConfig,
    pub scan_region: ScanRegion,
    pub include_image_base64: bool,
}
