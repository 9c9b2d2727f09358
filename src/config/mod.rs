//! Application Configuration
//!
//! Scanner settings stored in TOML format. Every section falls back to its
//! defaults when absent, so a config file only needs the keys it overrides.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::capture::CaptureConfig;
use crate::geometry::{FrameSize, Platform, ScanRegion};
use crate::overlay::{EngineCoordinates, OverlayStyle, MARKER_BIAS};
use crate::vision::{CustomModelConfig, RecognitionConfig};

/// Public trial license for the label recognizer
pub const TRIAL_LICENSE: &str = "DLS2eyJoYW5kc2hha2VDb2RlIjoiMjAwMDAxLTE2NDk4Mjk3OTI2MzUiLCJvcmdhbml6YXRpb25JRCI6IjIwMDAwMSIsInNlc3Npb25QYXNzd29yZCI6IndTcGR6Vm05WDJrcEQ5YUoifQ==";

/// Recognizer template for TD3 passport MRZ lines: two 44-character lines,
/// one regex per line format, MRZ character model
pub const MRZ_TEMPLATE: &str = r#"{"CharacterModelArray":[{"DirectoryPath":"","FilterFilePath":"","Name":"NumberUppercase"}],"LabelRecognizerParameterArray":[{"BinarizationModes":[{"BlockSizeX":0,"BlockSizeY":0,"EnableFillBinaryVacancy":1,"LibraryFileName":"","LibraryParameters":"","Mode":"BM_LOCAL_BLOCK","ThreshValueCoefficient":15}],"CharacterModelName":"NumberUppercase","LetterHeightRange":[5,1000,1],"LineStringLengthRange":[44,44],"MaxLineCharacterSpacing":130,"LineStringRegExPattern":"(P[OM<][A-Z]{3}([A-Z<]{0,35}[A-Z]{1,3}[(<<)][A-Z]{1,3}[A-Z<]{0,35}<{0,35}){(39)}){(44)}|([A-Z0-9<]{9}[0-9][A-Z]{3}[0-9]{2}[(01-12)][(01-31)][0-9][MF][0-9]{2}[(01-12)][(01-31)][0-9][A-Z0-9<]{14}[0-9<][0-9]){(44)}","MaxThreadCount":4,"Name":"locr","TextureDetectionModes":[{"Mode":"TDM_GENERAL_WIDTH_CONCENTRATION","Sensitivity":8}],"ReferenceRegionNameArray":["DRRegion"]}],"LineSpecificationArray":[{"Name":"L0","LineNumber":"","BinarizationModes":[{"BlockSizeX":30,"BlockSizeY":30,"Mode":"BM_LOCAL_BLOCK"}]}],"ReferenceRegionArray":[{"Localization":{"FirstPoint":[0,0],"SecondPoint":[100,0],"ThirdPoint":[100,100],"FourthPoint":[0,100],"MeasuredByPercentage":1,"SourceType":"LST_MANUAL_SPECIFICATION"},"Name":"DRRegion","TextAreaNameArray":["DTArea"]}],"TextAreaArray":[{"LineSpecificationNameArray":["L0"],"Name":"DTArea","FirstPoint":[0,0],"SecondPoint":[100,0],"ThirdPoint":[100,100],"FourthPoint":[0,100]}]}"#;

/// Application settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Scan region and camera settings
    pub scan: ScanSettings,
    /// Recognition engine settings
    pub recognition: RecognitionSettings,
    /// Overlay drawing settings
    pub overlay: OverlaySettings,
}

impl AppConfig {
    /// Engine configuration for one session, including the scan region
    pub fn recognition_config(&self) -> RecognitionConfig {
        RecognitionConfig {
            license: self.recognition.license.clone(),
            template: self.recognition.template.clone(),
            template_name: self.recognition.template_name.clone(),
            custom_model: CustomModelConfig {
                folder: self.recognition.custom_model_folder.clone(),
                file_names: self.recognition.custom_model_file_names.clone(),
            },
            scan_region: self.scan.region,
            include_image_base64: self.recognition.include_image_base64,
        }
    }

    pub fn capture_config(&self) -> CaptureConfig {
        CaptureConfig {
            max_fps: self.scan.frame_processor_fps,
            preferred_resolution: FrameSize::new(
                self.scan.preferred_width,
                self.scan.preferred_height,
            ),
        }
    }

    pub fn overlay_style(&self) -> OverlayStyle {
        OverlayStyle {
            marker_radius: self.overlay.marker_radius,
            marker_bias: self.overlay.marker_bias,
            ..OverlayStyle::default()
        }
    }
}

/// Scan region and camera settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanSettings {
    /// Frames per second handed to the recognizer
    pub frame_processor_fps: u32,
    /// Preferred camera resolution width
    pub preferred_width: u32,
    /// Preferred camera resolution height
    pub preferred_height: u32,
    /// Platform sensor behavior
    pub platform: Platform,
    /// Space the engine reports character corners in
    pub engine_coordinates: EngineCoordinates,
    /// Where in the frame recognition is attempted, in percent
    pub region: ScanRegion,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            frame_processor_fps: 1,
            preferred_width: 1280,
            preferred_height: 720,
            platform: Platform::current(),
            engine_coordinates: EngineCoordinates::RegionLocal,
            region: ScanRegion::default(),
        }
    }
}

/// Recognition engine settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecognitionSettings {
    /// Engine license token
    pub license: String,
    /// Recognizer template JSON
    pub template: String,
    /// Name of the parameter set inside the template
    pub template_name: String,
    /// Folder containing the character model files
    pub custom_model_folder: String,
    /// Character model file names
    pub custom_model_file_names: Vec<String>,
    /// Ask the engine for a snapshot of the processed region
    pub include_image_base64: bool,
}

impl Default for RecognitionSettings {
    fn default() -> Self {
        Self {
            license: TRIAL_LICENSE.to_string(),
            template: MRZ_TEMPLATE.to_string(),
            template_name: "locr".to_string(),
            custom_model_folder: "MRZ".to_string(),
            custom_model_file_names: [
                "NumberUppercase",
                "NumberUppercase_Assist_1lIJ",
                "NumberUppercase_Assist_8B",
                "NumberUppercase_Assist_8BHR",
                "NumberUppercase_Assist_number",
                "NumberUppercase_Assist_O0DQ",
                "NumberUppercase_Assist_upcase",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            include_image_base64: true,
        }
    }
}

/// Overlay drawing settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlaySettings {
    /// Vertical offset of markers below the character baseline
    pub marker_bias: f32,
    /// Marker radius in pixels
    pub marker_radius: i32,
}

impl Default for OverlaySettings {
    fn default() -> Self {
        Self {
            marker_bias: MARKER_BIAS,
            marker_radius: 1,
        }
    }
}

/// Load configuration from file
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {:?}", path))?;
    let config: AppConfig = toml::from_str(&content)
        .with_context(|| format!("Invalid config {:?}", path))?;
    Ok(config)
}

/// Save configuration to file
pub fn save_config(config: &AppConfig, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config directory {:?}", parent))?;
    }
    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_app_config() {
        let config = AppConfig::default();

        // Check scan defaults
        assert_eq!(config.scan.region, ScanRegion::default());
        assert_eq!(config.scan.frame_processor_fps, 1);
        assert_eq!(config.scan.preferred_width, 1280);
        assert_eq!(config.scan.preferred_height, 720);
        assert_eq!(config.scan.engine_coordinates, EngineCoordinates::RegionLocal);

        // Check recognition defaults
        assert_eq!(config.recognition.template_name, "locr");
        assert_eq!(config.recognition.custom_model_folder, "MRZ");
        assert_eq!(config.recognition.custom_model_file_names.len(), 7);
        assert!(config.recognition.include_image_base64);
        assert!(config.recognition.template.contains("\"LineStringLengthRange\":[44,44]"));

        // Check overlay defaults
        assert!((config.overlay.marker_bias - 4.0).abs() < 0.01);
        assert_eq!(config.overlay.marker_radius, 1);
    }

    #[test]
    fn test_template_is_valid_json() {
        let value: serde_json::Value = serde_json::from_str(MRZ_TEMPLATE).unwrap();
        assert_eq!(value["LabelRecognizerParameterArray"][0]["Name"], "locr");
    }

    #[test]
    fn test_recognition_config_carries_region() {
        let mut config = AppConfig::default();
        config.scan.region = ScanRegion::new(0.0, 30.0, 100.0, 20.0).unwrap();

        let recognition = config.recognition_config();
        assert_eq!(recognition.scan_region, config.scan.region);
        assert_eq!(recognition.license, TRIAL_LICENSE);
        assert_eq!(recognition.custom_model.file_names[0], "NumberUppercase");
    }

    #[test]
    fn test_config_serialization_roundtrip() {
        let config = AppConfig::default();

        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();

        assert_eq!(config.scan.region, parsed.scan.region);
        assert_eq!(config.scan.platform, parsed.scan.platform);
        assert_eq!(config.recognition.template, parsed.recognition.template);
        assert_eq!(config.overlay.marker_radius, parsed.overlay.marker_radius);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            "[scan]\nframe_processor_fps = 2\nplatform = \"android\"\nregion = {{ left = 0, top = 45, width = 100, height = 12 }}"
        )
        .unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.scan.frame_processor_fps, 2);
        assert_eq!(config.scan.platform, Platform::Android);
        assert_eq!(config.scan.region, ScanRegion::new(0.0, 45.0, 100.0, 12.0).unwrap());
        assert_eq!(config.scan.preferred_width, 1280);
        assert_eq!(config.recognition.template_name, "locr");
        assert_eq!(config.capture_config().max_fps, 2);
    }

    #[test]
    fn test_invalid_region_is_rejected() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            "[scan]\nregion = {{ left = 20, top = 40, width = 90, height = 10 }}"
        )
        .unwrap();

        let result = load_config(temp_file.path());
        assert!(result.is_err());
    }

    #[test]
    fn test_save_and_load_config() {
        let mut config = AppConfig::default();
        config.overlay.marker_bias = 6.0;

        let temp_file = NamedTempFile::new().unwrap();
        save_config(&config, temp_file.path()).unwrap();
        let loaded = load_config(temp_file.path()).unwrap();

        assert!((loaded.overlay.marker_bias - 6.0).abs() < 0.01);
        assert_eq!(loaded.overlay_style().marker_bias, 6.0);
        assert_eq!(config.scan.region, loaded.scan.region);
    }

    #[test]
    fn test_save_config_creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mrz").join("config.toml");
        assert!(!path.parent().unwrap().exists());

        save_config(&AppConfig::default(), &path).unwrap();
        assert!(path.exists());
        assert_eq!(load_config(&path).unwrap().scan.frame_processor_fps, 1);
    }

    #[test]
    fn test_load_config_file_not_found() {
        let result = load_config(Path::new("/nonexistent/path/config.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_config_invalid_toml() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "this is not valid toml {{{{").unwrap();

        let result = load_config(temp_file.path());
        assert!(result.is_err());
    }
}
