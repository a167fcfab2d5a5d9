//! Generation parameter types

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Seed value asking the service to pick a random seed
pub const RANDOM_SEED: i64 = -1;

/// Parameters of one image-to-video generation request
///
/// Field names match the remote API's request body exactly, so this struct
/// is serialized as-is when a job is submitted. A submitted value is never
/// mutated; resubmitting with different settings builds a new value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationParameters {
    /// Video length in seconds (1-10)
    pub duration: u32,
    pub enable_safety_checker: bool,
    /// Flow shift (1.0-5.0)
    pub flow_shift: f64,
    /// Classifier-free guidance scale (1.0-10.0)
    pub guidance_scale: f64,
    /// Source image, either a data URI or a remote URL
    pub image: String,
    #[serde(default)]
    pub negative_prompt: String,
    /// Number of denoising steps (20-50)
    pub num_inference_steps: u32,
    pub prompt: String,
    /// Seed, or [`RANDOM_SEED`] to let the service choose
    pub seed: i64,
    pub size: OutputSize,
}

impl Default for GenerationParameters {
    fn default() -> Self {
        Self {
            duration: 5,
            enable_safety_checker: true,
            flow_shift: 3.0,
            guidance_scale: 5.0,
            image: String::new(),
            negative_prompt: String::new(),
            num_inference_steps: 30,
            prompt: String::new(),
            seed: RANDOM_SEED,
            size: OutputSize::default(),
        }
    }
}

impl GenerationParameters {
    /// Ready-to-run example request with a hosted source image
    pub fn example() -> Self {
        Self {
            image: "https://d2g64w682n9w0w.cloudfront.net/media/images/1745079024013078406_QT6jKNPZ.png"
                .to_string(),
            prompt: "A girl stands in a lively 17th-century market. She holds a red tomato, \
                     looks gently into the camera and smiles briefly. Then, she glances at the \
                     tomato in her hand, slowly sets it back into the basket, turns around \
                     gracefully, and walks away with her back to the camera. The market around \
                     her is rich with colorful vegetables, meats hanging above, and bustling \
                     townsfolk. Golden-hour painterly lighting, subtle facial expressions, smooth \
                     cinematic motion, ultra-realistic detail, Vermeer-inspired style"
                .to_string(),
            ..Self::default()
        }
    }

    /// Checks the parameters before anything is sent to the service
    ///
    /// Image and prompt are required; numeric settings must stay inside the
    /// ranges the service accepts.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.image.trim().is_empty() {
            return Err(ValidationError::MissingImage);
        }

        if self.prompt.trim().is_empty() {
            return Err(ValidationError::MissingPrompt);
        }

        if !(1..=10).contains(&self.duration) {
            return Err(ValidationError::out_of_range(
                "duration",
                self.duration,
                "1..=10",
            ));
        }

        if !(1.0..=10.0).contains(&self.guidance_scale) {
            return Err(ValidationError::out_of_range(
                "guidance_scale",
                self.guidance_scale,
                "1.0..=10.0",
            ));
        }

        if !(1.0..=5.0).contains(&self.flow_shift) {
            return Err(ValidationError::out_of_range(
                "flow_shift",
                self.flow_shift,
                "1.0..=5.0",
            ));
        }

        if !(20..=50).contains(&self.num_inference_steps) {
            return Err(ValidationError::out_of_range(
                "num_inference_steps",
                self.num_inference_steps,
                "20..=50",
            ));
        }

        Ok(())
    }
}

/// Output resolution offered by the service
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OutputSize {
    #[default]
    #[serde(rename = "832*480")]
    Landscape,
    #[serde(rename = "768*768")]
    Square,
    #[serde(rename = "576*1024")]
    Portrait,
}

impl OutputSize {
    pub const ALL: [OutputSize; 3] = [
        OutputSize::Landscape,
        OutputSize::Square,
        OutputSize::Portrait,
    ];

    /// Wire representation, e.g. `832*480`
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputSize::Landscape => "832*480",
            OutputSize::Square => "768*768",
            OutputSize::Portrait => "576*1024",
        }
    }
}

impl std::fmt::Display for OutputSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OutputSize {
    type Err = ValidationError;

    /// Accepts the wire form (`832*480`) as well as `832x480`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('x', "*");
        OutputSize::ALL
            .into_iter()
            .find(|size| size.as_str() == normalized)
            .ok_or_else(|| ValidationError::UnknownSize(s.to_string()))
    }
}

/// Reasons a generation request is rejected before submission
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("an image is required")]
    MissingImage,

    #[error("a prompt is required")]
    MissingPrompt,

    #[error("{field} = {value} is outside the accepted range {range}")]
    OutOfRange {
        field: &'static str,
        value: String,
        range: &'static str,
    },

    #[error("unknown output size '{0}' (expected one of 832*480, 768*768, 576*1024)")]
    UnknownSize(String),
}

impl ValidationError {
    fn out_of_range(field: &'static str, value: impl ToString, range: &'static str) -> Self {
        Self::OutOfRange {
            field,
            value: value.to_string(),
            range,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> GenerationParameters {
        GenerationParameters {
            image: "https://example.com/cat.png".to_string(),
            prompt: "a cat waves".to_string(),
            ..GenerationParameters::default()
        }
    }

    #[test]
    fn test_defaults_match_service_defaults() {
        let params = GenerationParameters::default();
        assert_eq!(params.duration, 5);
        assert_eq!(params.num_inference_steps, 30);
        assert_eq!(params.seed, RANDOM_SEED);
        assert_eq!(params.size, OutputSize::Landscape);
        assert!(params.enable_safety_checker);
    }

    #[test]
    fn test_validate_requires_image_and_prompt() {
        assert!(valid().validate().is_ok());

        let mut params = valid();
        params.image = String::new();
        assert_eq!(params.validate(), Err(ValidationError::MissingImage));

        let mut params = valid();
        params.prompt = "   ".to_string();
        assert_eq!(params.validate(), Err(ValidationError::MissingPrompt));
    }

    #[test]
    fn test_validate_rejects_out_of_range_values() {
        let mut params = valid();
        params.duration = 11;
        assert!(matches!(
            params.validate(),
            Err(ValidationError::OutOfRange { field: "duration", .. })
        ));

        let mut params = valid();
        params.flow_shift = 5.5;
        assert!(params.validate().is_err());

        let mut params = valid();
        params.guidance_scale = f64::NAN;
        assert!(params.validate().is_err());

        let mut params = valid();
        params.num_inference_steps = 19;
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_example_is_valid() {
        assert!(GenerationParameters::example().validate().is_ok());
    }

    #[test]
    fn test_wire_field_names() {
        let json = serde_json::to_value(valid()).unwrap();
        let mut keys: Vec<_> = json.as_object().unwrap().keys().cloned().collect();
        keys.sort();
        assert_eq!(
            keys,
            vec![
                "duration",
                "enable_safety_checker",
                "flow_shift",
                "guidance_scale",
                "image",
                "negative_prompt",
                "num_inference_steps",
                "prompt",
                "seed",
                "size",
            ]
        );
        assert_eq!(json["size"], "832*480");
        assert_eq!(json["seed"], -1);
    }

    #[test]
    fn test_output_size_parsing() {
        assert_eq!("768*768".parse::<OutputSize>(), Ok(OutputSize::Square));
        assert_eq!("576x1024".parse::<OutputSize>(), Ok(OutputSize::Portrait));
        assert!("1920*1080".parse::<OutputSize>().is_err());
    }
}
