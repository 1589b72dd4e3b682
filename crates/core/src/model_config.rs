//! Vendor identification and per-vendor generation parameters.
//!
//! Vendor selection used to be a free-form string compared at call time;
//! here the tag is parsed into [`Vendor`] once, when the configuration is
//! loaded, and unknown tags fail closed as a configuration error. The same
//! applies to the parameter map: each vendor has a closed, validated
//! parameter struct instead of an untyped JSON bag, so malformed
//! parameters are caught at configuration time rather than mid-generation.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Vendor tags
// ---------------------------------------------------------------------------

/// A supported generation backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Vendor {
    /// Zhipu GLM chat completion (text).
    Zhipu,
    /// Alibaba Tongyi / DashScope text generation (text).
    Tongyi,
    /// Baidu ERNIE chat completion (text).
    Baidu,
    /// Stable Diffusion HTTP gateway (image).
    StableDiffusion,
    /// Keling video generation (video, asynchronous jobs).
    Keling,
}

/// The generation modality an adapter provides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modality {
    Text,
    Image,
    Video,
}

impl Modality {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Image => "image",
            Self::Video => "video",
        }
    }
}

impl Vendor {
    /// Parse a stored vendor tag. Unknown tags fail closed.
    pub fn parse(tag: &str) -> Result<Self, CoreError> {
        match tag {
            "zhipu" => Ok(Self::Zhipu),
            "tongyi" => Ok(Self::Tongyi),
            "baidu" => Ok(Self::Baidu),
            "stable-diffusion" => Ok(Self::StableDiffusion),
            "keling" => Ok(Self::Keling),
            other => Err(CoreError::Config(format!("Unsupported vendor '{other}'"))),
        }
    }

    /// Stable string form stored in the `model_configs.vendor` column.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Zhipu => "zhipu",
            Self::Tongyi => "tongyi",
            Self::Baidu => "baidu",
            Self::StableDiffusion => "stable-diffusion",
            Self::Keling => "keling",
        }
    }

    /// The capability this vendor implements.
    pub fn modality(self) -> Modality {
        match self {
            Self::Zhipu | Self::Tongyi | Self::Baidu => Modality::Text,
            Self::StableDiffusion => Modality::Image,
            Self::Keling => Modality::Video,
        }
    }
}

// ---------------------------------------------------------------------------
// Per-vendor parameters
// ---------------------------------------------------------------------------

/// Optional tuning knobs accepted by the chat-style text vendors.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ChatParams {
    /// Nucleus sampling cutoff; vendor default when absent.
    pub top_p: Option<f64>,
}

fn default_image_dim() -> i32 {
    1024
}
fn default_num_images() -> i32 {
    1
}
fn default_steps() -> i32 {
    50
}
fn default_guidance() -> f64 {
    7.5
}
fn default_seed() -> i64 {
    -1
}

/// Parameters for the Stable Diffusion image gateway.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ImageParams {
    #[serde(default = "default_image_dim")]
    pub width: i32,
    #[serde(default = "default_image_dim")]
    pub height: i32,
    #[serde(default = "default_num_images")]
    pub num_images: i32,
    #[serde(default = "default_steps")]
    pub steps: i32,
    #[serde(default = "default_guidance")]
    pub guidance_scale: f64,
    /// -1 requests a random seed on the vendor side.
    #[serde(default = "default_seed")]
    pub seed: i64,
}

impl Default for ImageParams {
    fn default() -> Self {
        Self {
            width: default_image_dim(),
            height: default_image_dim(),
            num_images: default_num_images(),
            steps: default_steps(),
            guidance_scale: default_guidance(),
            seed: default_seed(),
        }
    }
}

fn default_video_duration() -> f64 {
    5.0
}
fn default_fps() -> i32 {
    30
}
fn default_video_width() -> i32 {
    1280
}
fn default_video_height() -> i32 {
    720
}
fn default_video_mode() -> String {
    "standard".to_string()
}

/// Parameters for the Keling video backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct VideoParams {
    /// Requested clip length in seconds.
    #[serde(default = "default_video_duration")]
    pub duration: f64,
    #[serde(default = "default_fps")]
    pub fps: i32,
    #[serde(default = "default_video_width")]
    pub width: i32,
    #[serde(default = "default_video_height")]
    pub height: i32,
    /// Vendor generation mode, e.g. `standard` or `professional`.
    #[serde(default = "default_video_mode")]
    pub mode: String,
    #[serde(default = "default_seed")]
    pub seed: i64,
}

impl Default for VideoParams {
    fn default() -> Self {
        Self {
            duration: default_video_duration(),
            fps: default_fps(),
            width: default_video_width(),
            height: default_video_height(),
            mode: default_video_mode(),
            seed: default_seed(),
        }
    }
}

/// Validated, vendor-specific parameter set.
#[derive(Debug, Clone, PartialEq)]
pub enum VendorParams {
    Chat(ChatParams),
    Image(ImageParams),
    Video(VideoParams),
}

/// Maximum image dimension accepted for either axis.
pub const MAX_IMAGE_DIM: i32 = 4096;

/// Maximum number of images per generation request.
pub const MAX_IMAGES_PER_REQUEST: i32 = 4;

/// Maximum video clip length in seconds.
pub const MAX_VIDEO_DURATION_SECS: f64 = 60.0;

/// Parse and validate the stored parameter JSON for a vendor.
///
/// The raw value comes from the `model_configs.parameters` column. A
/// `null` or empty object yields the vendor defaults. Unknown fields and
/// out-of-range values are configuration errors.
pub fn parse_params(vendor: Vendor, raw: &serde_json::Value) -> Result<VendorParams, CoreError> {
    let empty = serde_json::Value::Object(Default::default());
    let raw = if raw.is_null() { &empty } else { raw };

    let bad = |e: serde_json::Error| {
        CoreError::Config(format!(
            "Invalid parameters for vendor '{}': {e}",
            vendor.as_str()
        ))
    };

    match vendor.modality() {
        Modality::Text => {
            let params: ChatParams = serde_json::from_value(raw.clone()).map_err(bad)?;
            if let Some(top_p) = params.top_p {
                if !(0.0..=1.0).contains(&top_p) {
                    return Err(CoreError::Config(format!(
                        "top_p must be in 0..=1, got {top_p}"
                    )));
                }
            }
            Ok(VendorParams::Chat(params))
        }
        Modality::Image => {
            let params: ImageParams = serde_json::from_value(raw.clone()).map_err(bad)?;
            validate_image_params(&params)?;
            Ok(VendorParams::Image(params))
        }
        Modality::Video => {
            let params: VideoParams = serde_json::from_value(raw.clone()).map_err(bad)?;
            validate_video_params(&params)?;
            Ok(VendorParams::Video(params))
        }
    }
}

fn validate_image_params(params: &ImageParams) -> Result<(), CoreError> {
    if params.width <= 0 || params.width > MAX_IMAGE_DIM {
        return Err(CoreError::Config(format!(
            "image width must be in 1..={MAX_IMAGE_DIM}, got {}",
            params.width
        )));
    }
    if params.height <= 0 || params.height > MAX_IMAGE_DIM {
        return Err(CoreError::Config(format!(
            "image height must be in 1..={MAX_IMAGE_DIM}, got {}",
            params.height
        )));
    }
    if params.num_images <= 0 || params.num_images > MAX_IMAGES_PER_REQUEST {
        return Err(CoreError::Config(format!(
            "num_images must be in 1..={MAX_IMAGES_PER_REQUEST}, got {}",
            params.num_images
        )));
    }
    if params.steps <= 0 {
        return Err(CoreError::Config("steps must be positive".to_string()));
    }
    Ok(())
}

fn validate_video_params(params: &VideoParams) -> Result<(), CoreError> {
    if !params.duration.is_finite() || params.duration <= 0.0 {
        return Err(CoreError::Config(format!(
            "video duration must be positive, got {}",
            params.duration
        )));
    }
    if params.duration > MAX_VIDEO_DURATION_SECS {
        return Err(CoreError::Config(format!(
            "video duration must be <= {MAX_VIDEO_DURATION_SECS}s, got {}",
            params.duration
        )));
    }
    if params.fps <= 0 || params.width <= 0 || params.height <= 0 {
        return Err(CoreError::Config(
            "fps, width, and height must all be positive".to_string(),
        ));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    // -- vendor tag parsing ---------------------------------------------------

    #[test]
    fn vendor_tag_roundtrip() {
        for vendor in [
            Vendor::Zhipu,
            Vendor::Tongyi,
            Vendor::Baidu,
            Vendor::StableDiffusion,
            Vendor::Keling,
        ] {
            assert_eq!(Vendor::parse(vendor.as_str()).unwrap(), vendor);
        }
    }

    #[test]
    fn unknown_vendor_fails_closed() {
        let err = Vendor::parse("midjourney").unwrap_err();
        assert_matches!(err, CoreError::Config(_));
    }

    #[test]
    fn vendor_modalities() {
        assert_eq!(Vendor::Zhipu.modality(), Modality::Text);
        assert_eq!(Vendor::StableDiffusion.modality(), Modality::Image);
        assert_eq!(Vendor::Keling.modality(), Modality::Video);
    }

    // -- parameter parsing ----------------------------------------------------

    #[test]
    fn null_params_yield_defaults() {
        let parsed = parse_params(Vendor::StableDiffusion, &serde_json::Value::Null).unwrap();
        assert_eq!(parsed, VendorParams::Image(ImageParams::default()));
    }

    #[test]
    fn empty_object_yields_defaults() {
        let parsed = parse_params(Vendor::Keling, &json!({})).unwrap();
        assert_eq!(parsed, VendorParams::Video(VideoParams::default()));
    }

    #[test]
    fn image_params_override_defaults() {
        let parsed =
            parse_params(Vendor::StableDiffusion, &json!({"width": 512, "steps": 20})).unwrap();
        let VendorParams::Image(params) = parsed else {
            panic!("expected image params");
        };
        assert_eq!(params.width, 512);
        assert_eq!(params.height, 1024);
        assert_eq!(params.steps, 20);
    }

    #[test]
    fn unknown_field_is_config_error() {
        let err = parse_params(Vendor::StableDiffusion, &json!({"wdith": 512})).unwrap_err();
        assert_matches!(err, CoreError::Config(_));
    }

    #[test]
    fn chat_params_reject_bad_top_p() {
        assert!(parse_params(Vendor::Zhipu, &json!({"top_p": 1.5})).is_err());
        assert!(parse_params(Vendor::Zhipu, &json!({"top_p": 0.9})).is_ok());
    }

    #[test]
    fn image_params_reject_out_of_range() {
        assert!(parse_params(Vendor::StableDiffusion, &json!({"width": 0})).is_err());
        assert!(parse_params(Vendor::StableDiffusion, &json!({"num_images": 9})).is_err());
    }

    #[test]
    fn video_params_reject_non_positive_duration() {
        assert!(parse_params(Vendor::Keling, &json!({"duration": 0.0})).is_err());
        assert!(parse_params(Vendor::Keling, &json!({"duration": -2.0})).is_err());
    }

    #[test]
    fn video_params_reject_excessive_duration() {
        assert!(parse_params(Vendor::Keling, &json!({"duration": 600.0})).is_err());
    }
}
