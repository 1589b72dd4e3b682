//! Vendor registry: model configuration to adapter instance.
//!
//! The registry owns the single pooled HTTP client and maps a resolved
//! model configuration onto the concrete vendor binding. Every mismatch
//! (wrong modality, missing credential, missing endpoint) is rejected
//! here as a configuration error, before any request is made.

use reelforge_core::error::CoreError;
use reelforge_core::model_config::{Modality, Vendor, VendorParams};

use crate::baidu::BaiduAdapter;
use crate::keling::KelingAdapter;
use crate::stable_diffusion::StableDiffusionAdapter;
use crate::tongyi::TongyiAdapter;
use crate::traits::{ImageAdapter, TextAdapter, VideoAdapter};
use crate::zhipu::ZhipuAdapter;

/// A fully resolved model configuration, ready to be turned into an
/// adapter. Credentials arrive already unsealed.
#[derive(Debug, Clone)]
pub struct AdapterSpec {
    pub vendor: Vendor,
    pub model_name: String,
    pub api_key: Option<String>,
    pub endpoint: Option<String>,
    pub params: VendorParams,
}

pub struct AdapterRegistry {
    client: reqwest::Client,
}

impl Default for AdapterRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl AdapterRegistry {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    pub fn text_adapter(&self, spec: &AdapterSpec) -> Result<Box<dyn TextAdapter>, CoreError> {
        check_modality(spec, Modality::Text)?;
        let params = match &spec.params {
            VendorParams::Chat(params) => params.clone(),
            _ => return Err(params_mismatch(spec)),
        };
        let api_key = required_key(spec)?;

        let adapter: Box<dyn TextAdapter> = match spec.vendor {
            Vendor::Zhipu => Box::new(ZhipuAdapter::new(
                self.client.clone(),
                api_key,
                spec.model_name.clone(),
                spec.endpoint.clone(),
                params,
            )),
            Vendor::Tongyi => Box::new(TongyiAdapter::new(
                self.client.clone(),
                api_key,
                spec.model_name.clone(),
                spec.endpoint.clone(),
                params,
            )),
            Vendor::Baidu => {
                let (key, secret) = BaiduAdapter::split_credential(&api_key).ok_or_else(|| {
                    CoreError::Config(format!(
                        "vendor '{}' expects an 'api_key:secret_key' credential",
                        spec.vendor.as_str()
                    ))
                })?;
                Box::new(BaiduAdapter::new(
                    self.client.clone(),
                    key,
                    secret,
                    spec.model_name.clone(),
                    spec.endpoint.clone(),
                    params,
                ))
            }
            Vendor::StableDiffusion | Vendor::Keling => unreachable!("modality checked above"),
        };
        Ok(adapter)
    }

    pub fn image_adapter(&self, spec: &AdapterSpec) -> Result<Box<dyn ImageAdapter>, CoreError> {
        check_modality(spec, Modality::Image)?;
        let params = match &spec.params {
            VendorParams::Image(params) => params.clone(),
            _ => return Err(params_mismatch(spec)),
        };
        let endpoint = required_endpoint(spec)?;

        match spec.vendor {
            Vendor::StableDiffusion => Ok(Box::new(StableDiffusionAdapter::new(
                self.client.clone(),
                spec.api_key.clone(),
                endpoint,
                params,
            ))),
            _ => unreachable!("modality checked above"),
        }
    }

    pub fn video_adapter(&self, spec: &AdapterSpec) -> Result<Box<dyn VideoAdapter>, CoreError> {
        check_modality(spec, Modality::Video)?;
        let params = match &spec.params {
            VendorParams::Video(params) => params.clone(),
            _ => return Err(params_mismatch(spec)),
        };
        let api_key = required_key(spec)?;
        let endpoint = required_endpoint(spec)?;

        match spec.vendor {
            Vendor::Keling => Ok(Box::new(KelingAdapter::new(
                self.client.clone(),
                api_key,
                spec.model_name.clone(),
                endpoint,
                params,
            ))),
            _ => unreachable!("modality checked above"),
        }
    }
}

fn check_modality(spec: &AdapterSpec, wanted: Modality) -> Result<(), CoreError> {
    if spec.vendor.modality() != wanted {
        return Err(CoreError::Config(format!(
            "vendor '{}' does not provide {} generation",
            spec.vendor.as_str(),
            wanted.as_str()
        )));
    }
    Ok(())
}

fn params_mismatch(spec: &AdapterSpec) -> CoreError {
    CoreError::Config(format!(
        "parameter block does not match vendor '{}'",
        spec.vendor.as_str()
    ))
}

fn required_key(spec: &AdapterSpec) -> Result<String, CoreError> {
    spec.api_key.clone().ok_or_else(|| {
        CoreError::Config(format!(
            "vendor '{}' requires an API key",
            spec.vendor.as_str()
        ))
    })
}

fn required_endpoint(spec: &AdapterSpec) -> Result<String, CoreError> {
    spec.endpoint.clone().ok_or_else(|| {
        CoreError::Config(format!(
            "vendor '{}' requires an explicit endpoint",
            spec.vendor.as_str()
        ))
    })
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use reelforge_core::model_config::{ChatParams, ImageParams, VideoParams};

    use super::*;

    fn chat_spec(vendor: Vendor) -> AdapterSpec {
        AdapterSpec {
            vendor,
            model_name: "test-model".to_string(),
            api_key: Some("key".to_string()),
            endpoint: None,
            params: VendorParams::Chat(ChatParams::default()),
        }
    }

    #[test]
    fn builds_each_text_vendor() {
        let registry = AdapterRegistry::new();
        assert!(registry.text_adapter(&chat_spec(Vendor::Zhipu)).is_ok());
        assert!(registry.text_adapter(&chat_spec(Vendor::Tongyi)).is_ok());

        let mut baidu = chat_spec(Vendor::Baidu);
        baidu.api_key = Some("ak:sk".to_string());
        assert!(registry.text_adapter(&baidu).is_ok());
    }

    #[test]
    fn rejects_wrong_modality() {
        let registry = AdapterRegistry::new();
        let spec = chat_spec(Vendor::Keling);
        assert_matches!(registry.text_adapter(&spec), Err(CoreError::Config(_)));
    }

    #[test]
    fn rejects_params_vendor_mismatch() {
        let registry = AdapterRegistry::new();
        let mut spec = chat_spec(Vendor::Zhipu);
        spec.params = VendorParams::Image(ImageParams::default());
        assert_matches!(registry.text_adapter(&spec), Err(CoreError::Config(_)));
    }

    #[test]
    fn rejects_missing_api_key() {
        let registry = AdapterRegistry::new();
        let mut spec = chat_spec(Vendor::Zhipu);
        spec.api_key = None;
        assert_matches!(registry.text_adapter(&spec), Err(CoreError::Config(_)));
    }

    #[test]
    fn rejects_malformed_baidu_credential() {
        let registry = AdapterRegistry::new();
        let spec = chat_spec(Vendor::Baidu);
        assert_matches!(registry.text_adapter(&spec), Err(CoreError::Config(_)));
    }

    #[test]
    fn image_vendor_requires_endpoint() {
        let registry = AdapterRegistry::new();
        let mut spec = AdapterSpec {
            vendor: Vendor::StableDiffusion,
            model_name: "sdxl".to_string(),
            api_key: None,
            endpoint: None,
            params: VendorParams::Image(ImageParams::default()),
        };
        assert_matches!(registry.image_adapter(&spec), Err(CoreError::Config(_)));

        spec.endpoint = Some("http://localhost:7860".to_string());
        assert!(registry.image_adapter(&spec).is_ok());
    }

    #[test]
    fn video_vendor_requires_key_and_endpoint() {
        let registry = AdapterRegistry::new();
        let spec = AdapterSpec {
            vendor: Vendor::Keling,
            model_name: "keling-v1".to_string(),
            api_key: Some("key".to_string()),
            endpoint: Some("https://api.keling.example".to_string()),
            params: VendorParams::Video(VideoParams::default()),
        };
        assert!(registry.video_adapter(&spec).is_ok());
    }
}
