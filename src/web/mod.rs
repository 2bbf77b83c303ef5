#![cfg(target_arch = "wasm32")]

mod environment;
mod namespace;
mod surface;

use wasm_bindgen::prelude::*;

use crate::shim::{CompatibilityShims, ShimReport};
use crate::{evaluate, AdaptiveConfig, ShimError};

pub use environment::BrowserEnvironment;
pub use namespace::WindowGraphicsNamespace;
pub use surface::WasmSurface;

#[wasm_bindgen(start)]
pub fn bootstrap() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());
}

/// Profiles the current browser and returns `{ profile, policy, engine, tuning }` as JSON.
#[wasm_bindgen(js_name = evaluateRenderPolicy)]
pub fn evaluate_render_policy(config_json: Option<String>) -> Result<String, JsValue> {
    let config = load_config(config_json)?;
    let probe = BrowserEnvironment::new()?;
    let evaluation = evaluate(&config, &probe);
    serde_json::to_string(&evaluation).map_err(|err| JsValue::from_str(&err.to_string()))
}

/// Installs placeholders for symbols missing from `window.THREE`. Runs once
/// per page; returns the report as JSON.
#[wasm_bindgen(js_name = installCompatibilityShims)]
pub fn install_compatibility_shims() -> Result<String, JsValue> {
    let report = match WindowGraphicsNamespace::from_window("THREE") {
        Ok(namespace) => CompatibilityShims::default().install(&namespace).clone(),
        Err(ShimError::NamespaceMissing) => {
            log::debug!("window.THREE not present; skipping compatibility shims");
            ShimReport::default()
        }
        Err(err) => return Err(JsValue::from_str(&err.to_string())),
    };
    serde_json::to_string(&report).map_err(|err| JsValue::from_str(&err.to_string()))
}

pub(crate) fn load_config(config_json: Option<String>) -> Result<AdaptiveConfig, JsValue> {
    match config_json {
        Some(text) => {
            AdaptiveConfig::from_json_str(&text).map_err(|err| JsValue::from_str(&err.to_string()))
        }
        None => Ok(AdaptiveConfig::default()),
    }
}
