use js_sys::Reflect;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{window, HtmlCanvasElement, Window};

use crate::environment::EnvironmentProbe;
use crate::error::ProbeError;

/// [`EnvironmentProbe`] backed by `window` and `navigator`.
#[derive(Debug, Clone)]
pub struct BrowserEnvironment {
    window: Window,
}

impl BrowserEnvironment {
    pub fn new() -> Result<Self, JsValue> {
        let window = window().ok_or_else(|| JsValue::from_str("window not available"))?;
        Ok(Self { window })
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    fn try_context(canvas: &HtmlCanvasElement, kind: &str) -> Result<bool, ProbeError> {
        canvas
            .get_context(kind)
            .map(|context| context.is_some())
            .map_err(|err| ProbeError::failed("webgl", format!("{err:?}")))
    }
}

impl EnvironmentProbe for BrowserEnvironment {
    fn user_agent(&self) -> Result<String, ProbeError> {
        self.window
            .navigator()
            .user_agent()
            .map_err(|err| ProbeError::failed("userAgent", format!("{err:?}")))
    }

    fn viewport_width(&self) -> Result<u32, ProbeError> {
        let width = self
            .window
            .inner_width()
            .map_err(|err| ProbeError::failed("innerWidth", format!("{err:?}")))?
            .as_f64()
            .ok_or(ProbeError::Unsupported("innerWidth"))?;
        Ok(width.max(0.0).round() as u32)
    }

    fn cpu_cores(&self) -> Result<u32, ProbeError> {
        let cores = self.window.navigator().hardware_concurrency();
        if cores.is_finite() && cores >= 1.0 {
            Ok(cores as u32)
        } else {
            Err(ProbeError::Unsupported("hardwareConcurrency"))
        }
    }

    fn memory_gb(&self) -> Result<f64, ProbeError> {
        // Not part of web-sys: deviceMemory only exists in Chromium browsers.
        Reflect::get(&self.window.navigator(), &JsValue::from_str("deviceMemory"))
            .map_err(|err| ProbeError::failed("deviceMemory", format!("{err:?}")))?
            .as_f64()
            .ok_or(ProbeError::Unsupported("deviceMemory"))
    }

    fn supports_webgl(&self) -> Result<bool, ProbeError> {
        let exposed = Reflect::has(&self.window, &JsValue::from_str("WebGLRenderingContext"))
            .map_err(|err| ProbeError::failed("webgl", format!("{err:?}")))?;
        if !exposed {
            return Ok(false);
        }
        let document = self
            .window
            .document()
            .ok_or(ProbeError::Unsupported("document"))?;
        let canvas = document
            .create_element("canvas")
            .map_err(|err| ProbeError::failed("webgl", format!("{err:?}")))?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| ProbeError::failed("webgl", "created element is not a canvas"))?;
        if Self::try_context(&canvas, "webgl")? {
            return Ok(true);
        }
        Self::try_context(&canvas, "experimental-webgl")
    }
}
