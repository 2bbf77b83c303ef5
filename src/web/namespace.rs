use js_sys::{Function, Object, Reflect};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::window;

use crate::error::ShimError;
use crate::shim::GraphicsNamespace;

/// A graphics library namespace exposed as a global on `window`.
#[derive(Debug, Clone)]
pub struct WindowGraphicsNamespace {
    namespace: Object,
}

impl WindowGraphicsNamespace {
    pub fn from_window(global: &str) -> Result<Self, ShimError> {
        let window = window().ok_or(ShimError::NamespaceMissing)?;
        let value = Reflect::get(&window, &JsValue::from_str(global))
            .map_err(|_| ShimError::NamespaceMissing)?;
        if value.is_undefined() || value.is_null() {
            return Err(ShimError::NamespaceMissing);
        }
        let namespace = value
            .dyn_into::<Object>()
            .map_err(|_| ShimError::NamespaceMissing)?;
        Ok(Self { namespace })
    }
}

impl GraphicsNamespace for WindowGraphicsNamespace {
    fn has_symbol(&self, name: &str) -> bool {
        Reflect::get(&self.namespace, &JsValue::from_str(name))
            .map(|value| !value.is_undefined())
            .unwrap_or(false)
    }

    fn register_placeholder(&self, name: &str) -> Result<(), ShimError> {
        // The name is bound as an argument; it never becomes part of the source.
        let warn = Function::new_with_args(
            "symbol",
            "console.warn(symbol + ' is not available in this graphics build');",
        );
        let placeholder = warn.bind1(&JsValue::NULL, &JsValue::from_str(name));
        let registration_error = |message: String| ShimError::Registration {
            symbol: name.to_string(),
            message,
        };
        match Reflect::set(&self.namespace, &JsValue::from_str(name), &placeholder) {
            Ok(true) => Ok(()),
            Ok(false) => Err(registration_error("namespace is not writable".into())),
            Err(err) => Err(registration_error(format!("{err:?}"))),
        }
    }
}
