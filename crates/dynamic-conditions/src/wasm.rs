//! WASM bindings for the condition engine.

#![cfg(feature = "wasm")]

use crate::context::{EvaluationContext, StaticHost};
use crate::evaluator::ConditionEvaluator;
use crate::settings::ElementSettings;
use wasm_bindgen::prelude::*;

/// WASM-compatible condition engine wrapper.
///
/// Runs without host callbacks: shortcodes are left as-is and media ids
/// fall back to their urls.
#[wasm_bindgen]
pub struct WasmConditionEngine {
    evaluator: ConditionEvaluator,
    host: StaticHost,
}

impl WasmConditionEngine {
    fn decide(
        &self,
        settings_json: &str,
        context_json: &str,
    ) -> Result<crate::decision::VisibilityDecision, JsValue> {
        let settings = ElementSettings::from_json(settings_json)
            .map_err(|e| JsValue::from_str(&format!("Invalid settings: {}", e)))?;
        let context: EvaluationContext = serde_json::from_str(context_json)
            .map_err(|e| JsValue::from_str(&format!("Invalid context: {}", e)))?;

        Ok(self.evaluator.evaluate(&settings, &context, &self.host))
    }
}

#[wasm_bindgen]
impl WasmConditionEngine {
    /// Creates a new WASM condition engine.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            evaluator: ConditionEvaluator::new(),
            host: StaticHost::new(),
        }
    }

    /// Evaluates element settings (JSON) against a context (JSON).
    /// Returns true if the element is hidden.
    #[wasm_bindgen]
    pub fn evaluate(&self, settings_json: &str, context_json: &str) -> Result<bool, JsValue> {
        Ok(self.decide(settings_json, context_json)?.is_hidden())
    }

    /// Evaluates and returns the full decision as a JSON string.
    #[wasm_bindgen]
    pub fn evaluate_detailed(&self, settings_json: &str, context_json: &str) -> Result<String, JsValue> {
        let decision = self.decide(settings_json, context_json)?;
        serde_json::to_string(&decision).map_err(|e| JsValue::from_str(&e.to_string()))
    }
}

impl Default for WasmConditionEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Logs a message to the console (for debugging).
#[wasm_bindgen]
pub fn log(message: &str) {
    web_sys::console::log_1(&JsValue::from_str(message));
}

/// Returns the version of the condition engine.
#[wasm_bindgen]
pub fn version() -> String {
    crate::VERSION.to_string()
}
