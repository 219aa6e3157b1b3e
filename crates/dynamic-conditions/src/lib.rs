//! Dynamic Conditions
//!
//! A visibility-condition engine for page-builder elements. Each element
//! carries one rule comparing a dynamic value against reference values;
//! the render gate suppresses the element's markup when the rule hides it.
//!
//! Compiles to native and, with the `wasm` feature, to WebAssembly.

pub mod binding;
pub mod comparator;
pub mod config;
pub mod context;
pub mod date;
pub mod debug;
pub mod decision;
pub mod error;
pub mod evaluator;
pub mod gate;
pub mod locale;
pub mod natural;
pub mod parser;
pub mod resolver;
pub mod settings;
pub mod tags;
pub mod types;
pub mod value;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use config::EngineConfig;
pub use context::{EvaluationContext, Host, StaticHost};
pub use decision::VisibilityDecision;
pub use error::{ConditionError, Result};
pub use evaluator::ConditionEvaluator;
pub use gate::{ElementShell, PopupLocation, RenderPass, RenderTicket};
pub use settings::ElementSettings;

/// Version of the condition engine.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Re-export commonly used types.
pub mod prelude {
    pub use crate::comparator::{compare, compare_all, ComparisonOutcome};
    pub use crate::config::EngineConfig;
    pub use crate::context::{EvaluationContext, Host, StaticHost};
    pub use crate::decision::VisibilityDecision;
    pub use crate::error::{ConditionError, Result};
    pub use crate::evaluator::ConditionEvaluator;
    pub use crate::gate::{ElementShell, GateState, PopupLocation, RenderPass, RenderTicket};
    pub use crate::locale::Locale;
    pub use crate::settings::{ComparisonConfig, DynamicValue, ElementSettings, MediaRef};
    pub use crate::tags::{DynamicTagProvider, TagRegistry};
    pub use crate::types::*;
    pub use crate::value::Value;
}
