//! Template context, config-section fallback writer, model-policy mapping,
//! and ambient settings (C-config) for the moai workspace.

pub mod config;
pub mod context;
pub mod error;
pub mod model_policy;
pub mod sections;

pub use config::Config;
pub use context::{
    DevelopmentMode, GitMode, GitProvider, ModelPolicy, Platform, TemplateContext, TemplateContextBuilder,
};
pub use error::Error;
pub use model_policy::model_for;
pub use sections::write_fallback_sections;
