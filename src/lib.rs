pub mod config;
pub mod error;
pub mod loader;
pub mod overrides;
pub mod release;
pub mod render;
pub mod template;

pub use error::{FieldPath, TemplateError};
pub use overrides::{OverlayValue, SetValue};
pub use release::ReleaseSpec;
pub use render::{EnvRenderer, Renderer};
