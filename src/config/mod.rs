//! Configuration module.
//!
//! Provides `AppConfig` (top-level settings), one sub-config per capability
//! provider, `AppPaths` for the platform config directory, and TOML
//! persistence via `AppConfig::load` / `AppConfig::save`.

pub mod paths;
pub mod settings;

pub use paths::AppPaths;
pub use settings::{
    AppConfig, CaptureConfig, InlineConfig, LlmConfig, LlmProvider, SttConfig, SttProvider,
    TtsConfig, TtsProvider,
};
