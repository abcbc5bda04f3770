//! Configuration document entities.
//!
//! The document is JSON with PascalCase field names, one object per group:
//!
//! ```json
//! {
//!   "AudioConfig":    { "BtnClick": "Audio/click", "DialogOpen": "...", "SuccessTip": "..." },
//!   "TextConfig":     { "LoginSuccess": "...", "LoginFail": "...", "NetworkError": "..." },
//!   "ResourceConfig": { "DialogBg": "...", "VideoBg": "..." },
//!   "DialogConfig":   { "Width": 600, "Height": 400, "TitleFontSize": 32, ... }
//! }
//! ```
//!
//! Every group and field is optional.

use serde::{Deserialize, Serialize};

/// The whole configuration document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct GameConfig {
    pub audio_config: Option<AudioConfig>,
    pub text_config: Option<TextConfig>,
    pub resource_config: Option<ResourceConfig>,
    pub dialog_config: Option<DialogConfig>,
}

/// Audio clip paths.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct AudioConfig {
    /// Button click sound
    pub btn_click: Option<String>,
    /// Dialog open sound
    pub dialog_open: Option<String>,
    /// Success notification sound
    pub success_tip: Option<String>,
}

/// Fallback texts that live in configuration rather than the localization
/// table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct TextConfig {
    pub login_success: Option<String>,
    pub login_fail: Option<String>,
    pub network_error: Option<String>,
}

/// Image and video resource paths.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ResourceConfig {
    /// Dialog background image
    pub dialog_bg: Option<String>,
    /// Video background
    pub video_bg: Option<String>,
}

/// Dialog presentation parameters. Absent fields are zero or empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct DialogConfig {
    pub width: i32,
    pub height: i32,
    pub title_font_size: i32,
    pub content_font_size: i32,
    pub confirm_btn_text: String,
    pub cancel_btn_text: String,
}

/// A group whose string fields can be looked up by their document name.
pub trait FieldGroup {
    /// `(document field name, value)` for every field in the group.
    fn fields(&self) -> Vec<(&'static str, Option<&str>)>;
}

impl FieldGroup for AudioConfig {
    fn fields(&self) -> Vec<(&'static str, Option<&str>)> {
        vec![
            ("BtnClick", self.btn_click.as_deref()),
            ("DialogOpen", self.dialog_open.as_deref()),
            ("SuccessTip", self.success_tip.as_deref()),
        ]
    }
}

impl FieldGroup for TextConfig {
    fn fields(&self) -> Vec<(&'static str, Option<&str>)> {
        vec![
            ("LoginSuccess", self.login_success.as_deref()),
            ("LoginFail", self.login_fail.as_deref()),
            ("NetworkError", self.network_error.as_deref()),
        ]
    }
}

impl FieldGroup for ResourceConfig {
    fn fields(&self) -> Vec<(&'static str, Option<&str>)> {
        vec![
            ("DialogBg", self.dialog_bg.as_deref()),
            ("VideoBg", self.video_bg.as_deref()),
        ]
    }
}
