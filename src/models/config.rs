use serde::{Deserialize, Serialize};

/// User configuration from DSAX Settings.yaml
///
/// Everything in here is optional; empty strings mean "use the built-in
/// default". CLI flags always win over the settings file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSettings {
    #[serde(rename = "DSAX_Settings")]
    pub dsax_settings: DsaxSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DsaxSettings {
    /// Path to the folder containing 'DarkSoulsIII.exe'.
    #[serde(rename = "Game Path", default)]
    pub game_path: String,

    /// Path to the output location.
    #[serde(rename = "Output Path", default)]
    pub output_path: String,

    /// Directory holding the external tool executables.
    #[serde(rename = "Tools Path", default)]
    pub tools_path: String,

    #[serde(rename = "Debug Mode", default)]
    pub debug_mode: bool,
}

impl Default for DsaxSettings {
    fn default() -> Self {
        Self {
            game_path: String::new(),
            output_path: String::new(),
            tools_path: String::new(),
            debug_mode: false,
        }
    }
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            dsax_settings: DsaxSettings::default(),
        }
    }
}

impl UserSettings {
    /// Game path from the settings file, if one was set.
    pub fn game_path(&self) -> Option<&str> {
        non_empty(&self.dsax_settings.game_path)
    }

    /// Output path from the settings file, if one was set.
    pub fn output_path(&self) -> Option<&str> {
        non_empty(&self.dsax_settings.output_path)
    }

    /// Tools path from the settings file, if one was set.
    pub fn tools_path(&self) -> Option<&str> {
        non_empty(&self.dsax_settings.tools_path)
    }
}

fn non_empty(value: &str) -> Option<&str> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}
