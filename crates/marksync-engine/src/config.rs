use marksync_config::Config;

/// Settings an editor session runs with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorConfig {
    pub default_font_size: u32,
    pub font_sizes: Vec<u32>,
    pub history_depth: usize,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for EditorConfig {
    fn from(config: &Config) -> Self {
        Self {
            default_font_size: config.default_font_size,
            font_sizes: config.font_sizes.clone(),
            history_depth: config.history_depth,
        }
    }
}
