use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::theme::Theme;

/// Layout knobs that apply when a shape's own options leave them unset,
/// plus canvas-level spacing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub padding: f32,
    pub gap: f32,
    pub padding_factor: f32,
    pub label_line_height: f32,
    pub label_padding: f32,
    pub leaf_size: f32,
    pub canvas_padding: f32,
    pub grid_gap_x: f32,
    pub grid_gap_y: f32,
    pub grid_columns: Option<usize>,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            padding: 5.0,
            gap: 1.0,
            padding_factor: 1.0,
            label_line_height: 1.25,
            label_padding: 4.0,
            leaf_size: 10.0,
            canvas_padding: 8.0,
            grid_gap_x: 40.0,
            grid_gap_y: 40.0,
            grid_columns: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    pub width: f32,
    pub height: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 800.0,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    pub theme: Theme,
    pub layout: LayoutConfig,
    pub render: RenderConfig,
}

/// On-disk config format: a theme name plus optional overrides.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct ConfigFile {
    theme: Option<String>,
    theme_variables: Option<ThemeVariables>,
    layout: Option<LayoutOverrides>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct ThemeVariables {
    font_family: Option<String>,
    font_size: Option<f32>,
    node_fill: Option<String>,
    node_border: Option<String>,
    text_color: Option<String>,
    line_color: Option<String>,
    background: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct LayoutOverrides {
    padding: Option<f32>,
    gap: Option<f32>,
    padding_factor: Option<f32>,
    label_line_height: Option<f32>,
    canvas_padding: Option<f32>,
    grid_columns: Option<usize>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let mut config = Config::default();
    let Some(path) = path else {
        return Ok(config);
    };

    let contents = std::fs::read_to_string(path)?;
    let parsed: ConfigFile = serde_json::from_str(&contents)?;

    if let Some(theme_name) = parsed.theme.as_deref() {
        if theme_name == "classic" || theme_name == "default" {
            config.theme = Theme::classic();
        } else if theme_name == "modern" {
            config.theme = Theme::modern();
        }
    }

    if let Some(vars) = parsed.theme_variables {
        if let Some(v) = vars.font_family {
            config.theme.font_family = v;
        }
        if let Some(v) = vars.font_size {
            config.theme.font_size = v;
        }
        if let Some(v) = vars.node_fill {
            config.theme.node_fill = v;
        }
        if let Some(v) = vars.node_border {
            config.theme.node_border = v;
        }
        if let Some(v) = vars.text_color {
            config.theme.text_color = v;
        }
        if let Some(v) = vars.line_color {
            config.theme.line_color = v;
        }
        if let Some(v) = vars.background {
            config.theme.background = v;
        }
    }

    if let Some(layout) = parsed.layout {
        if let Some(v) = layout.padding {
            config.layout.padding = v;
        }
        if let Some(v) = layout.gap {
            config.layout.gap = v;
        }
        if let Some(v) = layout.padding_factor {
            config.layout.padding_factor = v;
        }
        if let Some(v) = layout.label_line_height {
            config.layout.label_line_height = v;
        }
        if let Some(v) = layout.canvas_padding {
            config.layout.canvas_padding = v;
        }
        if layout.grid_columns.is_some() {
            config.layout.grid_columns = layout.grid_columns;
        }
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_path_yields_defaults() {
        let config = load_config(None).unwrap();
        assert_eq!(config.layout.padding, 5.0);
        assert_eq!(config.render.width, 1200.0);
    }
}
