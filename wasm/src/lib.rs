use dyndiag::layout::compute_layout;
use dyndiag::{Config, Language, Model, Theme, render_svg};
use serde::Deserialize;
use wasm_bindgen::prelude::*;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DiagramRenderOptions {
    theme: Option<String>,
    font_family: Option<String>,
    font_size: Option<f32>,
}

fn build_config(options: DiagramRenderOptions) -> Config {
    let mut config = Config::default();
    if options.theme.as_deref() == Some("classic") {
        config.theme = Theme::classic();
    }
    if let Some(font_family) = options.font_family {
        config.theme.font_family = font_family;
    }
    if let Some(font_size) = options.font_size {
        config.theme.font_size = font_size;
    }
    config
}

#[wasm_bindgen]
pub fn render_diagram_svg(
    model_json: &str,
    language_json: &str,
    options_json: Option<String>,
) -> Result<String, JsValue> {
    let options = if let Some(raw_options) = options_json {
        serde_json::from_str::<DiagramRenderOptions>(&raw_options)
            .map_err(|error| JsValue::from_str(&error.to_string()))?
    } else {
        DiagramRenderOptions::default()
    };
    let config = build_config(options);

    let language =
        Language::parse(language_json).map_err(|error| JsValue::from_str(&error.to_string()))?;
    let model = Model::parse(model_json).map_err(|error| JsValue::from_str(&error.to_string()))?;
    model
        .validate(&language)
        .map_err(|error| JsValue::from_str(&error.to_string()))?;

    let layout = compute_layout(&model, &language, &config.theme, &config.layout)
        .map_err(|error| JsValue::from_str(&error.to_string()))?;
    Ok(render_svg(&layout, &config.theme))
}

#[cfg(test)]
mod tests {
    use crate::{DiagramRenderOptions, build_config};

    #[test]
    fn classic_theme_is_selected_by_name() {
        let config = build_config(DiagramRenderOptions {
            theme: Some("classic".to_string()),
            ..DiagramRenderOptions::default()
        });
        assert_eq!(config.theme.font_size, 16.0);
    }

    #[test]
    fn font_overrides_apply_on_top_of_theme() {
        let config = build_config(DiagramRenderOptions {
            font_family: Some("monospace".to_string()),
            font_size: Some(11.0),
            ..DiagramRenderOptions::default()
        });
        assert_eq!(config.theme.font_family, "monospace");
        assert_eq!(config.theme.font_size, 11.0);
    }
}
