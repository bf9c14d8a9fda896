use crate::config::LayoutConfig;
use crate::text_metrics;
use crate::theme::Theme;

use super::TextBlock;

/// Measures a label into a text block: lines split on `\n`, width from the
/// font metrics (with an average-character-width guard when no font is
/// available), height from the configured line height.
pub(super) fn measure_label(text: &str, theme: &Theme, config: &LayoutConfig) -> TextBlock {
    let lines: Vec<String> = if text.is_empty() {
        vec![String::new()]
    } else {
        text.split('\n').map(str::to_string).collect()
    };

    let font_size = theme.font_size;
    let mut width = 0.0f32;
    for line in &lines {
        let measured = text_metrics::measure_text_width(line, font_size, &theme.font_family)
            .unwrap_or_else(|| fallback_width(line, font_size));
        width = width.max(measured);
    }
    let height = lines.len() as f32 * font_size * config.label_line_height;

    TextBlock {
        lines,
        width,
        height,
    }
}

/// Rough advance estimate used when no system font can be resolved.
fn fallback_width(line: &str, font_size: f32) -> f32 {
    line.chars().count() as f32 * font_size * 0.6
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multiline_labels_stack_line_heights() {
        let theme = Theme::modern();
        let config = LayoutConfig::default();
        let block = measure_label("one\ntwo\nthree", &theme, &config);
        assert_eq!(block.lines.len(), 3);
        assert!(
            (block.height - 3.0 * theme.font_size * config.label_line_height).abs() < 1e-3
        );
        assert!(block.width > 0.0);
    }

    #[test]
    fn empty_label_still_occupies_one_line() {
        let theme = Theme::modern();
        let config = LayoutConfig::default();
        let block = measure_label("", &theme, &config);
        assert_eq!(block.lines.len(), 1);
        assert_eq!(block.width, 0.0);
    }
}
