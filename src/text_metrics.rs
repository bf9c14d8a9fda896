use std::collections::HashMap;
use std::sync::Mutex;

use fontdb::{Database, Family, Query};
use once_cell::sync::Lazy;
use ttf_parser::Face;

static MEASURER: Lazy<Mutex<Measurer>> = Lazy::new(|| Mutex::new(Measurer::new()));

/// Measures the advance width of `text` at `font_size`, in pixels. Returns
/// `None` when no matching font face can be loaded; callers fall back to a
/// character-count heuristic.
pub fn measure_text_width(text: &str, font_size: f32, font_family: &str) -> Option<f32> {
    if text.is_empty() || font_size <= 0.0 {
        return Some(0.0);
    }
    let mut guard = MEASURER.lock().ok()?;
    guard.measure(text, font_size, font_family)
}

struct Measurer {
    db: Database,
    loaded_system_fonts: bool,
    faces: HashMap<String, Option<FaceData>>,
}

struct FaceData {
    data: Vec<u8>,
    index: u32,
    units_per_em: f32,
}

impl Measurer {
    fn new() -> Self {
        Self {
            db: Database::new(),
            loaded_system_fonts: false,
            faces: HashMap::new(),
        }
    }

    fn measure(&mut self, text: &str, font_size: f32, font_family: &str) -> Option<f32> {
        let key = family_key(font_family);
        if !self.faces.contains_key(&key) {
            let face = self.load_face(font_family);
            self.faces.insert(key.clone(), face);
        }
        let face_data = self.faces.get(&key)?.as_ref()?;
        let face = Face::parse(&face_data.data, face_data.index).ok()?;

        let normalized = text.replace('\t', "    ");
        let mut units = 0.0f32;
        for ch in normalized.chars() {
            let advance = face
                .glyph_index(ch)
                .and_then(|glyph| face.glyph_hor_advance(glyph))
                .map(f32::from)
                // missing glyph: assume half an em, close enough for layout
                .unwrap_or(face_data.units_per_em * 0.5);
            units += advance;
        }
        Some(units / face_data.units_per_em * font_size)
    }

    fn load_face(&mut self, font_family: &str) -> Option<FaceData> {
        if !self.loaded_system_fonts {
            self.db.load_system_fonts();
            self.loaded_system_fonts = true;
        }

        let names: Vec<String> = font_family
            .split(',')
            .map(|part| part.trim().trim_matches('"').trim_matches('\'').to_string())
            .filter(|name| !name.is_empty())
            .collect();
        let families: Vec<Family<'_>> = names
            .iter()
            .map(|name| match name.to_ascii_lowercase().as_str() {
                "serif" => Family::Serif,
                "sans-serif" | "system-ui" => Family::SansSerif,
                "monospace" => Family::Monospace,
                "cursive" => Family::Cursive,
                _ => Family::Name(name),
            })
            .chain(std::iter::once(Family::SansSerif))
            .collect();

        let id = self.db.query(&Query {
            families: &families,
            ..Query::default()
        })?;
        self.db.with_face_data(id, |data, index| {
            let face = Face::parse(data, index).ok()?;
            Some(FaceData {
                data: data.to_vec(),
                index,
                units_per_em: f32::from(face.units_per_em()),
            })
        })?
    }
}

fn family_key(font_family: &str) -> String {
    font_family.to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_measures_zero() {
        assert_eq!(measure_text_width("", 13.0, "sans-serif"), Some(0.0));
    }

    #[test]
    fn wider_text_measures_wider() {
        // When no fonts are installed both come back None, which is also fine.
        if let (Some(short), Some(long)) = (
            measure_text_width("ab", 13.0, "sans-serif"),
            measure_text_width("abcdefgh", 13.0, "sans-serif"),
        ) {
            assert!(long > short);
        }
    }
}
