use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Dimension {
    pub width: f32,
    pub height: f32,
}

impl Dimension {
    pub const ZERO: Dimension = Dimension {
        width: 0.0,
        height: 0.0,
    };

    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// A dimension is usable for layout when both components are finite
    /// and non-negative. Unmeasured children fail this check and are
    /// skipped as zero contributions.
    pub fn is_valid(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width >= 0.0 && self.height >= 0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Bounds {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub const EMPTY: Bounds = Bounds {
        x: 0.0,
        y: 0.0,
        width: 0.0,
        height: 0.0,
    };

    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn size(&self) -> Dimension {
        Dimension::new(self.width, self.height)
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// Per-element record written during one layout pass. `bounds_changed`
/// flips only when a write actually changes the stored value, so a second
/// pass over unchanged inputs reports no changes.
#[derive(Debug, Clone, Default)]
pub struct BoundsData {
    pub bounds: Option<Bounds>,
    pub bounds_changed: bool,
}

impl BoundsData {
    pub fn measured(size: Dimension) -> Self {
        Self {
            bounds: Some(Bounds::new(0.0, 0.0, size.width, size.height)),
            bounds_changed: false,
        }
    }

    pub fn set(&mut self, bounds: Bounds) {
        if self.bounds != Some(bounds) {
            self.bounds = Some(bounds);
            self.bounds_changed = true;
        }
    }
}

/// A relative-position value, tagged at the deserialization boundary so
/// the layout pass never re-parses strings. Percentages resolve against
/// the container extent on the matching axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Rel {
    Px(f32),
    Percent(f32),
}

impl Rel {
    /// Parses the wire form: `"40%"` is a percentage, `"40"` or a bare
    /// number is pixels. Unparseable input collapses to zero pixels; the
    /// layout pass must never fail on malformed options.
    pub fn parse(raw: &str) -> Rel {
        let trimmed = raw.trim();
        if let Some(stripped) = trimmed.strip_suffix('%') {
            Rel::Percent(stripped.trim().parse::<f32>().unwrap_or(0.0))
        } else {
            Rel::Px(trimmed.parse::<f32>().unwrap_or(0.0))
        }
    }

    pub fn from_json(value: &serde_json::Value) -> Option<Rel> {
        match value {
            serde_json::Value::Number(n) => Some(Rel::Px(n.as_f64().unwrap_or(0.0) as f32)),
            serde_json::Value::String(s) => Some(Rel::parse(s)),
            _ => None,
        }
    }

    pub fn is_percent(&self) -> bool {
        matches!(self, Rel::Percent(_))
    }

    pub fn resolve(&self, extent: f32) -> f32 {
        match *self {
            Rel::Px(px) => px,
            Rel::Percent(pct) => extent * pct / 100.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HAlign {
    Left,
    #[default]
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VAlign {
    Top,
    #[default]
    Center,
    Bottom,
}

/// Container-side layout options of a vbox/hbox.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxOptions {
    pub padding_top: f32,
    pub padding_right: f32,
    pub padding_bottom: f32,
    pub padding_left: f32,
    pub padding_factor: f32,
    pub gap: f32,
    pub resize_container: bool,
    pub h_align: HAlign,
    pub v_align: VAlign,
    pub pref_width: Option<f32>,
    pub pref_height: Option<f32>,
    pub min_width: f32,
    pub min_height: f32,
}

impl Default for BoxOptions {
    fn default() -> Self {
        Self {
            padding_top: 5.0,
            padding_right: 5.0,
            padding_bottom: 5.0,
            padding_left: 5.0,
            padding_factor: 1.0,
            gap: 1.0,
            resize_container: true,
            h_align: HAlign::Center,
            v_align: VAlign::Center,
            pref_width: None,
            pref_height: None,
            min_width: 0.0,
            min_height: 0.0,
        }
    }
}

impl BoxOptions {
    /// The externally configured fixed size: preferred size clamped by the
    /// minimum, or just the minimum when no preference is given.
    pub fn fixed_size(&self) -> Dimension {
        Dimension::new(
            self.pref_width.unwrap_or(0.0).max(self.min_width),
            self.pref_height.unwrap_or(0.0).max(self.min_height),
        )
    }
}

/// Child-side layout options: the flow/absolute opt-out and the four
/// relative-position fields of absolute children.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChildOptions {
    pub absolute: bool,
    pub rel_width: Option<Rel>,
    pub rel_height: Option<Rel>,
    pub rel_x: Option<Rel>,
    pub rel_y: Option<Rel>,
    pub h_align: Option<HAlign>,
    pub v_align: Option<VAlign>,
    pub h_grab: bool,
    pub v_grab: bool,
}

/// Stacking-axis selector. The vertical and horizontal box layouts are one
/// algorithm with main/cross roles swapped; every axis-dependent access
/// goes through here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Vertical,
    Horizontal,
}

impl Axis {
    pub fn transpose(self) -> Axis {
        match self {
            Axis::Vertical => Axis::Horizontal,
            Axis::Horizontal => Axis::Vertical,
        }
    }

    /// Extent along the stacking axis.
    pub fn main(self, size: Dimension) -> f32 {
        match self {
            Axis::Vertical => size.height,
            Axis::Horizontal => size.width,
        }
    }

    /// Extent along the cross axis.
    pub fn cross(self, size: Dimension) -> f32 {
        match self {
            Axis::Vertical => size.width,
            Axis::Horizontal => size.height,
        }
    }

    pub fn main_pos(self, point: Point) -> f32 {
        match self {
            Axis::Vertical => point.y,
            Axis::Horizontal => point.x,
        }
    }

    pub fn cross_pos(self, point: Point) -> f32 {
        match self {
            Axis::Vertical => point.x,
            Axis::Horizontal => point.y,
        }
    }

    pub fn pack_point(self, main: f32, cross: f32) -> Point {
        match self {
            Axis::Vertical => Point::new(cross, main),
            Axis::Horizontal => Point::new(main, cross),
        }
    }

    pub fn pack_size(self, main: f32, cross: f32) -> Dimension {
        match self {
            Axis::Vertical => Dimension::new(cross, main),
            Axis::Horizontal => Dimension::new(main, cross),
        }
    }

    /// Padding before the first child on the stacking axis.
    pub fn padding_before(self, options: &BoxOptions) -> f32 {
        match self {
            Axis::Vertical => options.padding_top,
            Axis::Horizontal => options.padding_left,
        }
    }

    pub fn padding_after(self, options: &BoxOptions) -> f32 {
        match self {
            Axis::Vertical => options.padding_bottom,
            Axis::Horizontal => options.padding_right,
        }
    }

    /// Whether the child grabs leftover space on this axis.
    pub fn grabs(self, options: &ChildOptions) -> bool {
        match self {
            Axis::Vertical => options.v_grab,
            Axis::Horizontal => options.h_grab,
        }
    }

    /// The relative size/position pair governing this axis of an absolute
    /// child: height/y for vertical, width/x for horizontal.
    pub fn rel_pair(self, options: &ChildOptions) -> (Option<Rel>, Option<Rel>) {
        match self {
            Axis::Vertical => (options.rel_height, options.rel_y),
            Axis::Horizontal => (options.rel_width, options.rel_x),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rel_parses_percent_and_pixels() {
        assert_eq!(Rel::parse("40%"), Rel::Percent(40.0));
        assert_eq!(Rel::parse("12.5"), Rel::Px(12.5));
        assert_eq!(Rel::parse(" 30 % "), Rel::Percent(30.0));
        assert_eq!(Rel::parse("garbage"), Rel::Px(0.0));
        assert_eq!(Rel::parse("bad%"), Rel::Percent(0.0));
    }

    #[test]
    fn rel_resolves_against_extent() {
        assert_eq!(Rel::Percent(50.0).resolve(200.0), 100.0);
        assert_eq!(Rel::Px(42.0).resolve(200.0), 42.0);
        assert_eq!(Rel::Percent(0.0).resolve(200.0), 0.0);
    }

    #[test]
    fn rel_from_json_accepts_numbers_and_strings() {
        assert_eq!(Rel::from_json(&serde_json::json!(40)), Some(Rel::Px(40.0)));
        assert_eq!(
            Rel::from_json(&serde_json::json!("40%")),
            Some(Rel::Percent(40.0))
        );
        assert_eq!(Rel::from_json(&serde_json::json!(null)), None);
    }

    #[test]
    fn bounds_data_tracks_changes() {
        let mut data = BoundsData::default();
        data.set(Bounds::new(1.0, 2.0, 3.0, 4.0));
        assert!(data.bounds_changed);

        data.bounds_changed = false;
        data.set(Bounds::new(1.0, 2.0, 3.0, 4.0));
        assert!(!data.bounds_changed);
    }

    #[test]
    fn axis_packs_and_unpacks() {
        let size = Dimension::new(10.0, 20.0);
        assert_eq!(Axis::Vertical.main(size), 20.0);
        assert_eq!(Axis::Vertical.cross(size), 10.0);
        assert_eq!(Axis::Horizontal.main(size), 10.0);
        assert_eq!(Axis::Vertical.pack_size(20.0, 10.0), size);
        assert_eq!(Axis::Horizontal.pack_size(10.0, 20.0), size);
        assert_eq!(Axis::Vertical.pack_point(5.0, 3.0), Point::new(3.0, 5.0));
    }

    #[test]
    fn invalid_dimensions_are_rejected() {
        assert!(!Dimension::new(-1.0, 5.0).is_valid());
        assert!(!Dimension::new(f32::NAN, 5.0).is_valid());
        assert!(Dimension::ZERO.is_valid());
    }
}
