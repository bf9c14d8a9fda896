use std::collections::HashMap;

use super::types::{
    Axis, Bounds, BoundsData, BoxOptions, ChildOptions, Dimension, HAlign, Point, VAlign,
};

/// Mutable bounds store for one layout pass, keyed by element id.
pub type BoundsMap = HashMap<String, BoundsData>;

/// One child of a container as seen by the layouter. Children that are not
/// layoutable are skipped entirely, both for sizing and placement.
#[derive(Debug, Clone)]
pub struct LayoutChild<'a> {
    pub id: &'a str,
    pub layoutable: bool,
    pub options: ChildOptions,
}

impl<'a> LayoutChild<'a> {
    pub fn new(id: &'a str, options: ChildOptions) -> Self {
        Self {
            id,
            layoutable: true,
            options,
        }
    }
}

/// Resolves absolutely positioned children against a container frame.
///
/// This is the strategy plugged into the flow layouter at its two extension
/// points: fixed-extent accounting during children-size computation, and
/// final placement after the flow pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct AbsoluteResolver;

impl AbsoluteResolver {
    /// Resolves the four relative fields against `frame`. Unset fields
    /// resolve to zero; percentages scale with the frame extent on the
    /// matching axis.
    pub fn child_bounds(&self, options: &ChildOptions, frame: Dimension) -> Bounds {
        Bounds {
            x: options.rel_x.map_or(0.0, |rel| rel.resolve(frame.width)),
            y: options.rel_y.map_or(0.0, |rel| rel.resolve(frame.height)),
            width: options.rel_width.map_or(0.0, |rel| rel.resolve(frame.width)),
            height: options.rel_height.map_or(0.0, |rel| rel.resolve(frame.height)),
        }
    }

    /// An absolute child is fixed on an axis when neither its size nor its
    /// position on that axis is percentage-relative. Only fixed children
    /// may enlarge an auto-sizing container; percentage children are
    /// defined relative to the final container size and must not feed back
    /// into it.
    pub fn axis_fixed(&self, options: &ChildOptions, axis: Axis) -> bool {
        if !options.absolute {
            return false;
        }
        let (size, pos) = axis.rel_pair(options);
        !size.is_some_and(|rel| rel.is_percent()) && !pos.is_some_and(|rel| rel.is_percent())
    }

    /// Final container frame: per axis, `padding_factor` times either the
    /// children size plus padding (auto-sizing, floored by the fixed size)
    /// or the fixed size alone. The result never shrinks below what the
    /// container already resolved to in an earlier pass.
    pub fn container_frame(
        &self,
        current: Dimension,
        options: &BoxOptions,
        children: Dimension,
        fixed: Dimension,
    ) -> Dimension {
        let factor = padding_factor(options);
        let resolve = |axis: Axis| {
            let computed = factor
                * if options.resize_container {
                    axis.main(fixed).max(
                        axis.main(children)
                            + axis.padding_before(options)
                            + axis.padding_after(options),
                    )
                } else {
                    axis.main(fixed).max(0.0)
                };
            axis.main(current).max(computed)
        };
        Dimension::new(resolve(Axis::Horizontal), resolve(Axis::Vertical))
    }
}

fn padding_factor(options: &BoxOptions) -> f32 {
    if options.padding_factor > 0.0 {
        options.padding_factor
    } else {
        1.0
    }
}

/// Box layouter for one container: vertical or horizontal stacking with a
/// per-child absolute opt-out. A single algorithm serves both axes; every
/// main/cross distinction goes through the `Axis` selector.
#[derive(Debug, Clone, Copy)]
pub struct BoxLayouter {
    axis: Axis,
    resolver: AbsoluteResolver,
}

impl BoxLayouter {
    pub fn new(axis: Axis) -> Self {
        Self {
            axis,
            resolver: AbsoluteResolver,
        }
    }

    pub fn vertical() -> Self {
        Self::new(Axis::Vertical)
    }

    pub fn horizontal() -> Self {
        Self::new(Axis::Horizontal)
    }

    pub fn axis(&self) -> Axis {
        self.axis
    }

    /// Lays out `children` inside the container and resolves the container
    /// size itself. Children must already carry their intrinsic sizes in
    /// `bounds`; entries missing or invalid contribute nothing. The only
    /// side effect is mutation of `bounds`; layout never fails.
    pub fn layout(
        &self,
        container_id: &str,
        children: &[LayoutChild<'_>],
        options: &BoxOptions,
        fixed: Dimension,
        bounds: &mut BoundsMap,
    ) {
        let children_size = self.children_size(children, options, bounds);

        let current = bounds.get(container_id).and_then(|data| data.bounds);
        let current_size = current.map(|b| b.size()).unwrap_or(Dimension::ZERO);
        let origin = current.map(|b| b.position()).unwrap_or(Point::ORIGIN);
        let frame = self
            .resolver
            .container_frame(current_size, options, children_size, fixed);
        bounds
            .entry(container_id.to_string())
            .or_default()
            .set(Bounds::new(origin.x, origin.y, frame.width, frame.height));

        self.place_flow(children, options, frame, children_size, bounds);

        // The flow pass may have grown grabbing children, so the absolute
        // frame is resolved against a fresh children size.
        let children_size = self.children_size(children, options, bounds);
        let abs_frame = self
            .resolver
            .container_frame(frame, options, children_size, fixed);
        for child in children {
            if child.layoutable && child.options.absolute {
                let resolved = self.resolver.child_bounds(&child.options, abs_frame);
                bounds.entry(child.id.to_string()).or_default().set(resolved);
            }
        }
    }

    /// Combined extent of the children: flow children stack along the main
    /// axis (with gaps) and max out the cross axis; fixed absolute children
    /// fold their far edge, less the same-axis padding, into a separate
    /// per-axis maximum.
    fn children_size(
        &self,
        children: &[LayoutChild<'_>],
        options: &BoxOptions,
        bounds: &BoundsMap,
    ) -> Dimension {
        let axis = self.axis;
        let mut flow_main = 0.0f32;
        let mut flow_cross = 0.0f32;
        let mut first = true;

        let mut fixed_width = 0.0f32;
        let mut fixed_height = 0.0f32;

        for child in children {
            if !child.layoutable {
                continue;
            }
            if child.options.absolute {
                // Zero reference frame: percentage fields vanish, leaving
                // only the pixel-valued overflow that can grow the container.
                let b = self.resolver.child_bounds(&child.options, Dimension::ZERO);
                if self.resolver.axis_fixed(&child.options, Axis::Vertical) {
                    fixed_height = fixed_height
                        .max(b.y + b.height - options.padding_top - options.padding_bottom);
                }
                if self.resolver.axis_fixed(&child.options, Axis::Horizontal) {
                    fixed_width = fixed_width
                        .max(b.x + b.width - options.padding_left - options.padding_right);
                }
            } else if let Some(size) = stored_size(bounds, child.id) {
                flow_main += axis.main(size);
                if first {
                    first = false;
                } else {
                    flow_main += options.gap;
                }
                flow_cross = flow_cross.max(axis.cross(size));
            }
        }

        let flow = axis.pack_size(flow_main, flow_cross);
        Dimension::new(flow.width.max(fixed_width), flow.height.max(fixed_height))
    }

    fn place_flow(
        &self,
        children: &[LayoutChild<'_>],
        options: &BoxOptions,
        frame: Dimension,
        children_size: Dimension,
        bounds: &mut BoundsMap,
    ) {
        let axis = self.axis;
        let cross_axis = axis.transpose();
        let factor = padding_factor(options);

        let main_extent = axis.main(frame);
        let cross_extent = axis.cross(frame);
        // Padding-scaled inset: centers the 1/factor content band.
        let main_inset = 0.5 * (main_extent - main_extent / factor);
        let cross_inset = 0.5 * (cross_extent - cross_extent / factor);

        let cross_start = cross_axis.padding_before(options) + cross_inset;
        let cross_avail = cross_extent
            - 2.0 * cross_inset
            - cross_axis.padding_before(options)
            - cross_axis.padding_after(options);

        // Leftover main-axis space goes to grabbing flow children in equal
        // shares. Auto-sizing containers leave nothing over, so grabbing
        // only matters under a fixed container size.
        let leftover = main_extent
            - 2.0 * main_inset
            - axis.padding_before(options)
            - axis.padding_after(options)
            - axis.main(children_size);
        let grabbing = children
            .iter()
            .filter(|child| {
                child.layoutable
                    && !child.options.absolute
                    && axis.grabs(&child.options)
                    && stored_size(bounds, child.id).is_some()
            })
            .count();
        let grab_share = if grabbing > 0 && leftover > 0.0 {
            leftover / grabbing as f32
        } else {
            0.0
        };

        let mut offset = axis.padding_before(options) + main_inset;
        for child in children {
            if !child.layoutable || child.options.absolute {
                continue;
            }
            let Some(size) = stored_size(bounds, child.id) else {
                continue;
            };

            let mut main_size = axis.main(size);
            let mut cross_size = axis.cross(size);
            if axis.grabs(&child.options) {
                main_size += grab_share;
            }
            if cross_axis.grabs(&child.options) {
                cross_size = cross_size.max(cross_avail);
            }

            let shift = self.cross_align_factor(&child.options, options) * (cross_avail - cross_size);
            let position = axis.pack_point(offset, cross_start + shift);
            let placed = axis.pack_size(main_size, cross_size);
            bounds.entry(child.id.to_string()).or_default().set(Bounds::new(
                position.x,
                position.y,
                placed.width,
                placed.height,
            ));

            offset += main_size + options.gap;
        }
    }

    fn cross_align_factor(&self, child: &ChildOptions, options: &BoxOptions) -> f32 {
        match self.axis {
            Axis::Vertical => match child.h_align.unwrap_or(options.h_align) {
                HAlign::Left => 0.0,
                HAlign::Center => 0.5,
                HAlign::Right => 1.0,
            },
            Axis::Horizontal => match child.v_align.unwrap_or(options.v_align) {
                VAlign::Top => 0.0,
                VAlign::Center => 0.5,
                VAlign::Bottom => 1.0,
            },
        }
    }
}

fn stored_size(bounds: &BoundsMap, id: &str) -> Option<Dimension> {
    let size = bounds.get(id)?.bounds?.size();
    size.is_valid().then_some(size)
}
