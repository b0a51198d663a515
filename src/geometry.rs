//! Rectangle math shared by the editor and the renderer.
//!
//! Rectangles are stored as origin + signed extents while a gesture is in
//! flight; [`normalize`] folds them back into the non-negative form that is
//! persisted.

use egui::{Pos2, Vec2};
use serde::{Deserialize, Serialize};

/// Default pick radius (in pixels, per axis) for corner handles.
pub const HANDLE_TOLERANCE: f32 = 8.0;

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Zero-sized rectangle anchored at `origin`, the start of a draw gesture.
    pub fn at(origin: Pos2) -> Self {
        Self::new(origin.x, origin.y, 0.0, 0.0)
    }

    pub fn area(&self) -> f32 {
        self.width * self.height
    }

    pub fn is_normalized(&self) -> bool {
        self.width >= 0.0 && self.height >= 0.0
    }

    pub fn corner(&self, handle: Handle) -> Pos2 {
        match handle {
            Handle::Nw => egui::pos2(self.x, self.y),
            Handle::Ne => egui::pos2(self.x + self.width, self.y),
            Handle::Sw => egui::pos2(self.x, self.y + self.height),
            Handle::Se => egui::pos2(self.x + self.width, self.y + self.height),
        }
    }

    pub fn to_egui(self, origin: Pos2) -> egui::Rect {
        let r = normalize(self);
        egui::Rect::from_min_size(
            origin + egui::vec2(r.x, r.y),
            egui::vec2(r.width, r.height),
        )
    }
}

/// One of the four corner grab points of a selected rectangle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Handle {
    Nw,
    Ne,
    Sw,
    Se,
}

impl Handle {
    /// Priority order used when several corners are within reach.
    pub const ALL: [Handle; 4] = [Handle::Nw, Handle::Ne, Handle::Sw, Handle::Se];
}

/// Anything that occupies a rectangle on the canvas.
pub trait Bounded {
    fn bounds(&self) -> Rect;
}

impl Bounded for Rect {
    fn bounds(&self) -> Rect {
        *self
    }
}

/// Fold negative extents (a drag that went up or left) into the origin.
pub fn normalize(rect: Rect) -> Rect {
    Rect {
        x: rect.x.min(rect.x + rect.width),
        y: rect.y.min(rect.y + rect.height),
        width: rect.width.abs(),
        height: rect.height.abs(),
    }
}

/// Inclusive on every edge.
pub fn contains_point(rect: Rect, point: Pos2) -> bool {
    point.x >= rect.x
        && point.x <= rect.x + rect.width
        && point.y >= rect.y
        && point.y <= rect.y + rect.height
}

pub fn corner_handle_at(point: Pos2, rect: Rect, tolerance: f32) -> Option<Handle> {
    Handle::ALL.into_iter().find(|&handle| {
        let corner = rect.corner(handle);
        (point.x - corner.x).abs() <= tolerance && (point.y - corner.y).abs() <= tolerance
    })
}

/// Drag one corner of `original` by `delta`, keeping the opposite corner fixed.
///
/// Pulling a corner past its opposite flips the rectangle; the result is
/// always normalized.
pub fn resize(original: Rect, handle: Handle, delta: Vec2) -> Rect {
    let mut r = original;
    match handle {
        Handle::Nw => {
            r.x += delta.x;
            r.y += delta.y;
            r.width -= delta.x;
            r.height -= delta.y;
        }
        Handle::Ne => {
            r.y += delta.y;
            r.width += delta.x;
            r.height -= delta.y;
        }
        Handle::Sw => {
            r.x += delta.x;
            r.width -= delta.x;
            r.height += delta.y;
        }
        Handle::Se => {
            r.width += delta.x;
            r.height += delta.y;
        }
    }
    if r.is_normalized() {
        r
    } else {
        normalize(r)
    }
}

pub fn translate(original: Rect, delta: Vec2) -> Rect {
    Rect {
        x: original.x + delta.x,
        y: original.y + delta.y,
        ..original
    }
}

/// Smallest item by area; the first one wins an exact tie.
pub fn smallest_by_area<'a, T, I>(items: I) -> Option<&'a T>
where
    T: Bounded + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let mut best: Option<(&'a T, f32)> = None;
    for item in items {
        let area = item.bounds().area();
        match best {
            Some((_, best_area)) if area >= best_area => {}
            _ => best = Some((item, area)),
        }
    }
    best.map(|(item, _)| item)
}

/// Resolve a click to the innermost item containing `point`.
pub fn hit_test<'a, T: Bounded>(items: &'a [T], point: Pos2) -> Option<&'a T> {
    smallest_by_area(items.iter().filter(|item| contains_point(item.bounds(), point)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signed_rects() -> Vec<Rect> {
        vec![
            Rect::new(10.0, 10.0, 50.0, 20.0),
            Rect::new(10.0, 10.0, -50.0, 20.0),
            Rect::new(10.0, 10.0, 50.0, -20.0),
            Rect::new(-5.0, 3.0, -0.5, -7.25),
            Rect::new(0.0, 0.0, 0.0, 0.0),
        ]
    }

    #[test]
    fn normalize_flips_negative_extents() {
        let r = normalize(Rect::new(110.0, 80.0, -100.0, -70.0));
        assert_eq!(r, Rect::new(10.0, 10.0, 100.0, 70.0));
    }

    #[test]
    fn normalize_is_idempotent_and_non_negative() {
        for r in signed_rects() {
            let once = normalize(r);
            assert!(once.width >= 0.0 && once.height >= 0.0);
            assert_eq!(normalize(once), once);
        }
    }

    #[test]
    fn contains_point_includes_edges() {
        let r = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(contains_point(r, egui::pos2(0.0, 0.0)));
        assert!(contains_point(r, egui::pos2(10.0, 10.0)));
        assert!(contains_point(r, egui::pos2(5.0, 10.0)));
        assert!(!contains_point(r, egui::pos2(10.1, 5.0)));
        assert!(!contains_point(r, egui::pos2(5.0, -0.1)));
    }

    #[test]
    fn each_corner_resolves_to_its_own_handle() {
        let rects = [
            Rect::new(20.0, 30.0, 100.0, 60.0),
            Rect::new(0.0, 0.0, 40.0, 40.0),
            Rect::new(5.0, 5.0, 17.0, 17.0),
        ];
        for r in rects {
            for tol in [0.0, 4.0, HANDLE_TOLERANCE] {
                for handle in Handle::ALL {
                    assert_eq!(corner_handle_at(r.corner(handle), r, tol), Some(handle));
                }
            }
        }
    }

    #[test]
    fn corner_handle_uses_per_axis_tolerance() {
        let r = Rect::new(100.0, 100.0, 50.0, 50.0);
        assert_eq!(
            corner_handle_at(egui::pos2(107.0, 93.0), r, 8.0),
            Some(Handle::Nw)
        );
        assert_eq!(corner_handle_at(egui::pos2(109.0, 100.0), r, 8.0), None);
        assert_eq!(corner_handle_at(egui::pos2(125.0, 125.0), r, 8.0), None);
    }

    #[test]
    fn tiny_rect_prefers_nw() {
        let r = Rect::new(0.0, 0.0, 4.0, 4.0);
        assert_eq!(corner_handle_at(egui::pos2(2.0, 2.0), r, 8.0), Some(Handle::Nw));
    }

    #[test]
    fn resize_se_keeps_nw_fixed() {
        let r = Rect::new(10.0, 20.0, 30.0, 40.0);
        let out = resize(r, Handle::Se, egui::vec2(20.0, 15.0));
        assert_eq!(out.corner(Handle::Nw), r.corner(Handle::Nw));
        assert_eq!(out, Rect::new(10.0, 20.0, 50.0, 55.0));
    }

    #[test]
    fn resize_nw_keeps_se_fixed() {
        let r = Rect::new(10.0, 20.0, 30.0, 40.0);
        let out = resize(r, Handle::Nw, egui::vec2(5.0, -10.0));
        assert_eq!(out.corner(Handle::Se), r.corner(Handle::Se));
        assert_eq!(out, Rect::new(15.0, 10.0, 25.0, 50.0));
    }

    #[test]
    fn resize_ne_and_sw_move_the_right_edges() {
        let r = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert_eq!(
            resize(r, Handle::Ne, egui::vec2(5.0, 2.0)),
            Rect::new(0.0, 2.0, 15.0, 8.0)
        );
        assert_eq!(
            resize(r, Handle::Sw, egui::vec2(2.0, 5.0)),
            Rect::new(2.0, 0.0, 8.0, 15.0)
        );
    }

    #[test]
    fn resize_past_opposite_corner_flips() {
        let r = Rect::new(10.0, 10.0, 20.0, 20.0);
        let out = resize(r, Handle::Se, egui::vec2(-30.0, -25.0));
        assert_eq!(out, Rect::new(0.0, 5.0, 10.0, 5.0));
        assert!(out.is_normalized());
    }

    #[test]
    fn translate_keeps_size() {
        let r = Rect::new(1.0, 2.0, 3.0, 4.0);
        assert_eq!(
            translate(r, egui::vec2(10.0, -2.0)),
            Rect::new(11.0, 0.0, 3.0, 4.0)
        );
    }

    #[test]
    fn smallest_by_area_picks_nested_rect() {
        let rects = [
            Rect::new(0.0, 0.0, 100.0, 100.0),
            Rect::new(20.0, 20.0, 10.0, 10.0),
        ];
        assert_eq!(smallest_by_area(rects.iter()), Some(&rects[1]));
    }

    #[test]
    fn smallest_by_area_is_stable_on_ties() {
        let rects = [
            Rect::new(0.0, 0.0, 10.0, 20.0),
            Rect::new(50.0, 50.0, 20.0, 10.0),
        ];
        let best = smallest_by_area(rects.iter()).unwrap();
        assert!(std::ptr::eq(best, &rects[0]));
        assert_eq!(smallest_by_area::<Rect, _>(std::iter::empty()), None);
    }

    #[test]
    fn hit_test_ignores_rects_not_under_point() {
        let rects = [
            Rect::new(0.0, 0.0, 100.0, 100.0),
            Rect::new(200.0, 200.0, 5.0, 5.0),
        ];
        assert_eq!(hit_test(&rects, egui::pos2(50.0, 50.0)), Some(&rects[0]));
        assert_eq!(hit_test(&rects, egui::pos2(150.0, 150.0)), None);
    }
}
