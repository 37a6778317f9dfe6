use macroquad::math::{vec2, Vec2};

/// Top-left scroll offset that keeps `focus` centred without showing
/// anything outside the map.
///
/// The offset is subtracted from every draw position for the frame. On an
/// axis where the map is smaller than the viewport the map is pinned to the
/// top/left edge (offset 0).
pub fn compute_camera(viewport: Vec2, map_size: Vec2, focus: Vec2) -> Vec2 {
    vec2(
        clamp_axis(viewport.x, map_size.x, focus.x),
        clamp_axis(viewport.y, map_size.y, focus.y),
    )
}

fn clamp_axis(viewport: f32, map: f32, focus: f32) -> f32 {
    let raw = (focus - viewport / 2.0).max(0.0);
    raw.min(map - viewport).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centred_focus_keeps_viewport_inside_map() {
        let viewport = vec2(320.0, 240.0);
        let map = vec2(640.0, 480.0);
        let off = compute_camera(viewport, map, map / 2.0);
        assert_eq!(off, vec2(160.0, 120.0));
        assert!(off.x >= 0.0 && off.x + viewport.x <= map.x);
        assert!(off.y >= 0.0 && off.y + viewport.y <= map.y);
    }

    #[test]
    fn clamps_at_every_edge() {
        let viewport = vec2(320.0, 240.0);
        let map = vec2(640.0, 480.0);
        assert_eq!(compute_camera(viewport, map, vec2(10.0, 10.0)), Vec2::ZERO);
        assert_eq!(compute_camera(viewport, map, vec2(630.0, 470.0)), vec2(320.0, 240.0));
        assert_eq!(compute_camera(viewport, map, vec2(-50.0, 900.0)), vec2(0.0, 240.0));
    }

    #[test]
    fn map_smaller_than_viewport_is_pinned_to_origin() {
        let viewport = vec2(320.0, 240.0);
        let map = vec2(160.0, 480.0);
        for fx in [0.0, 80.0, 160.0, 1000.0] {
            let off = compute_camera(viewport, map, vec2(fx, 300.0));
            assert_eq!(off.x, 0.0);
            assert_eq!(off.y, 180.0);
        }
    }
}
