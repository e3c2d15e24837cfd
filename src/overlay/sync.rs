//! Per-frame viewport synchronization.
//!
//! Each frame the host map reports its view extent. The synchronizer turns it
//! into a viewBox on the root `<svg>` so the overlay tracks the map, then
//! checks whether the movable container has to jump one world-width to keep
//! copies under the view while the map pans without end.

use glam::DVec2;

use super::session::OverlaySession;
use crate::error::OverlayError;
use crate::geo::{Crs, Extent, ExtentTransform, OverlayProjection, SphericalMercator};
use crate::scene::{ElementId, Scene, SceneError, ViewBox};

/// What the host map supplies for one rendered frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameState {
    /// View extent in the host's CRS.
    pub extent: Extent,
    /// Size of the map viewport in CSS pixels.
    pub pixel_size: DVec2,
}

impl FrameState {
    pub fn new(extent: [f64; 4], pixel_size: [f64; 2]) -> Self {
        Self {
            extent: Extent::from_array(extent),
            pixel_size: DVec2::from_array(pixel_size),
        }
    }
}

/// Direction the container jumped on a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WrapShift {
    #[default]
    None,
    East,
    West,
}

impl WrapShift {
    /// Signed container offset for this shift.
    pub fn offset(self, world_width: f64) -> f64 {
        match self {
            WrapShift::None => 0.0,
            WrapShift::East => world_width,
            WrapShift::West => -world_width,
        }
    }

    /// Signed change in whole world-widths.
    pub fn step(self) -> i64 {
        match self {
            WrapShift::None => 0,
            WrapShift::East => 1,
            WrapShift::West => -1,
        }
    }
}

/// Decides the wrap for one frame.
///
/// `view_min_x` and `inner_x` must share one origin; the synchronizer passes
/// the viewBox minimum and the container x, both in root coordinates.
/// East is checked first. Both comparisons are strict, so a view sitting
/// exactly on either threshold stays put. A non-positive `inner_width`
/// never wraps.
pub fn wrap_shift(view_min_x: f64, inner_x: f64, inner_width: f64) -> WrapShift {
    if !(inner_width.is_finite() && inner_width > 0.0) {
        return WrapShift::None;
    }

    if view_min_x > inner_x {
        WrapShift::East
    } else if view_min_x < inner_x - inner_width / 2.0 {
        WrapShift::West
    } else {
        WrapShift::None
    }
}

/// Maps a geographic extent (degrees) to a root viewBox.
///
/// Width keeps its sign; height is always non-negative because the vertical
/// axes of map and overlay point in opposite directions.
pub fn compute_viewbox(geo_extent: &Extent, projection: &OverlayProjection, anchor: DVec2) -> ViewBox {
    let min_x = projection.lon_to_x(geo_extent.min_x) + anchor.x;
    let min_y = projection.lat_to_y(geo_extent.min_y) + anchor.y;
    let max_x = projection.lon_to_x(geo_extent.max_x) + anchor.x;
    let max_y = projection.lat_to_y(geo_extent.max_y) + anchor.y;

    ViewBox::new(min_x, max_y, max_x - min_x, (max_y - min_y).abs())
}

/// Result of synchronizing one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameOutcome {
    pub viewbox: ViewBox,
    pub shift: WrapShift,
}

/// Keeps one overlay session in step with the host map, frame by frame.
pub struct ViewportSynchronizer<S, T = SphericalMercator> {
    session: OverlaySession<S>,
    transform: T,
}

impl<S: Scene> ViewportSynchronizer<S> {
    pub fn new(session: OverlaySession<S>) -> Self {
        Self::with_transform(session, SphericalMercator)
    }
}

impl<S: Scene, T: ExtentTransform> ViewportSynchronizer<S, T> {
    pub fn with_transform(session: OverlaySession<S>, transform: T) -> Self {
        Self { session, transform }
    }

    pub fn session(&self) -> &OverlaySession<S> {
        &self.session
    }

    /// Render callback body: syncs the frame and returns the host element.
    pub fn render(&mut self, frame: &FrameState) -> Result<ElementId, OverlayError> {
        self.sync_frame(frame)?;
        Ok(self.session.handles.element)
    }

    /// Resizes the host element, applies the viewBox and corrects the wrap.
    pub fn sync_frame(&mut self, frame: &FrameState) -> Result<FrameOutcome, OverlayError> {
        let session = &self.session;
        session
            .scene
            .set_pixel_size(session.handles.element, frame.pixel_size)?;

        let geo_extent =
            self.transform
                .transform_extent(frame.extent, session.source_crs, Crs::Geographic);
        let mut viewbox = compute_viewbox(&geo_extent, &session.projection, session.layout.anchor);

        if frame.pixel_size.x <= 0.0 || frame.pixel_size.y <= 0.0 || frame.extent.is_empty() {
            log::trace!(
                "Degenerate frame {:?} at {:?}; collapsing viewBox",
                frame.extent,
                frame.pixel_size
            );
            viewbox.width = 0.0;
            viewbox.height = 0.0;
        }

        session.scene.set_viewbox(session.handles.root, viewbox)?;

        let shift = self.correct_wrap(viewbox.min_x)?;
        Ok(FrameOutcome { viewbox, shift })
    }

    /// Jumps the container by one world-width when the view left its range.
    fn correct_wrap(&mut self, view_min_x: f64) -> Result<WrapShift, SceneError> {
        let inner_width = self.session.inner_width()?;
        let from = self.session.container_x();

        let shift = wrap_shift(view_min_x, from, inner_width);
        if shift != WrapShift::None {
            self.session.shift_wraps(shift.step())?;
            log::debug!(
                "Overlay wrapped {:?}: container x {} -> {}",
                shift,
                from,
                self.session.container_x()
            );
        }

        Ok(shift)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OverlayConfig;
    use crate::geo::{LatitudeScale, HALF_WORLD_METERS};
    use crate::overlay::compose;
    use crate::scene::MemoryScene;

    const ANCHOR_X: f64 = 600.0;
    const WORLD: f64 = 1800.0;

    /// 1200x900 surface: 5 px/degree, anchor (600, 450), world 1800 px.
    fn synchronizer() -> (MemoryScene, ViewportSynchronizer<MemoryScene>) {
        let (scene, surface) = MemoryScene::with_surface(DVec2::new(1200.0, 900.0));
        let config = OverlayConfig {
            latitude_scale: LatitudeScale::Linear,
            source_crs: Crs::Geographic,
            ..OverlayConfig::default()
        };
        let session = compose(scene.clone(), surface, &config).unwrap();
        (scene, ViewportSynchronizer::new(session))
    }

    fn frame(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> FrameState {
        FrameState::new([min_lon, min_lat, max_lon, max_lat], [1200.0, 900.0])
    }

    fn inner_x(sync: &ViewportSynchronizer<MemoryScene>) -> f64 {
        sync.session().inner_x()
    }

    #[test]
    fn test_wrap_shift_scenario() {
        // World 1000, container 2000 wide at 0.
        assert_eq!(wrap_shift(1050.0, 0.0, 2000.0), WrapShift::East);
        let inner_x = 0.0 + WrapShift::East.offset(1000.0);
        assert_eq!(inner_x, 1000.0);

        // Still past the new threshold: wraps again on the next frame.
        assert_eq!(wrap_shift(1050.0, inner_x, 2000.0), WrapShift::East);
        assert_eq!(wrap_shift(950.0, inner_x, 2000.0), WrapShift::None);
    }

    #[test]
    fn test_wrap_shift_boundaries() {
        assert_eq!(wrap_shift(0.0, 0.0, 2000.0), WrapShift::None);
        assert_eq!(wrap_shift(1e-9, 0.0, 2000.0), WrapShift::East);
        assert_eq!(wrap_shift(-1000.0, 0.0, 2000.0), WrapShift::None);
        assert_eq!(wrap_shift(-1000.000_001, 0.0, 2000.0), WrapShift::West);
    }

    #[test]
    fn test_wrap_shift_degenerate_width() {
        assert_eq!(wrap_shift(50.0, 0.0, 0.0), WrapShift::None);
        assert_eq!(wrap_shift(-50.0, 0.0, -10.0), WrapShift::None);
        assert_eq!(wrap_shift(50.0, 0.0, f64::NAN), WrapShift::None);
    }

    #[test]
    fn test_shift_offsets() {
        assert_eq!(WrapShift::None.offset(1000.0), 0.0);
        assert_eq!(WrapShift::East.offset(1000.0), 1000.0);
        assert_eq!(WrapShift::West.offset(1000.0), -1000.0);
        assert_eq!(WrapShift::None.step(), 0);
        assert_eq!(WrapShift::East.step(), 1);
        assert_eq!(WrapShift::West.step(), -1);
    }

    #[test]
    fn test_centered_frame_sets_viewbox_without_wrap() {
        let (scene, mut sync) = synchronizer();
        let outcome = sync.sync_frame(&frame(-120.0, -45.0, 120.0, 45.0)).unwrap();

        assert_eq!(outcome.viewbox, ViewBox::new(0.0, 225.0, 1200.0, 450.0));
        assert_eq!(outcome.shift, WrapShift::None);
        assert_eq!(inner_x(&sync), 0.0);

        let root = sync.session().handles.root;
        assert_eq!(
            scene.attribute(root, "viewBox").unwrap().as_deref(),
            Some("0 225 1200 450")
        );
    }

    #[test]
    fn test_render_resizes_and_returns_host_element() {
        let (scene, mut sync) = synchronizer();
        let element = sync
            .render(&FrameState::new([-10.0, -10.0, 10.0, 10.0], [640.0, 480.0]))
            .unwrap();

        assert_eq!(element, sync.session().handles.element);
        assert_eq!(scene.pixel_size(element), Some(DVec2::new(640.0, 480.0)));
    }

    #[test]
    fn test_mercator_full_world() {
        let (scene, surface) = MemoryScene::with_surface(DVec2::new(1200.0, 900.0));
        let session = compose(scene, surface, &OverlayConfig::default()).unwrap();
        let mut sync = ViewportSynchronizer::new(session);

        let world = FrameState::new(
            [
                -HALF_WORLD_METERS,
                -HALF_WORLD_METERS,
                HALF_WORLD_METERS,
                HALF_WORLD_METERS,
            ],
            [1200.0, 900.0],
        );
        let viewbox = sync.sync_frame(&world).unwrap().viewbox;

        // Square world: one world-width in both directions.
        for (actual, expected) in [
            (viewbox.min_x, -300.0),
            (viewbox.min_y, -450.0),
            (viewbox.width, WORLD),
            (viewbox.height, WORLD),
        ] {
            assert!((actual - expected).abs() < 1e-6, "{} != {}", actual, expected);
        }
    }

    #[test]
    fn test_east_wrap_then_stable() {
        let (scene, mut sync) = synchronizer();

        let outcome = sync.sync_frame(&frame(10.0, -45.0, 250.0, 45.0)).unwrap();
        assert_eq!(outcome.viewbox.min_x, 650.0);
        assert_eq!(outcome.shift, WrapShift::East);
        assert_eq!(inner_x(&sync), WORLD);

        let container = sync.session().handles.container;
        assert_eq!(
            scene.numeric_attribute(container, "x").unwrap(),
            ANCHOR_X + WORLD
        );

        let outcome = sync.sync_frame(&frame(10.0, -45.0, 250.0, 45.0)).unwrap();
        assert_eq!(outcome.shift, WrapShift::None);
        assert_eq!(inner_x(&sync), WORLD);
    }

    #[test]
    fn test_west_wrap_then_stable() {
        let (_, mut sync) = synchronizer();

        let outcome = sync.sync_frame(&frame(-370.0, -45.0, -130.0, 45.0)).unwrap();
        assert_eq!(outcome.shift, WrapShift::West);
        assert_eq!(inner_x(&sync), -WORLD);

        let outcome = sync.sync_frame(&frame(-370.0, -45.0, -130.0, 45.0)).unwrap();
        assert_eq!(outcome.shift, WrapShift::None);
    }

    #[test]
    fn test_frames_on_thresholds_do_not_wrap() {
        let (_, mut sync) = synchronizer();

        // View min exactly at the container position.
        let outcome = sync.sync_frame(&frame(0.0, -45.0, 240.0, 45.0)).unwrap();
        assert_eq!(outcome.shift, WrapShift::None);

        // View min exactly half the container width behind it.
        let outcome = sync.sync_frame(&frame(-360.0, -45.0, -120.0, 45.0)).unwrap();
        assert_eq!(outcome.shift, WrapShift::None);
        assert_eq!(inner_x(&sync), 0.0);
    }

    #[test]
    fn test_one_wrap_per_frame() {
        let (_, mut sync) = synchronizer();

        // Jump more than a world east in a single frame.
        let far = frame(400.0, -45.0, 640.0, 45.0);
        assert_eq!(sync.sync_frame(&far).unwrap().shift, WrapShift::East);
        assert_eq!(inner_x(&sync), WORLD);
        assert_eq!(sync.sync_frame(&far).unwrap().shift, WrapShift::East);
        assert_eq!(inner_x(&sync), 2.0 * WORLD);
        assert_eq!(sync.sync_frame(&far).unwrap().shift, WrapShift::None);
    }

    fn pan(step_degrees: f64, frames: usize) -> usize {
        let (_, mut sync) = synchronizer();
        let mut wraps = 0;
        let mut last_inner = inner_x(&sync);

        for i in 0..frames {
            let min_lon = -120.0 + i as f64 * step_degrees;
            let outcome = sync
                .sync_frame(&frame(min_lon, -45.0, min_lon + 240.0, 45.0))
                .unwrap();

            let inner = inner_x(&sync);
            let view = outcome.viewbox.min_x - ANCHOR_X;
            assert!(
                inner - WORLD <= view && view <= inner,
                "frame {}: view {} outside [{}, {}]",
                i,
                view,
                inner - WORLD,
                inner
            );

            let delta = inner - last_inner;
            match outcome.shift {
                WrapShift::None => assert_eq!(delta, 0.0),
                shift => {
                    assert_eq!(delta, shift.offset(WORLD));
                    wraps += 1;
                }
            }
            last_inner = inner;
        }

        wraps
    }

    #[test]
    fn test_continuous_pan_east() {
        assert_eq!(pan(7.0, 400), 8);
    }

    #[test]
    fn test_continuous_pan_west() {
        assert_eq!(pan(-7.0, 400), 8);
    }

    /// Pans a fractional-size surface and checks the container never drifts
    /// off a whole number of world-widths. Returns the net wrap count.
    fn pan_fractional(size: DVec2, step_degrees: f64, frames: usize) -> i64 {
        let (scene, surface) = MemoryScene::with_surface(size);
        let config = OverlayConfig {
            latitude_scale: LatitudeScale::Linear,
            source_crs: Crs::Geographic,
            ..OverlayConfig::default()
        };
        let mut sync = ViewportSynchronizer::new(compose(scene.clone(), surface, &config).unwrap());
        let session_world = sync.session().layout.world_width;
        let container = sync.session().handles.container;
        let mut last_wraps = 0;

        for i in 0..frames {
            let min_lon = -100.0 + i as f64 * step_degrees;
            let outcome = sync
                .sync_frame(&FrameState::new(
                    [min_lon, -30.0, min_lon + 200.0, 30.0],
                    size.to_array(),
                ))
                .unwrap();

            let session = sync.session();
            assert_eq!(session.wraps() - last_wraps, outcome.shift.step());
            assert_eq!(session.inner_x(), session.wraps() as f64 * session_world);
            assert_eq!(
                scene.numeric_attribute(container, "x").unwrap(),
                session.layout.anchor.x + session.inner_x()
            );

            let container_x = session.container_x();
            let view = outcome.viewbox.min_x;
            assert!(
                container_x - session_world <= view && view <= container_x,
                "{:?} frame {}: view {} outside [{}, {}]",
                size,
                i,
                view,
                container_x - session_world,
                container_x
            );

            last_wraps = session.wraps();
        }

        last_wraps
    }

    #[test]
    fn test_fractional_surfaces_wrap_by_whole_worlds() {
        for size in [
            DVec2::new(1000.3, 731.0),
            DVec2::new(1366.7, 657.3),
            DVec2::new(999.9, 733.1),
            DVec2::new(1234.56, 789.01),
        ] {
            // 3.3 degrees per frame for 1200 frames covers eleven worlds.
            assert_eq!(pan_fractional(size, 3.3, 1200), 11, "{:?}", size);
            assert_eq!(pan_fractional(size, -3.3, 1200), -11, "{:?}", size);
        }
    }

    #[test]
    fn test_height_never_negative() {
        let (_, mut sync) = synchronizer();

        let inverted = sync.sync_frame(&frame(-10.0, 30.0, 10.0, -30.0)).unwrap();
        assert_eq!(inverted.viewbox.height, 300.0);

        let normal = sync.sync_frame(&frame(-10.0, -30.0, 10.0, 30.0)).unwrap();
        assert_eq!(normal.viewbox.height, 300.0);
    }

    #[test]
    fn test_width_keeps_sign_across_antimeridian() {
        let (_, mut sync) = synchronizer();
        let outcome = sync.sync_frame(&frame(170.0, -10.0, -170.0, 10.0)).unwrap();

        assert_eq!(outcome.viewbox.width, -1700.0);
    }

    #[test]
    fn test_degenerate_frames() {
        let (scene, mut sync) = synchronizer();

        let outcome = sync
            .sync_frame(&FrameState::new([-120.0, -45.0, 120.0, 45.0], [0.0, 0.0]))
            .unwrap();
        assert!(outcome.viewbox.is_empty());
        assert_eq!(
            scene.pixel_size(sync.session().handles.element),
            Some(DVec2::ZERO)
        );

        let outcome = sync.sync_frame(&frame(5.0, 5.0, 5.0, 5.0)).unwrap();
        assert_eq!(outcome.viewbox.width, 0.0);
        assert_eq!(outcome.viewbox.height, 0.0);

        // Zero-width but tall: still no area, so nothing is shown.
        let outcome = sync.sync_frame(&frame(0.0, -10.0, 0.0, 10.0)).unwrap();
        assert!(outcome.viewbox.is_empty());
        assert_eq!(outcome.viewbox.height, 0.0);
        assert_eq!(outcome.shift, WrapShift::None);
    }

    #[test]
    fn test_zero_surface_never_wraps() {
        let (scene, surface) = MemoryScene::with_surface(DVec2::ZERO);
        let config = OverlayConfig {
            source_crs: Crs::Geographic,
            ..OverlayConfig::default()
        };
        let mut sync = ViewportSynchronizer::new(compose(scene, surface, &config).unwrap());

        let outcome = sync.sync_frame(&frame(100.0, -45.0, 340.0, 45.0)).unwrap();
        assert_eq!(outcome.shift, WrapShift::None);
        assert_eq!(outcome.viewbox, ViewBox::new(0.0, 0.0, 0.0, 0.0));
    }

    #[test]
    fn test_custom_transform() {
        struct Shifted;
        impl ExtentTransform for Shifted {
            fn transform_extent(&self, extent: Extent, _: Crs, _: Crs) -> Extent {
                Extent::new(
                    extent.min_x + 360.0,
                    extent.min_y,
                    extent.max_x + 360.0,
                    extent.max_y,
                )
            }
        }

        let (scene, surface) = MemoryScene::with_surface(DVec2::new(1200.0, 900.0));
        let session = compose(scene, surface, &OverlayConfig::default()).unwrap();
        let mut sync = ViewportSynchronizer::with_transform(session, Shifted);

        let outcome = sync.sync_frame(&frame(-120.0, 0.0, 120.0, 1.0)).unwrap();
        assert_eq!(outcome.viewbox.min_x, 1800.0);
        assert_eq!(outcome.shift, WrapShift::East);
    }
}
