//! End-to-end behavior of the crop session.

use image::{DynamicImage, Rgba, RgbaImage};
use imgkit_image::{
    CropRect, CropSession, DisplayGeometry, DragState, FixedSize, Handle, ImageError, OutputFormat, Point,
    PointerEvent, SessionConfig, MIN_SIZE,
};
use proptest::prelude::*;

fn loaded(display: (f64, f64), natural: (u32, u32)) -> CropSession {
    let mut session = CropSession::default();
    let pixels = RgbaImage::from_fn(natural.0, natural.1, |x, y| {
        Rgba([(x % 251) as u8, (y % 241) as u8, ((x * y) % 239) as u8, 255])
    });
    session
        .on_image_loaded(
            DynamicImage::ImageRgba8(pixels),
            &FixedSize(DisplayGeometry::new(display.0, display.1)),
        )
        .unwrap();
    session
}

/// Drag from the current rectangle to `target` using the given gesture.
fn place(session: &mut CropSession, target: CropRect) {
    let rect = session.rect();
    session.begin_drag(Point::new(0.0, 0.0), None);
    session.continue_drag(Point::new(-10_000.0, -10_000.0));
    session.end_drag();

    session.begin_drag(Point::new(0.0, 0.0), Some(Handle::Se));
    session.continue_drag(Point::new(target.width - rect.width, target.height - rect.height));
    session.end_drag();

    session.begin_drag(Point::new(0.0, 0.0), None);
    session.continue_drag(Point::new(target.x, target.y));
    session.end_drag();
    assert_eq!(session.rect(), target);
}

#[test]
fn se_handle_grows_right_and_down() {
    let mut session = loaded((500.0, 500.0), (500, 500));
    place(&mut session, CropRect::new(50.0, 50.0, 200.0, 200.0));

    session.begin_drag(Point::new(250.0, 250.0), Some(Handle::Se));
    session.continue_drag(Point::new(265.0, 260.0));
    let rect = session.continue_drag(Point::new(280.0, 270.0));

    assert_eq!(rect, CropRect::new(50.0, 50.0, 230.0, 220.0));
}

#[test]
fn nw_handle_moves_origin() {
    let mut session = loaded((500.0, 500.0), (500, 500));
    place(&mut session, CropRect::new(50.0, 50.0, 200.0, 200.0));

    session.begin_drag(Point::new(50.0, 50.0), Some(Handle::Nw));
    let rect = session.continue_drag(Point::new(40.0, 45.0));

    assert_eq!(rect, CropRect::new(40.0, 45.0, 210.0, 205.0));
}

#[test]
fn move_is_clamped_to_display() {
    let mut session = loaded((150.0, 150.0), (150, 150));
    place(&mut session, CropRect::new(0.0, 0.0, 100.0, 100.0));

    session.begin_drag(Point::new(10.0, 10.0), None);
    let rect = session.continue_drag(Point::new(110.0, 110.0));

    assert_eq!(rect, CropRect::new(50.0, 50.0, 100.0, 100.0));
}

#[test]
fn commit_exports_at_source_resolution() {
    let mut session = loaded((500.0, 500.0), (2000, 2000));
    place(&mut session, CropRect::new(100.0, 100.0, 100.0, 100.0));

    let out = session.commit(OutputFormat::Lossless).unwrap().unwrap();
    assert_eq!((out.width, out.height), (400, 400));

    let decoded = image::load_from_memory(&out.bytes).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (400, 400));
}

#[test]
fn lossless_commit_is_bit_identical() {
    let mut session = loaded((300.0, 200.0), (900, 600));
    place(&mut session, CropRect::new(33.0, 17.0, 120.0, 80.0));

    let first = session.commit(OutputFormat::Lossless).unwrap().unwrap();
    let second = session.commit(OutputFormat::Lossless).unwrap().unwrap();
    assert_eq!(first, second);
}

#[test]
fn commit_does_not_touch_source() {
    let session = loaded((100.0, 100.0), (200, 200));
    let before = session.source().unwrap().clone();
    session.commit(OutputFormat::MaxQualityLossy).unwrap();
    assert_eq!(session.source().unwrap().as_bytes(), before.as_bytes());
}

#[test]
fn leave_ends_gesture() {
    let mut session = loaded((500.0, 500.0), (500, 500));

    session.begin_drag(Point::new(250.0, 250.0), Some(Handle::Ne));
    assert_eq!(session.end_drag(), DragState::Idle);

    let state = session.begin_drag(Point::new(100.0, 100.0), None);
    assert_eq!(state, DragState::Moving { anchor: Point::new(100.0, 100.0) });
}

#[test]
fn surface_failure_keeps_state_and_can_retry() {
    let mut session = CropSession::new(SessionConfig {
        max_output_pixels: 10,
        ..SessionConfig::default()
    });
    session
        .on_image_loaded(
            DynamicImage::ImageRgba8(RgbaImage::new(400, 400)),
            &FixedSize(DisplayGeometry::new(400.0, 400.0)),
        )
        .unwrap();
    let rect = session.rect();

    for _ in 0..2 {
        let err = session.commit(OutputFormat::Lossless).unwrap_err();
        assert!(matches!(err, ImageError::SurfaceUnavailable { .. }));
    }
    assert_eq!(session.rect(), rect);
    assert!(session.is_ready());
}

#[derive(Debug, Clone)]
enum Step {
    Down(f64, f64, Option<Handle>),
    Move(f64, f64),
    Up,
    Leave,
    Viewport(f64, f64),
}

impl Step {
    fn event(&self) -> PointerEvent {
        match *self {
            Step::Down(x, y, handle) => PointerEvent::Down { x, y, handle },
            Step::Move(x, y) => PointerEvent::Move { x, y },
            Step::Up => PointerEvent::Up,
            Step::Leave => PointerEvent::Leave,
            Step::Viewport(width, height) => PointerEvent::Viewport { width, height },
        }
    }
}

fn step() -> impl Strategy<Value = Step> {
    let handle = prop_oneof![
        Just(None),
        Just(Some(Handle::Nw)),
        Just(Some(Handle::Ne)),
        Just(Some(Handle::Sw)),
        Just(Some(Handle::Se)),
    ];
    prop_oneof![
        (-800.0..800.0f64, -800.0..800.0f64, handle).prop_map(|(x, y, h)| Step::Down(x, y, h)),
        (-800.0..800.0f64, -800.0..800.0f64).prop_map(|(x, y)| Step::Move(x, y)),
        Just(Step::Up),
        Just(Step::Leave),
        (20.0..1200.0f64, 20.0..1200.0f64).prop_map(|(w, h)| Step::Viewport(w, h)),
    ]
}

proptest! {
    #[test]
    fn rectangle_stays_contained(
        width in 20.0..1200.0f64,
        height in 20.0..1200.0f64,
        steps in prop::collection::vec(step(), 1..60),
    ) {
        let mut session = loaded((width, height), (16, 16));

        for step in steps {
            let rect = session.apply(step.event(), |w, h| FixedSize(DisplayGeometry::new(w, h)));
            if matches!(step, Step::Viewport(..) | Step::Leave) {
                prop_assert_eq!(session.drag_state(), DragState::Idle);
            }
            let display = session.display().unwrap();
            prop_assert!(rect.is_within(display, MIN_SIZE), "{:?} escaped {:?} after {:?}", rect, display, step);
        }
    }
}
