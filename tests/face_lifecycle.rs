use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use dial_clock::{
    compute_geometry, ClockConfig, ClockFace, ClockState, FixedClock, Framebuffer, Phase,
    PollTicker, StyleVariant, WallTime,
};
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::RgbColor;

fn fixed(h: u8, m: u8, s: u8, ms: u16) -> FixedClock {
    FixedClock(WallTime::from_hms_milli(h, m, s, ms))
}

#[test]
fn ten_past_ten_scenario() {
    let ticker = PollTicker::new(0);
    let mut face = ClockFace::new(
        ClockConfig::default().with_variant(StyleVariant::TAPERED),
        fixed(10, 9, 30, 0),
        ticker,
    );
    face.on_resize(300, 300).unwrap();

    let view = face.view();
    let scene = view.scene().unwrap();
    assert!((scene.geometry.radius - 137.55).abs() < 1e-3);

    let angles = view.angles();
    assert_eq!(angles.hour, 210.0);
    assert_eq!(angles.minute, -36.0);
    assert_eq!(angles.second, 90.0);

    let mut surface = Framebuffer::try_new(300, 300, Rgb565::BLUE).unwrap();
    view.draw(&mut surface).unwrap();
    assert_eq!(surface.count(Rgb565::BLUE), 0);
    assert!(surface.count(Rgb565::RED) > 0);
}

#[test]
fn consecutive_resizes_leave_one_ticker() {
    let ticker = PollTicker::new(0);
    let mut face = ClockFace::new(ClockConfig::default(), fixed(1, 0, 0, 0), ticker.clone());
    face.on_resize(100, 100).unwrap();
    face.on_resize(200, 120).unwrap();
    assert_eq!(ticker.live_schedules(), 1);

    // one tick per elapsed second, not two
    assert_eq!(ticker.poll(5_000), 5);
    assert_eq!(face.view().tick_count(), 5);
    assert_eq!(face.view().state(), ClockState::new(1, 0, 5));
}

#[test]
fn resize_resyncs_after_drift() {
    let ticker = PollTicker::new(0);
    let mut face = ClockFace::new(ClockConfig::default(), fixed(6, 30, 0, 0), ticker.clone());
    face.on_resize(90, 90).unwrap();
    ticker.poll(3_000);
    assert_eq!(face.view().state(), ClockState::new(6, 30, 3));
    face.on_resize(90, 90).unwrap();
    assert_eq!(face.view().state(), ClockState::new(6, 30, 0));
}

#[test]
fn draw_during_resizes_sees_whole_scenes() {
    let ticker = PollTicker::new(0);
    let mut face = ClockFace::new(
        ClockConfig::default().with_variant(StyleVariant::CLASSIC),
        fixed(3, 15, 45, 0),
        ticker,
    );
    face.on_resize(200, 200).unwrap();

    let view = face.view();
    let done = Arc::new(AtomicBool::new(false));
    let draws = Arc::new(AtomicU32::new(0));
    let drawer = {
        let done = done.clone();
        let draws = draws.clone();
        thread::spawn(move || {
            let mut surface = Framebuffer::try_new(400, 400, Rgb565::BLACK).unwrap();
            while !done.load(Ordering::Acquire) {
                let scene = view.scene().unwrap();
                let g = &scene.geometry;
                // layer and geometry always come from the same size
                assert_eq!(scene.layer.width() as i32, g.width);
                assert_eq!(scene.layer.height() as i32, g.height);
                assert_eq!(*g, compute_geometry(g.width, g.height, &StyleVariant::CLASSIC));
                view.draw(&mut surface).unwrap();
                draws.fetch_add(1, Ordering::AcqRel);
            }
        })
    };

    // Each resize waits for at least one draw, so the two threads interleave
    let deadline = Instant::now() + Duration::from_secs(10);
    for i in 0..40 {
        let seen = draws.load(Ordering::Acquire);
        let (w, h) = if i % 2 == 0 { (400, 300) } else { (200, 200) };
        face.on_resize(w, h).unwrap();
        while draws.load(Ordering::Acquire) == seen
            && !drawer.is_finished()
            && Instant::now() < deadline
        {
            thread::yield_now();
        }
    }
    done.store(true, Ordering::Release);
    drawer.join().unwrap();
    assert!(draws.load(Ordering::Acquire) >= 40);
    assert_eq!(face.view().phase(), Phase::Ready);
}

#[test]
fn thread_ticker_drives_the_face() {
    // 990 ms past the second: first tick lands 10 ms later
    let clock = || WallTime::from_hms_milli(8, 0, 0, 990);
    let mut face = ClockFace::new(ClockConfig::default(), clock, dial_clock::ThreadTicker);
    face.on_resize(60, 60).unwrap();

    let view = face.view();
    let mut waited = 0;
    while view.tick_count() == 0 && waited < 200 {
        thread::sleep(Duration::from_millis(10));
        waited += 1;
    }
    assert!(view.tick_count() >= 1);
    assert!(view.take_redraw());

    // a second resize replaces the thread, teardown stops it
    face.on_resize(80, 80).unwrap();
    assert!(face.is_ticking());
    face.stop();
    assert!(!face.is_ticking());
    let seen = view.tick_count();
    thread::sleep(Duration::from_millis(50));
    assert_eq!(view.tick_count(), seen);
}
