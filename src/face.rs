//! Clock face lifecycle: resize, tick and draw.
//!
//! `ClockFace` owns the wall clock, the tick source and the single live
//! ticker. Drawing goes through `ClockView`, a cheap clonable handle that can
//! live on whatever thread owns the surface.
//!
//! The geometry and static layer of one size are published together as a
//! `Scene`. A resize builds the new scene completely and swaps it in under a
//! critical section, so a draw sees either the old scene or the new one.

use alloc::boxed::Box;
use alloc::sync::Arc;
use core::cell::RefCell;
use core::sync::atomic::{AtomicU8, Ordering};

use critical_section::Mutex;
use embedded_graphics::{pixelcolor::Rgb565, prelude::DrawTarget};

use crate::clock::{ClockState, SharedClock, WallClock};
use crate::config::{ClockConfig, StyleParams};
use crate::error::ClockError;
use crate::framebuffer::Framebuffer;
use crate::geometry::{compute_geometry, Geometry};
use crate::primitives::HandAngles;
use crate::render::{paint_dial, paint_hands};
use crate::style::HourHandMode;
use crate::ticker::{first_tick_delay, TickSource, TickerSlot, TICK_PERIOD_MS};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum Phase {
    /// No size received yet, draws are blank.
    Uninitialized = 0,
    /// A new scene is being built; draws keep using the last complete one.
    /// Also left set when the scene was published but no ticker could be
    /// started.
    Resizing = 1,
    /// Scene published and the second ticker running.
    Ready = 2,
}

impl Phase {
    fn from_u8(n: u8) -> Self {
        match n {
            1 => Phase::Resizing,
            2 => Phase::Ready,
            _ => Phase::Uninitialized,
        }
    }
}

/// Geometry and the static layer painted from it.
#[derive(Debug)]
pub struct Scene {
    pub geometry: Geometry,
    pub layer: Framebuffer,
    /// Bumped on every successful rebuild.
    pub generation: u32,
}

struct SceneCell {
    scene: Mutex<RefCell<Option<Arc<Scene>>>>,
    phase: AtomicU8,
}

impl SceneCell {
    fn new() -> Self {
        Self {
            scene: Mutex::new(RefCell::new(None)),
            phase: AtomicU8::new(Phase::Uninitialized as u8),
        }
    }

    fn load(&self) -> Option<Arc<Scene>> {
        critical_section::with(|cs| self.scene.borrow_ref(cs).clone())
    }

    fn publish(&self, scene: Arc<Scene>) {
        critical_section::with(|cs| {
            self.scene.borrow_ref_mut(cs).replace(scene);
        });
    }

    fn set_phase(&self, phase: Phase) {
        self.phase.store(phase as u8, Ordering::Release);
    }

    fn phase(&self) -> Phase {
        Phase::from_u8(self.phase.load(Ordering::Acquire))
    }
}

/// Read side of a clock face.
#[derive(Clone)]
pub struct ClockView {
    shared: Arc<SharedClock>,
    cell: Arc<SceneCell>,
    style: StyleParams,
    hour_mode: HourHandMode,
}

impl ClockView {
    /// Compose a frame: static layer, then the hands at the current time.
    ///
    /// Blank before the first resize and for degenerate sizes.
    pub fn draw<D>(&self, surface: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb565>,
    {
        let Some(scene) = self.cell.load() else {
            return Ok(());
        };
        if scene.geometry.is_degenerate() {
            return Ok(());
        }
        scene.layer.blit(surface)?;
        paint_hands(surface, &scene.geometry, &self.style, self.angles())
    }

    pub fn phase(&self) -> Phase {
        self.cell.phase()
    }

    pub fn scene(&self) -> Option<Arc<Scene>> {
        self.cell.load()
    }

    pub fn layer_generation(&self) -> Option<u32> {
        self.cell.load().map(|s| s.generation)
    }

    pub fn state(&self) -> ClockState {
        self.shared.snapshot()
    }

    pub fn angles(&self) -> HandAngles {
        HandAngles::for_state(self.shared.snapshot(), self.hour_mode)
    }

    /// True once per batch of ticks since the last call.
    pub fn take_redraw(&self) -> bool {
        self.shared.take_redraw()
    }

    pub fn tick_count(&self) -> u32 {
        self.shared.tick_count()
    }
}

pub struct ClockFace<C, T>
where
    C: WallClock,
    T: TickSource,
{
    config: ClockConfig,
    clock: C,
    ticks: T,
    slot: TickerSlot<T::Handle>,
    view: ClockView,
    generation: u32,
}

impl<C, T> ClockFace<C, T>
where
    C: WallClock,
    T: TickSource,
{
    pub fn new(config: ClockConfig, clock: C, ticks: T) -> Self {
        let view = ClockView {
            shared: Arc::new(SharedClock::default()),
            cell: Arc::new(SceneCell::new()),
            style: config.style,
            hour_mode: config.variant.hour_mode,
        };
        Self {
            config,
            clock,
            ticks,
            slot: TickerSlot::new(),
            view,
            generation: 0,
        }
    }

    pub fn config(&self) -> &ClockConfig {
        &self.config
    }

    pub fn view(&self) -> ClockView {
        self.view.clone()
    }

    /// Draw through the face's own view.
    pub fn draw<D>(&self, surface: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb565>,
    {
        self.view.draw(surface)
    }

    pub fn is_ticking(&self) -> bool {
        self.slot.is_running()
    }

    /// Rebuild geometry and static layer for a new surface size, resync the
    /// time and restart the second ticker.
    ///
    /// On allocation failure the previous scene stays published and the
    /// previous ticker keeps running; calling again retries. If the new
    /// ticker cannot be started the new scene is shown without ticking and
    /// the phase stays `Resizing`.
    pub fn on_resize(&mut self, width: i32, height: i32) -> Result<(), ClockError> {
        let had_scene = self.view.cell.load().is_some();
        self.view.cell.set_phase(Phase::Resizing);

        let scene = match self.build_scene(width, height) {
            Ok(scene) => scene,
            Err(e) => {
                log::warn!("resize to {}x{} failed: {}", width, height, e);
                self.view.cell.set_phase(if had_scene {
                    Phase::Ready
                } else {
                    Phase::Uninitialized
                });
                return Err(e);
            }
        };
        log::debug!(
            "static layer {}x{} rebuilt, radius {}",
            width,
            height,
            scene.geometry.radius
        );
        self.view.cell.publish(Arc::new(scene));

        // No tick from the old schedule may land after the resync
        self.slot.cancel();
        let now = self.clock.now();
        self.view.shared.resync(ClockState::from(now));

        let shared = self.view.shared.clone();
        self.slot.restart(
            &mut self.ticks,
            first_tick_delay(now.millisecond),
            TICK_PERIOD_MS,
            Box::new(move || shared.tick()),
        )?;
        self.view.cell.set_phase(Phase::Ready);
        Ok(())
    }

    /// Advance one second by hand, as the ticker would.
    pub fn on_tick(&self) {
        self.view.shared.tick();
    }

    /// Stop ticking, e.g. when the face is detached.
    pub fn stop(&mut self) {
        self.slot.cancel();
    }

    fn build_scene(&mut self, width: i32, height: i32) -> Result<Scene, ClockError> {
        let geometry = compute_geometry(width, height, &self.config.variant);
        let mut layer = Framebuffer::try_new(
            width.max(0) as u32,
            height.max(0) as u32,
            self.config.style.background,
        )?;
        paint_dial(&mut layer, &geometry, &self.config.style).unwrap_or_else(|e| match e {});

        self.generation = self.generation.wrapping_add(1);
        Ok(Scene {
            geometry,
            layer,
            generation: self.generation,
        })
    }
}
