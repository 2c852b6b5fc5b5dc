//! The per-frame driver.
//!
//! The host owns the actual scheduling: it calls [`RenderLoop::tick`] on
//! every display refresh and requests the next one afterwards. The driver
//! tracks where in that cycle it is and performs the work of one frame.

use crate::{
    assets::{AssetBinding, AssetState},
    data_structures::scene_graph::{EntityId, SceneGraph},
    motion,
    params::{BIRD_HEIGHT, BIRD_PITCH, ParameterStore},
    render::OutputSurface,
};

/// Monotonic seconds since some fixed start, read once per tick.
pub trait TimeSource {
    fn elapsed(&self) -> f32;
}

/// Wall clock started at construction. Never reset.
#[derive(Clone, Copy, Debug)]
pub struct Clock {
    start: instant::Instant,
}

impl Clock {
    pub fn new() -> Self {
        Self {
            start: instant::Instant::now(),
        }
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for Clock {
    fn elapsed(&self) -> f32 {
        self.start.elapsed().as_secs_f32()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopState {
    Idle,
    Scheduled,
    Running,
}

pub struct RenderLoop<C, M> {
    clock: C,
    state: LoopState,
    bird: AssetBinding<M>,
    frames: u64,
}

impl<C: TimeSource, M> RenderLoop<C, M> {
    pub fn new(clock: C, bird: AssetBinding<M>) -> Self {
        Self {
            clock,
            state: LoopState::Idle,
            bird,
            frames: 0,
        }
    }

    /// Arm the loop. Only the first call has an effect.
    pub fn start(&mut self) -> bool {
        if self.state != LoopState::Idle {
            return false;
        }
        self.state = LoopState::Scheduled;
        log::info!("render loop started");
        true
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn bird_state(&self) -> AssetState {
        self.bird.state()
    }

    /// Number of frames handed to the surface so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// One frame: attach the bird if its load just finished, advance the
    /// scene to the current time and render it.
    ///
    /// A surface error is returned to the host after the loop is already
    /// rescheduled, so a failed frame never stops the loop.
    pub fn tick<S>(
        &mut self,
        scene: &mut SceneGraph,
        params: &ParameterStore,
        surface: &mut S,
    ) -> Result<(), wgpu::SurfaceError>
    where
        S: OutputSurface<Model = M>,
    {
        if self.state == LoopState::Idle {
            log::debug!("tick ignored, loop not started");
            return Ok(());
        }
        self.state = LoopState::Running;

        self.bird.poll(scene, params, surface);

        let elapsed = self.clock.elapsed();
        if let Some(sphere) = scene.get_mut(EntityId::Sphere) {
            motion::apply_sphere_motion(sphere, elapsed);
        }
        if let Some(bird) = scene.get_mut(EntityId::Bird) {
            let height = params.get(BIRD_HEIGHT).unwrap_or_default();
            let pitch = params.get(BIRD_PITCH).unwrap_or_default();
            motion::apply_bird_motion(bird, elapsed, height, pitch);
        }

        let result = surface.render(scene);
        self.frames += 1;
        self.state = LoopState::Scheduled;
        result
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::{assets::PendingAsset, data_structures::entity::Entity, viewport::Viewport};

    struct FixedClock(Cell<f32>);

    impl TimeSource for FixedClock {
        fn elapsed(&self) -> f32 {
            self.0.get()
        }
    }

    #[derive(Default)]
    struct CountingSurface {
        renders: usize,
    }

    impl OutputSurface for CountingSurface {
        type Model = ();

        fn attach(&mut self, _id: EntityId, _model: ()) {}

        fn resize(&mut self, _viewport: &Viewport) {}

        fn render(&mut self, _scene: &SceneGraph) -> Result<(), wgpu::SurfaceError> {
            self.renders += 1;
            Ok(())
        }
    }

    fn idle_loop() -> RenderLoop<FixedClock, ()> {
        let (_sender, pending) = PendingAsset::channel("bird");
        RenderLoop::new(FixedClock(Cell::new(0.0)), AssetBinding::new(EntityId::Bird, pending))
    }

    #[test]
    fn start_moves_idle_to_scheduled_once() {
        let mut driver = idle_loop();
        assert_eq!(driver.state(), LoopState::Idle);
        assert!(driver.start());
        assert_eq!(driver.state(), LoopState::Scheduled);
        assert!(!driver.start());
    }

    #[test]
    fn tick_before_start_renders_nothing() {
        let mut driver = idle_loop();
        let mut scene = SceneGraph::new();
        let mut surface = CountingSurface::default();
        driver
            .tick(&mut scene, &ParameterStore::new(), &mut surface)
            .unwrap();
        assert_eq!(surface.renders, 0);
        assert_eq!(driver.frames(), 0);
    }

    #[test]
    fn tick_rotates_sphere_and_reschedules() {
        let mut driver = idle_loop();
        driver.clock.0.set(10.0);
        driver.start();
        let mut scene = SceneGraph::new();
        scene.insert(EntityId::Sphere, Entity::new());
        let mut surface = CountingSurface::default();

        driver
            .tick(&mut scene, &ParameterStore::new(), &mut surface)
            .unwrap();

        let sphere = scene.get(EntityId::Sphere).unwrap();
        assert!((sphere.rotation.x.0 - 0.5).abs() < 1e-6);
        assert!((sphere.rotation.z.0 - 0.25).abs() < 1e-6);
        assert_eq!(surface.renders, 1);
        assert_eq!(driver.frames(), 1);
        assert_eq!(driver.state(), LoopState::Scheduled);
    }
}
