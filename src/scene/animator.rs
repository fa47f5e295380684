//! Per-frame oscillator driving the flower group.
//!
//! The animator is the single owner of pointer, drag and time state. Window
//! handlers only push [`SurfaceEvent`]s through an [`InputSender`]; the queue
//! is drained at the start of every [`SceneAnimator::tick`].

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use glam::{Mat4, Quat, UVec2, Vec2, Vec3};

use crate::renderer::Camera;
use crate::rose::flower::{BASE_HEIGHT, BASE_PITCH};
use crate::scene::input::{InputQueue, InputSender, SurfaceEvent, TimedEvent};
use crate::scene::lights::Lights;

pub const TIME_STEP: f32 = 0.015;
pub const YAW_RANGE: f32 = 0.6;
pub const PITCH_RANGE: f32 = 0.4;
pub const EASING: f32 = 0.03;
pub const AUTO_SPIN: f32 = 0.003;
pub const TOUCH_SENSITIVITY: f32 = 0.005;
pub const TOUCH_DECAY_DELAY: Duration = Duration::from_millis(500);
pub const TOUCH_DECAY_FACTOR: f32 = 0.5;

/// First-order step of `current` toward `target`.
#[inline]
pub fn ease(current: f32, target: f32, factor: f32) -> f32 {
    current + (target - current) * factor
}

/// Transform of the flower group for one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GroupPose {
    /// Pitch (x) and yaw (y); roll stays zero.
    pub rotation: Vec2,
    pub position: Vec3,
    pub scale: f32,
}

impl GroupPose {
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(
            Vec3::splat(self.scale),
            Quat::from_rotation_x(self.rotation.x) * Quat::from_rotation_y(self.rotation.y),
            self.position,
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct PendingDecay {
    due: Instant,
    origin: Vec2,
}

#[derive(Clone, Debug, PartialEq)]
pub struct AnimatorState {
    /// Normalized pointer in [-1, 1] on both axes.
    pub pointer: Vec2,
    pub dragging: bool,
    pub last_touch: Vec2,
    pub time: f32,
    /// Current pitch (x) and yaw (y).
    pub rotation: Vec2,
    pub surface: UVec2,
    pending_decay: Option<PendingDecay>,
}

impl AnimatorState {
    fn new(surface: UVec2) -> Self {
        Self {
            pointer: Vec2::ZERO,
            dragging: false,
            last_touch: Vec2::ZERO,
            time: 0.0,
            rotation: Vec2::new(BASE_PITCH, 0.0),
            surface,
            pending_decay: None,
        }
    }

    #[cfg(test)]
    pub fn decay_pending(&self) -> bool {
        self.pending_decay.is_some()
    }

    /// Pitch (x) and yaw (y) the group eases toward.
    pub fn target_rotation(&self) -> Vec2 {
        Vec2::new(
            BASE_PITCH + self.pointer.y * PITCH_RANGE,
            self.pointer.x * YAW_RANGE,
        )
    }
}

/// Disposer returned by [`SceneAnimator::start`].
#[derive(Clone)]
pub struct FrameLoopHandle {
    running: Arc<AtomicBool>,
    input: InputSender,
}

impl FrameLoopHandle {
    /// Stops the frame loop and detaches every input handler.
    pub fn dispose(&self) {
        if self.running.swap(false, Ordering::AcqRel) {
            tracing::info!("frame loop disposed");
        }
        self.input.detach();
    }

    #[cfg(test)]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }
}

pub struct SceneAnimator {
    state: AnimatorState,
    camera: Camera,
    lights: Lights,
    queue: InputQueue,
    running: Arc<AtomicBool>,
    frames: u64,
}

impl SceneAnimator {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            state: AnimatorState::new(UVec2::new(width, height)),
            camera: Camera::with_viewport(width, height),
            lights: Lights::default(),
            queue: InputQueue::default(),
            running: Arc::new(AtomicBool::new(false)),
            frames: 0,
        }
    }

    pub fn sender(&self) -> InputSender {
        self.queue.sender()
    }

    pub fn start(&mut self) -> FrameLoopHandle {
        self.queue.attach();
        self.running.store(true, Ordering::Release);
        tracing::debug!(
            width = self.state.surface.x,
            height = self.state.surface.y,
            "frame loop started"
        );
        FrameLoopHandle {
            running: Arc::clone(&self.running),
            input: self.queue.sender(),
        }
    }

    pub fn state(&self) -> &AnimatorState {
        &self.state
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn lights(&self) -> &Lights {
        &self.lights
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn dropped_events(&self) -> u64 {
        self.queue.dropped()
    }

    /// Advances one frame. Returns `None` once the loop has been disposed
    /// (or before it was started).
    pub fn tick(&mut self, now: Instant) -> Option<GroupPose> {
        if !self.running.load(Ordering::Acquire) {
            self.queue.detach();
            return None;
        }

        let events: Vec<TimedEvent> = self.queue.drain().collect();
        for event in events {
            self.fire_decay(event.at);
            self.apply(event);
        }
        self.fire_decay(now);

        let state = &mut self.state;
        state.time += TIME_STEP;
        let t = state.time;

        let target = state.target_rotation();
        state.rotation.x = ease(state.rotation.x, target.x, EASING);
        state.rotation.y = ease(state.rotation.y, target.y, EASING);

        let position = Vec3::new(
            (t * 0.5).sin() * 0.03,
            BASE_HEIGHT + t.sin() * 0.08 + (t * 1.5).sin() * 0.02,
            0.0,
        );

        state.rotation.y += AUTO_SPIN;

        let scale = 1.0 + (t * 0.8).sin() * 0.02;

        self.frames += 1;

        Some(GroupPose {
            rotation: state.rotation,
            position,
            scale,
        })
    }

    pub fn apply(&mut self, TimedEvent { event, at }: TimedEvent) {
        let state = &mut self.state;

        match event {
            SurfaceEvent::PointerMove { x, y } => {
                if state.surface.x == 0 || state.surface.y == 0 {
                    return;
                }
                let size = state.surface.as_vec2();
                state.pointer = (Vec2::new(x, y) / size * 2.0 - Vec2::ONE)
                    .clamp(Vec2::NEG_ONE, Vec2::ONE);
                state.pending_decay = None;
            }
            SurfaceEvent::PointerLeave => {
                state.pointer = Vec2::ZERO;
                state.pending_decay = None;
            }
            SurfaceEvent::TouchStart { x, y } => {
                state.dragging = true;
                state.last_touch = Vec2::new(x, y);
                state.pending_decay = None;
            }
            SurfaceEvent::TouchMove { x, y } => {
                if !state.dragging {
                    return;
                }
                let touch = Vec2::new(x, y);
                state.pointer = (state.pointer + (touch - state.last_touch) * TOUCH_SENSITIVITY)
                    .clamp(Vec2::NEG_ONE, Vec2::ONE);
                state.last_touch = touch;
            }
            SurfaceEvent::TouchEnd => {
                state.dragging = false;
                // A newer touch-end replaces any decay still waiting.
                state.pending_decay = Some(PendingDecay {
                    due: at + TOUCH_DECAY_DELAY,
                    origin: state.pointer,
                });
            }
            SurfaceEvent::Resize { width, height } => {
                state.surface = UVec2::new(width, height);
                if !self.camera.set_aspect(width as f32, height as f32) {
                    tracing::debug!(width, height, "degenerate surface, projection unchanged");
                }
            }
        }
    }

    fn fire_decay(&mut self, now: Instant) {
        if let Some(decay) = self.state.pending_decay {
            if now >= decay.due {
                self.state.pointer = decay.origin * TOUCH_DECAY_FACTOR;
                self.state.pending_decay = None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn started(width: u32, height: u32) -> (SceneAnimator, FrameLoopHandle) {
        let mut animator = SceneAnimator::new(width, height);
        let handle = animator.start();
        (animator, handle)
    }

    fn at(event: SurfaceEvent, at: Instant) -> TimedEvent {
        TimedEvent { event, at }
    }

    #[test]
    fn initial_state() {
        let animator = SceneAnimator::new(800, 600);
        let state = animator.state();
        assert_eq!(state.rotation, Vec2::new(0.3, 0.0));
        assert_eq!(state.pointer, Vec2::ZERO);
        assert_eq!(state.time, 0.0);
        assert!(!state.dragging);
    }

    #[test]
    fn easing_is_idempotent_at_target() {
        for value in [-1.0, 0.0, 0.3, 0.75, 12.5] {
            assert_eq!(ease(value, value, EASING), value);
        }
        assert!((ease(0.0, 1.0, EASING) - 0.03).abs() < 1e-7);
    }

    #[test]
    fn centered_pointer_first_frame() {
        let (mut animator, _handle) = started(800, 600);
        let now = Instant::now();
        animator.apply(at(SurfaceEvent::PointerMove { x: 400.0, y: 300.0 }, now));
        assert_eq!(animator.state().pointer, Vec2::ZERO);
        assert_eq!(animator.state().target_rotation(), Vec2::new(0.3, 0.0));

        let pose = animator.tick(now).unwrap();
        // Pitch already sits on its target; yaw only picks up the auto spin.
        assert!((pose.rotation.x - 0.3).abs() < 1e-7);
        assert!((pose.rotation.y - AUTO_SPIN).abs() < 1e-7);
    }

    #[test]
    fn first_frame_moves_three_percent_toward_target() {
        let (mut animator, _handle) = started(800, 600);
        let now = Instant::now();
        animator.apply(at(SurfaceEvent::PointerMove { x: 800.0, y: 0.0 }, now));
        let target = animator.state().target_rotation();
        assert!((target - Vec2::new(-0.1, 0.6)).length() < 1e-6);

        let pose = animator.tick(now).unwrap();
        assert!((pose.rotation.x - (0.3 + (-0.1 - 0.3) * 0.03)).abs() < 1e-6);
        assert!((pose.rotation.y - (0.6 * 0.03 + AUTO_SPIN)).abs() < 1e-6);
    }

    #[test]
    fn oscillators_follow_time() {
        let (mut animator, _handle) = started(800, 600);
        let now = Instant::now();
        let mut pose = animator.tick(now).unwrap();
        for _ in 0..99 {
            pose = animator.tick(now).unwrap();
        }
        let t = animator.state().time;
        assert!((t - 1.5).abs() < 1e-4);
        assert!((pose.position.y - (0.3 + t.sin() * 0.08 + (t * 1.5).sin() * 0.02)).abs() < 1e-6);
        assert!((pose.position.x - (t * 0.5).sin() * 0.03).abs() < 1e-6);
        assert!((pose.scale - (1.0 + (t * 0.8).sin() * 0.02)).abs() < 1e-6);
        assert_eq!(animator.frames(), 100);
    }

    #[test]
    fn spin_accumulates_without_input() {
        let (mut animator, _handle) = started(800, 600);
        let now = Instant::now();
        let mut yaw = 0.0;
        for _ in 0..10 {
            yaw = ease(yaw, 0.0, EASING) + AUTO_SPIN;
            let pose = animator.tick(now).unwrap();
            assert!((pose.rotation.y - yaw).abs() < 1e-6);
        }
        assert!(yaw > 0.0);
    }

    #[test]
    fn pointer_leave_recenters() {
        let (mut animator, _handle) = started(800, 600);
        let now = Instant::now();
        animator.apply(at(SurfaceEvent::PointerMove { x: 0.0, y: 600.0 }, now));
        assert_eq!(animator.state().pointer, Vec2::new(-1.0, 1.0));
        animator.apply(at(SurfaceEvent::PointerLeave, now));
        assert_eq!(animator.state().pointer, Vec2::ZERO);
    }

    #[test]
    fn pointer_outside_surface_is_clamped() {
        let (mut animator, _handle) = started(800, 600);
        animator.apply(at(SurfaceEvent::PointerMove { x: 5000.0, y: -900.0 }, Instant::now()));
        assert_eq!(animator.state().pointer, Vec2::new(1.0, -1.0));
    }

    #[test]
    fn touch_moves_stay_clamped() {
        let (mut animator, _handle) = started(800, 600);
        let now = Instant::now();
        animator.apply(at(SurfaceEvent::TouchStart { x: 0.0, y: 0.0 }, now));

        let mut x = 0.0;
        for i in 0..500 {
            x += if i % 3 == 0 { -7000.0 } else { 12345.0 };
            animator.apply(at(SurfaceEvent::TouchMove { x, y: -x * 3.0 }, now));
            let p = animator.state().pointer;
            assert!((-1.0..=1.0).contains(&p.x) && (-1.0..=1.0).contains(&p.y));
        }
    }

    #[test]
    fn touch_drag_scales_pixel_delta() {
        let (mut animator, _handle) = started(800, 600);
        let now = Instant::now();
        animator.apply(at(SurfaceEvent::TouchStart { x: 100.0, y: 100.0 }, now));
        animator.apply(at(SurfaceEvent::TouchMove { x: 140.0, y: 80.0 }, now));
        let p = animator.state().pointer;
        assert!((p.x - 0.2).abs() < 1e-6);
        assert!((p.y + 0.1).abs() < 1e-6);
        assert_eq!(animator.state().last_touch, Vec2::new(140.0, 80.0));
    }

    #[test]
    fn touch_move_without_drag_is_ignored() {
        let (mut animator, _handle) = started(800, 600);
        animator.apply(at(SurfaceEvent::TouchMove { x: 500.0, y: 500.0 }, Instant::now()));
        assert_eq!(animator.state().pointer, Vec2::ZERO);
    }

    #[test]
    fn touch_end_halves_after_delay_once() {
        let (mut animator, _handle) = started(800, 600);
        let t0 = Instant::now();
        animator.apply(at(SurfaceEvent::TouchStart { x: 0.0, y: 0.0 }, t0));
        animator.apply(at(SurfaceEvent::TouchMove { x: 80.0, y: -40.0 }, t0));
        let recorded = animator.state().pointer;
        animator.apply(at(SurfaceEvent::TouchEnd, t0));
        assert!(!animator.state().dragging);

        animator.tick(t0 + Duration::from_millis(499)).unwrap();
        assert_eq!(animator.state().pointer, recorded);
        assert!(animator.state().decay_pending());

        animator.tick(t0 + TOUCH_DECAY_DELAY).unwrap();
        assert_eq!(animator.state().pointer, recorded * 0.5);
        assert!(!animator.state().decay_pending());

        animator.tick(t0 + Duration::from_secs(2)).unwrap();
        assert_eq!(animator.state().pointer, recorded * 0.5);
    }

    #[test]
    fn repeated_touch_end_keeps_latest_decay() {
        let (mut animator, _handle) = started(800, 600);
        let t0 = Instant::now();
        animator.apply(at(SurfaceEvent::TouchStart { x: 0.0, y: 0.0 }, t0));
        animator.apply(at(SurfaceEvent::TouchMove { x: 100.0, y: 0.0 }, t0));
        animator.apply(at(SurfaceEvent::TouchEnd, t0));
        let t1 = t0 + Duration::from_millis(300);
        animator.apply(at(SurfaceEvent::TouchEnd, t1));

        animator.tick(t0 + TOUCH_DECAY_DELAY).unwrap();
        assert_eq!(animator.state().pointer, Vec2::new(0.5, 0.0));

        animator.tick(t1 + TOUCH_DECAY_DELAY).unwrap();
        assert_eq!(animator.state().pointer, Vec2::new(0.25, 0.0));
        assert!(!animator.state().decay_pending());
    }

    #[test]
    fn new_touch_cancels_pending_decay() {
        let (mut animator, _handle) = started(800, 600);
        let t0 = Instant::now();
        animator.apply(at(SurfaceEvent::TouchStart { x: 0.0, y: 0.0 }, t0));
        animator.apply(at(SurfaceEvent::TouchMove { x: 100.0, y: 0.0 }, t0));
        animator.apply(at(SurfaceEvent::TouchEnd, t0));
        animator.apply(at(SurfaceEvent::TouchStart { x: 0.0, y: 0.0 }, t0));

        animator.tick(t0 + Duration::from_secs(1)).unwrap();
        assert_eq!(animator.state().pointer, Vec2::new(0.5, 0.0));
        assert!(!animator.state().decay_pending());
    }

    #[test]
    fn queued_decay_fires_before_later_events() {
        let (mut animator, _handle) = started(800, 600);
        let tx = animator.sender();
        let t0 = Instant::now();
        tx.send_at(SurfaceEvent::TouchStart { x: 0.0, y: 0.0 }, t0);
        tx.send_at(SurfaceEvent::TouchMove { x: 100.0, y: 0.0 }, t0);
        tx.send_at(SurfaceEvent::TouchEnd, t0);
        // Events stamped after the decay was due are applied after it fires.
        tx.send_at(SurfaceEvent::TouchMove { x: 200.0, y: 0.0 }, t0 + Duration::from_secs(1));

        animator.tick(t0 + Duration::from_secs(1)).unwrap();
        assert_eq!(animator.state().pointer, Vec2::new(0.25, 0.0));
    }

    #[test]
    fn touch_end_survives_a_flooded_queue() {
        let (mut animator, _handle) = started(800, 600);
        let tx = animator.sender();
        let t0 = Instant::now();
        tx.send_at(SurfaceEvent::TouchStart { x: 0.0, y: 0.0 }, t0);
        let mut last = 0.0;
        for i in 1.. {
            let x = i as f32 * 0.01;
            if !tx.send_at(SurfaceEvent::TouchMove { x, y: 0.0 }, t0) {
                break;
            }
            last = x;
        }
        assert!(tx.send_at(SurfaceEvent::TouchEnd, t0));

        animator.tick(t0).unwrap();
        assert!(!animator.state().dragging);
        assert!(animator.state().decay_pending());
        // The merged drag still lands on the last queued touch.
        assert!((animator.state().pointer.x - last * TOUCH_SENSITIVITY).abs() < 1e-6);
        assert_eq!(animator.state().last_touch, Vec2::new(last, 0.0));
    }

    #[test]
    fn resize_updates_aspect() {
        let (mut animator, _handle) = started(800, 600);
        assert!((animator.camera().aspect - 800.0 / 600.0).abs() < 1e-7);
        animator.apply(at(SurfaceEvent::Resize { width: 400, height: 300 }, Instant::now()));
        assert_eq!(animator.camera().aspect, 400.0 / 300.0);
        assert_eq!(animator.state().surface, UVec2::new(400, 300));

        animator.apply(at(SurfaceEvent::Resize { width: 1000, height: 500 }, Instant::now()));
        assert_eq!(animator.camera().aspect, 2.0);
    }

    #[test]
    fn zero_height_resize_skips_projection() {
        let (mut animator, _handle) = started(800, 600);
        animator.apply(at(SurfaceEvent::Resize { width: 800, height: 0 }, Instant::now()));
        assert_eq!(animator.camera().aspect, 800.0 / 600.0);

        // Pointer moves over a degenerate surface are ignored too.
        animator.apply(at(SurfaceEvent::PointerMove { x: 10.0, y: 10.0 }, Instant::now()));
        assert_eq!(animator.state().pointer, Vec2::ZERO);
        assert!(animator.tick(Instant::now()).is_some());
    }

    #[test]
    fn dispose_stops_ticks_and_input() {
        let (mut animator, handle) = started(800, 600);
        let tx = animator.sender();
        assert!(animator.tick(Instant::now()).is_some());

        handle.dispose();
        assert!(!handle.is_running());
        assert!(!tx.send(SurfaceEvent::PointerLeave));
        assert!(animator.tick(Instant::now()).is_none());
        assert_eq!(animator.frames(), 1);
    }

    #[test]
    fn not_started_does_not_tick() {
        let mut animator = SceneAnimator::new(800, 600);
        let tx = animator.sender();
        assert!(animator.tick(Instant::now()).is_none());
        assert!(!tx.is_attached());

        let _handle = animator.start();
        assert!(tx.is_attached());
        assert!(animator.tick(Instant::now()).is_some());
    }

    #[test]
    fn pose_matrix_composes_trs() {
        let pose = GroupPose {
            rotation: Vec2::new(0.3, 0.5),
            position: Vec3::new(0.01, 0.3, 0.0),
            scale: 1.02,
        };
        let expected = Mat4::from_translation(pose.position)
            * Mat4::from_rotation_x(0.3)
            * Mat4::from_rotation_y(0.5)
            * Mat4::from_scale(Vec3::splat(1.02));
        assert!(pose.matrix().abs_diff_eq(expected, 1e-5));
    }
}
