//! Animation driver
//!
//! Bridges a repaint-callback scheduler (`requestAnimationFrame` in the
//! browser, a hand-pumped queue in tests) to a per-frame callback that
//! receives a measured, clamped timestep in seconds. The driver holds no
//! simulation state.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::{Rc, Weak};

use crate::consts::{MAX_DT, REFERENCE_DT};

/// Frame callback scheduled by a [`Scheduler`]; receives a timestamp in ms
pub type FrameCallback = Box<dyn FnOnce(f64)>;

/// Host repaint scheduling primitive
pub trait Scheduler {
    type Handle: Copy;

    /// Schedule `callback` before the next repaint. Must not invoke it synchronously.
    fn request(&self, callback: FrameCallback) -> Option<Self::Handle>;

    /// Cancel a pending callback; unknown handles are ignored
    fn cancel(&self, handle: Self::Handle);
}

/// Converts host timestamps into clamped timesteps
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameClock {
    last_ms: Option<f64>,
    max_dt: f32,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(MAX_DT)
    }
}

impl FrameClock {
    pub fn new(max_dt: f32) -> Self {
        Self {
            last_ms: None,
            max_dt: max_dt.max(0.0),
        }
    }

    /// Forget the previous timestamp (the next frame reports a nominal step)
    pub fn reset(&mut self) {
        self.last_ms = None;
    }

    /// Seconds since the previous frame, clamped to `[0, max_dt]`
    pub fn tick(&mut self, now_ms: f64) -> f32 {
        let dt = match self.last_ms {
            Some(prev) => ((now_ms - prev) / 1000.0) as f32,
            None => REFERENCE_DT,
        };
        self.last_ms = Some(now_ms);
        if dt.is_finite() {
            dt.clamp(0.0, self.max_dt)
        } else {
            0.0
        }
    }
}

struct DriverState<S: Scheduler> {
    scheduler: S,
    clock: FrameClock,
    pending: Option<S::Handle>,
    running: bool,
    /// Stopped by `suspend` rather than `stop`; `resume` may restart it
    suspended: bool,
    /// Bumped on every start/stop so stale callbacks can recognise themselves
    generation: u64,
    on_frame: Option<Box<dyn FnMut(f32)>>,
    frames: u64,
}

/// Continuous frame loop over a [`Scheduler`]
pub struct AnimationDriver<S: Scheduler + 'static> {
    state: Rc<RefCell<DriverState<S>>>,
}

impl<S: Scheduler + 'static> Clone for AnimationDriver<S> {
    fn clone(&self) -> Self {
        Self {
            state: Rc::clone(&self.state),
        }
    }
}

impl<S: Scheduler + 'static> AnimationDriver<S> {
    pub fn new(scheduler: S) -> Self {
        Self::with_clock(scheduler, FrameClock::default())
    }

    pub fn with_clock(scheduler: S, clock: FrameClock) -> Self {
        Self {
            state: Rc::new(RefCell::new(DriverState {
                scheduler,
                clock,
                pending: None,
                running: false,
                suspended: false,
                generation: 0,
                on_frame: None,
                frames: 0,
            })),
        }
    }

    /// Begin calling `on_frame(dt)` once per scheduled frame. Restarts if running.
    pub fn start<F>(&self, on_frame: F)
    where
        F: FnMut(f32) + 'static,
    {
        self.stop();
        let generation = {
            let mut state = self.state.borrow_mut();
            state.running = true;
            state.generation += 1;
            state.clock.reset();
            state.on_frame = Some(Box::new(on_frame));
            state.generation
        };
        schedule_next(&self.state, generation);
    }

    /// Cancel the pending frame. No `on_frame` call happens after this returns.
    /// Safe to call repeatedly and from inside `on_frame`.
    pub fn stop(&self) {
        let mut state = self.state.borrow_mut();
        state.suspended = false;
        if !state.running && state.pending.is_none() {
            return;
        }
        state.running = false;
        state.generation += 1;
        state.on_frame = None;
        if let Some(handle) = state.pending.take() {
            state.scheduler.cancel(handle);
        }
    }

    /// Stop a running loop so that [`resume`](Self::resume) can restart it.
    /// Returns false when the loop was not running.
    pub fn suspend(&self) -> bool {
        if !self.is_running() {
            return false;
        }
        self.stop();
        self.state.borrow_mut().suspended = true;
        true
    }

    /// Restart a loop stopped by `suspend`. A loop stopped with `stop` stays
    /// stopped. Returns whether the loop restarted.
    pub fn resume<F>(&self, on_frame: F) -> bool
    where
        F: FnMut(f32) + 'static,
    {
        if !self.state.borrow().suspended {
            return false;
        }
        self.start(on_frame);
        true
    }

    pub fn is_running(&self) -> bool {
        self.state.borrow().running
    }

    pub fn is_suspended(&self) -> bool {
        self.state.borrow().suspended
    }

    /// Frames delivered since construction
    pub fn frames(&self) -> u64 {
        self.state.borrow().frames
    }
}

fn schedule_next<S: Scheduler + 'static>(state: &Rc<RefCell<DriverState<S>>>, generation: u64) {
    let weak: Weak<RefCell<DriverState<S>>> = Rc::downgrade(state);
    let callback: FrameCallback = Box::new(move |now_ms| {
        if let Some(state) = weak.upgrade() {
            run_frame(&state, generation, now_ms);
        }
    });
    let handle = state.borrow().scheduler.request(callback);
    let mut state = state.borrow_mut();
    if state.running && state.generation == generation {
        state.pending = handle;
    } else if let Some(handle) = handle {
        state.scheduler.cancel(handle);
    }
}

fn run_frame<S: Scheduler + 'static>(state: &Rc<RefCell<DriverState<S>>>, generation: u64, now_ms: f64) {
    // Take the callback out so it can call stop()/start() without a double borrow
    let (dt, mut on_frame) = {
        let mut s = state.borrow_mut();
        if !s.running || s.generation != generation {
            return;
        }
        s.pending = None;
        let dt = s.clock.tick(now_ms);
        s.frames += 1;
        (dt, s.on_frame.take())
    };

    if let Some(callback) = on_frame.as_mut() {
        callback(dt);
    }

    let still_running = {
        let mut s = state.borrow_mut();
        let current = s.running && s.generation == generation;
        if current && s.on_frame.is_none() {
            s.on_frame = on_frame;
        }
        current
    };
    if still_running {
        schedule_next(state, generation);
    }
}

/// Scheduler whose frames are delivered by calling [`ManualScheduler::pump`]
#[derive(Clone, Default)]
pub struct ManualScheduler {
    queue: Rc<RefCell<VecDeque<(u32, FrameCallback)>>>,
    next_handle: Rc<RefCell<u32>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Callbacks waiting for the next frame
    pub fn pending(&self) -> usize {
        self.queue.borrow().len()
    }

    /// Deliver one frame at `now_ms` to every callback queued before this call.
    /// Returns how many ran.
    pub fn pump(&self, now_ms: f64) -> usize {
        let due: Vec<(u32, FrameCallback)> = self.queue.borrow_mut().drain(..).collect();
        let count = due.len();
        for (_, callback) in due {
            callback(now_ms);
        }
        count
    }
}

impl Scheduler for ManualScheduler {
    type Handle = u32;

    fn request(&self, callback: FrameCallback) -> Option<u32> {
        let mut next = self.next_handle.borrow_mut();
        *next = next.wrapping_add(1);
        let handle = *next;
        self.queue.borrow_mut().push_back((handle, callback));
        Some(handle)
    }

    fn cancel(&self, handle: u32) {
        self.queue.borrow_mut().retain(|(h, _)| *h != handle);
    }
}
