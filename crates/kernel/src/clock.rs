/// Turns wall-clock timestamps into per-frame dt.
///
/// Timestamps are seconds since some fixed origin (program start for the
/// desktop app). The first frame measures from that origin. Each dt is
/// clamped into `[0, max_dt]` so a slow first frame or a stall does not
/// produce one huge impulse.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameClock {
    last: f64,
    max_dt: f32,
    frames: u64,
}

impl FrameClock {
    pub fn new(max_dt: f32) -> Self {
        Self {
            last: 0.0,
            max_dt,
            frames: 0,
        }
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Record a frame at `now` and return its clamped dt.
    pub fn tick(&mut self, now: f64) -> f32 {
        let raw = (now - self.last) as f32;
        self.last = now;
        self.frames += 1;
        if raw > self.max_dt {
            tracing::debug!(raw, max = self.max_dt, frame = self.frames, "clamping frame dt");
        }
        raw.clamp(0.0, self.max_dt)
    }
}
