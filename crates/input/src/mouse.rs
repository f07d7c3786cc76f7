use glam::Vec2;
use meadow_common::Orientation;

/// Converts absolute cursor samples into orientation changes.
///
/// Holds the last consumed sample. While `first_sample` is set the next
/// sample is only recorded, so a cursor that starts far from the origin (or
/// jumps after a focus change) does not spin the camera.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MouseLook {
    pub sensitivity: f32,
    pub constrain_pitch: bool,
    last: Vec2,
    first_sample: bool,
}

impl Default for MouseLook {
    fn default() -> Self {
        Self::new(0.1, true)
    }
}

impl MouseLook {
    pub fn new(sensitivity: f32, constrain_pitch: bool) -> Self {
        Self {
            sensitivity,
            constrain_pitch,
            last: Vec2::ZERO,
            first_sample: true,
        }
    }

    /// Whether the next sample will be swallowed.
    pub fn awaiting_first_sample(&self) -> bool {
        self.first_sample
    }

    /// Re-arm the first-sample rule after a cursor discontinuity.
    pub fn reset(&mut self) {
        self.first_sample = true;
    }

    /// Delta since the previous sample, with Y flipped so moving the cursor
    /// up (smaller screen Y) pitches up. Zero for the first sample.
    pub fn delta(&mut self, cursor: Vec2) -> Vec2 {
        if self.first_sample {
            self.last = cursor;
            self.first_sample = false;
            tracing::debug!(x = cursor.x, y = cursor.y, "first cursor sample recorded");
        }
        let delta = Vec2::new(cursor.x - self.last.x, self.last.y - cursor.y);
        self.last = cursor;
        delta
    }

    /// Consume one cursor sample and rotate `orientation` by it.
    pub fn apply(&mut self, orientation: &mut Orientation, cursor: Vec2) {
        let d = self.delta(cursor);
        orientation.apply_mouse_delta(d.x, d.y, self.sensitivity, self.constrain_pitch);
    }
}
