//! Locomotion intent component.
//!
//! Intents represent what the player (or an AI) wants this step. Input
//! sources write them; the controller systems read them and never look at
//! devices directly.

use bevy::prelude::*;

use crate::locomotion::INPUT_DEADZONE;

/// Per-character input for the next controller step.
///
/// # Example
///
/// ```rust
/// use bevy::prelude::*;
/// use fps_locomotion::prelude::*;
///
/// let mut intent = LocomotionIntent::new();
/// intent.set_movement(Vec2::new(0.0, 1.0));
/// assert!(intent.is_forward_held());
///
/// // A press only counts once, on the frame it goes down.
/// intent.set_jump_pressed(true);
/// intent.set_jump_pressed(true);
/// assert!(intent.take_jump_request());
/// assert!(!intent.take_jump_request());
/// ```
#[derive(Component, Reflect, Debug, Clone, Default)]
#[reflect(Component)]
pub struct LocomotionIntent {
    /// Movement axes: `x` is strafe (+right), `y` is forward (+forward).
    pub movement: Vec2,
    /// Whether the run modifier is held.
    pub run: bool,
    /// Whether the jump input is currently held.
    pub jump_pressed: bool,
    /// Jump edge waiting to be consumed by the state machine.
    pub(crate) jump_requested: bool,
    /// Pointer motion accumulated since the last look update.
    pub look_delta: Vec2,
}

impl LocomotionIntent {
    /// Create an empty intent.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the movement axes. Each axis is clamped to `[-1, 1]`.
    pub fn set_movement(&mut self, movement: Vec2) {
        self.movement = if movement.is_finite() {
            movement.clamp(Vec2::NEG_ONE, Vec2::ONE)
        } else {
            Vec2::ZERO
        };
    }

    /// Set whether the run modifier is held.
    pub fn set_run_held(&mut self, held: bool) {
        self.run = held;
    }

    /// Set the jump state.
    ///
    /// Call this every frame with the current held state. A transition from
    /// released to pressed latches a jump request until the controller
    /// consumes it, so a press shorter than a fixed step is not lost.
    ///
    /// ```rust,ignore
    /// intent.set_jump_pressed(keyboard.pressed(KeyCode::Space));
    /// ```
    pub fn set_jump_pressed(&mut self, pressed: bool) {
        if pressed && !self.jump_pressed {
            self.jump_requested = true;
        }
        self.jump_pressed = pressed;
    }

    /// Check if jump is currently held.
    pub fn is_jump_pressed(&self) -> bool {
        self.jump_pressed
    }

    /// Whether a jump edge is waiting.
    pub fn has_jump_request(&self) -> bool {
        self.jump_requested
    }

    /// Consume the pending jump edge.
    pub fn take_jump_request(&mut self) -> bool {
        std::mem::take(&mut self.jump_requested)
    }

    /// Add pointer motion. Non-finite deltas are ignored.
    pub fn add_look_delta(&mut self, delta: Vec2) {
        if delta.is_finite() {
            self.look_delta += delta;
        }
    }

    /// Consume the accumulated pointer motion.
    pub fn take_look_delta(&mut self) -> Vec2 {
        std::mem::take(&mut self.look_delta)
    }

    /// Whether forward movement is held.
    pub fn is_forward_held(&self) -> bool {
        self.movement.y > INPUT_DEADZONE
    }

    /// Whether any movement axis is active.
    pub fn is_moving(&self) -> bool {
        self.movement.abs().max_element() > INPUT_DEADZONE
    }

    /// Clear all intents, including pending requests.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
