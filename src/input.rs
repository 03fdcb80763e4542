//! Keyboard and mouse input sampling.
//!
//! Optional: characters without [`InputBindings`] are left alone, so AI or
//! network code can drive [`LocomotionIntent`] directly.

use bevy::input::mouse::AccumulatedMouseMotion;
use bevy::prelude::*;
use bevy::window::{CursorGrabMode, PrimaryWindow};

use crate::intent::LocomotionIntent;

/// Key bindings for a locally controlled character.
#[derive(Component, Reflect, Debug, Clone)]
#[reflect(Component)]
pub struct InputBindings {
    /// Move forward.
    pub forward: KeyCode,
    /// Move backward.
    pub back: KeyCode,
    /// Strafe left.
    pub left: KeyCode,
    /// Strafe right.
    pub right: KeyCode,
    /// Run modifier.
    pub run: KeyCode,
    /// Jump.
    pub jump: KeyCode,
}

impl Default for InputBindings {
    fn default() -> Self {
        Self {
            forward: KeyCode::KeyW,
            back: KeyCode::KeyS,
            left: KeyCode::KeyA,
            right: KeyCode::KeyD,
            run: KeyCode::ShiftLeft,
            jump: KeyCode::Space,
        }
    }
}

impl InputBindings {
    /// Movement axes from the held keys: `x` right, `y` forward.
    pub fn movement(&self, keyboard: &ButtonInput<KeyCode>) -> Vec2 {
        let axis = |positive: KeyCode, negative: KeyCode| {
            keyboard.pressed(positive) as i8 as f32 - keyboard.pressed(negative) as i8 as f32
        };
        Vec2::new(axis(self.right, self.left), axis(self.forward, self.back))
    }
}

/// Plugin that feeds keyboard and mouse state into [`LocomotionIntent`].
///
/// Requires Bevy's `InputPlugin`. With `grab_cursor`, the primary window's
/// cursor is locked and hidden on startup; Escape releases it and a left
/// click grabs it again.
pub struct LocomotionInputPlugin {
    /// Lock and hide the cursor.
    pub grab_cursor: bool,
}

impl Default for LocomotionInputPlugin {
    fn default() -> Self {
        Self { grab_cursor: true }
    }
}

impl Plugin for LocomotionInputPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<InputBindings>();
        app.add_systems(PreUpdate, sample_keyboard_mouse);

        if self.grab_cursor {
            app.add_systems(Startup, grab_cursor);
            app.add_systems(Update, toggle_cursor_grab);
        }
    }
}

/// Copy device state into each bound character's intent.
///
/// Pointer motion is accumulated rather than overwritten, so motion from
/// frames that run no fixed step is applied on the next one.
pub fn sample_keyboard_mouse(
    keyboard: Option<Res<ButtonInput<KeyCode>>>,
    mouse_motion: Option<Res<AccumulatedMouseMotion>>,
    mut q_characters: Query<(&InputBindings, &mut LocomotionIntent)>,
) {
    for (bindings, mut intent) in &mut q_characters {
        if let Some(keyboard) = keyboard.as_deref() {
            intent.set_movement(bindings.movement(keyboard));
            intent.set_run_held(keyboard.pressed(bindings.run));
            intent.set_jump_pressed(keyboard.pressed(bindings.jump));
        }
        if let Some(motion) = mouse_motion.as_deref() {
            intent.add_look_delta(motion.delta);
        }
    }
}

fn grab_cursor(mut q_windows: Query<&mut Window, With<PrimaryWindow>>) {
    if let Ok(mut window) = q_windows.single_mut() {
        set_cursor_grab(&mut window, true);
    }
}

fn toggle_cursor_grab(
    keyboard: Option<Res<ButtonInput<KeyCode>>>,
    mouse: Option<Res<ButtonInput<MouseButton>>>,
    mut q_windows: Query<&mut Window, With<PrimaryWindow>>,
) {
    let Ok(mut window) = q_windows.single_mut() else {
        return;
    };

    let released = keyboard.is_some_and(|k| k.just_pressed(KeyCode::Escape));
    let clicked = mouse.is_some_and(|m| m.just_pressed(MouseButton::Left));
    if released {
        set_cursor_grab(&mut window, false);
    } else if clicked && window.cursor_options.grab_mode == CursorGrabMode::None {
        set_cursor_grab(&mut window, true);
    }
}

fn set_cursor_grab(window: &mut Window, grabbed: bool) {
    window.cursor_options.grab_mode = if grabbed {
        CursorGrabMode::Locked
    } else {
        CursorGrabMode::None
    };
    window.cursor_options.visible = !grabbed;
}
