//! Input abstraction: opaque polled source
//!
//! Архитектура:
//! - `InputAction`: handle действия (FNV-1a hash имени), считается ОДИН раз
//!   при конфигурации, в hot path только сравнение u64
//! - `InputSource`: то что контроллер опрашивает каждый кадр
//! - `InputState`: in-memory реализация, host заполняет её каждый кадр
//!   (binding клавиатуры/геймпада: забота host'а)
//!
//! Отсутствующий binding → 0 / false, не ошибка.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;


/// Resolved handle действия
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InputAction(u64);

impl InputAction {
    /// FNV-1a 64 от имени действия
    pub const fn new(name: &str) -> Self {
        const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
        const PRIME: u64 = 0x0000_0100_0000_01b3;

        let bytes = name.as_bytes();
        let mut hash = OFFSET;
        let mut i = 0;
        while i < bytes.len() {
            hash ^= bytes[i] as u64;
            hash = hash.wrapping_mul(PRIME);
            i += 1;
        }
        Self(hash)
    }

    pub fn id(&self) -> u64 {
        self.0
    }
}

/// То что контроллер читает каждый кадр
pub trait InputSource {
    /// Кнопка удерживается
    fn button(&self, action: InputAction) -> bool;
    /// Кнопка нажата в этом кадре (edge)
    fn button_down(&self, action: InputAction) -> bool;
    /// Кнопка отпущена в этом кадре (edge)
    fn button_up(&self, action: InputAction) -> bool;
    fn axis_raw(&self, action: InputAction) -> f32;
    fn vector2(&self, action: InputAction) -> Vec2;
}

/// Пустой source (input отключён / персонаж под управлением скрипта)
pub struct NoInput;

impl InputSource for NoInput {
    fn button(&self, _action: InputAction) -> bool {
        false
    }
    fn button_down(&self, _action: InputAction) -> bool {
        false
    }
    fn button_up(&self, _action: InputAction) -> bool {
        false
    }
    fn axis_raw(&self, _action: InputAction) -> f32 {
        0.0
    }
    fn vector2(&self, _action: InputAction) -> Vec2 {
        Vec2::ZERO
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct ButtonPhase {
    held: bool,
    pressed_this_frame: bool,
    released_this_frame: bool,
}

/// In-memory input state (per player)
///
/// # Frame contract
/// 1. Host вызывает `press`/`release`/`set_vector2`/`set_axis`
/// 2. Контроллер читает через `InputSource`
/// 3. `end_frame()` сбрасывает edge-флаги (down/up)
///
/// HashMap только перезаписывает существующие ключи в steady state:
/// аллокаций после первых кадров нет.
#[derive(Component, Debug, Clone, Default)]
pub struct InputState {
    buttons: HashMap<InputAction, ButtonPhase>,
    axes: HashMap<InputAction, f32>,
    vectors: HashMap<InputAction, Vec2>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self, action: InputAction) {
        let phase = self.buttons.entry(action).or_default();
        if !phase.held {
            phase.pressed_this_frame = true;
        }
        phase.held = true;
    }

    pub fn release(&mut self, action: InputAction) {
        let phase = self.buttons.entry(action).or_default();
        if phase.held {
            phase.released_this_frame = true;
        }
        phase.held = false;
    }

    /// press или release в зависимости от `held`
    pub fn set_button(&mut self, action: InputAction, held: bool) {
        if held {
            self.press(action);
        } else {
            self.release(action);
        }
    }

    pub fn set_axis(&mut self, action: InputAction, value: f32) {
        self.axes.insert(action, value);
    }

    pub fn set_vector2(&mut self, action: InputAction, value: Vec2) {
        self.vectors.insert(action, value);
    }

    /// Сбросить edge-флаги после того как кадр обработан
    pub fn end_frame(&mut self) {
        for phase in self.buttons.values_mut() {
            phase.pressed_this_frame = false;
            phase.released_this_frame = false;
        }
    }
}

impl InputSource for InputState {
    fn button(&self, action: InputAction) -> bool {
        self.buttons.get(&action).is_some_and(|phase| phase.held)
    }

    fn button_down(&self, action: InputAction) -> bool {
        self.buttons
            .get(&action)
            .is_some_and(|phase| phase.pressed_this_frame)
    }

    fn button_up(&self, action: InputAction) -> bool {
        self.buttons
            .get(&action)
            .is_some_and(|phase| phase.released_this_frame)
    }

    fn axis_raw(&self, action: InputAction) -> f32 {
        self.axes.get(&action).copied().unwrap_or(0.0)
    }

    fn vector2(&self, action: InputAction) -> Vec2 {
        self.vectors.get(&action).copied().unwrap_or(Vec2::ZERO)
    }
}

/// Имена действий по умолчанию
pub mod actions {
    pub const MOVE: &str = "move";
    pub const LOOK: &str = "look";
    pub const JUMP: &str = "jump";
    pub const RUN: &str = "run";
    pub const CROUCH: &str = "crouch";
    pub const ZOOM: &str = "zoom";
}

/// Resolved bindings контроллера
///
/// Хэши считаются в `new`/`rebind_*`, никогда в update().
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionBindings {
    pub move_action: InputAction,
    pub look: InputAction,
    pub jump: InputAction,
    pub run: InputAction,
    pub crouch: InputAction,
    pub zoom: InputAction,
}

impl Default for ActionBindings {
    fn default() -> Self {
        Self {
            move_action: InputAction::new(actions::MOVE),
            look: InputAction::new(actions::LOOK),
            jump: InputAction::new(actions::JUMP),
            run: InputAction::new(actions::RUN),
            crouch: InputAction::new(actions::CROUCH),
            zoom: InputAction::new(actions::ZOOM),
        }
    }
}

impl ActionBindings {
    pub fn rebind_move(&mut self, name: &str) {
        self.move_action = InputAction::new(name);
    }

    pub fn rebind_look(&mut self, name: &str) {
        self.look = InputAction::new(name);
    }

    pub fn rebind_jump(&mut self, name: &str) {
        self.jump = InputAction::new(name);
    }

    pub fn rebind_run(&mut self, name: &str) {
        self.run = InputAction::new(name);
    }

    pub fn rebind_crouch(&mut self, name: &str) {
        self.crouch = InputAction::new(name);
    }

    pub fn rebind_zoom(&mut self, name: &str) {
        self.zoom = InputAction::new(name);
    }
}
