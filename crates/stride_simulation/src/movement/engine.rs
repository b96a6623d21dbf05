//! PlayerMovement: authoritative движение персонажа
//!
//! Порядок внутри update() фиксирован:
//! 1. previous position
//! 2. stamina + moving platform carry
//! 3. ground probe (+ grace window после прыжка)
//! 4. input smoothing
//! 5. вертикаль (gravity / landing / ceiling)
//! 6. горизонталь (+ air control)
//! 7. прыжок
//! 8. crouch
//! 9. force impulses + capsule sweep, velocity из delta позиции
//! 10. run state (выбор скорости на СЛЕДУЮЩИЙ кадр)
//!
//! Состояние GROUNDED → FALLING → JUMPING → ... цикл на всю жизнь персонажа.

use bevy::prelude::*;

use crate::error::ControllerError;
use crate::input::{ActionBindings, InputSource};
use crate::logger;
use crate::math::{sanitize, sanitize_vec3, smooth_damp, yaw_of, yaw_rotation};
use crate::physics::{Capsule, CollisionFlags, PhysicsWorld};
use crate::platform::{MovingPlatformModel, PlatformConfig};
use crate::signal::Signal;
use crate::stamina::{StaminaConfig, StaminaInputs, StaminaModel};
use crate::time::FrameTime;

use super::config::{CrouchPolicy, MovementConfig, RunPolicy};
use super::crouch::CrouchEase;
use super::force::ForceImpact;
use super::ground::GroundProbe;
use super::speeds::MovementSpeeds;

/// Пока персонаж поднялся меньше чем на это после прыжка: не grounded
const JUMP_GRACE_HEIGHT: f32 = 0.1;
/// Над этим порогом горизонтальной скорости сверх walking max: бег
const RUN_SPEED_MARGIN: f32 = 0.5;
/// Вертикальная скорость после удара головой о потолок
const CEILING_BOUNCE: f32 = -0.1;
/// Уменьшение радиуса для проверки "можно встать" (контакт с полом ≠ overlap)
const STAND_UP_RADIUS_SCALE: f32 = 0.95;
const MAX_EVENTS_PER_FRAME: usize = 8;

/// Edge-triggered событие движения за кадр
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MovementEvent {
    /// Высота прыжка из конфига
    Jumped { height: f32 },
    /// Высота падения от точки отрыва (jump_position.y - position.y)
    Landed { fall_height: f32 },
    BeginCrouch,
    EndCrouch,
    BeginRun,
    EndRun,
}

/// Listener'ы событий движения (вызываются синхронно в порядке подписки)
#[derive(Debug, Default)]
pub struct MovementSignals {
    pub on_jump: Signal<f32>,
    pub on_land: Signal<f32>,
    pub on_begin_crouch: Signal<()>,
    pub on_end_crouch: Signal<()>,
    pub on_begin_run: Signal<()>,
    pub on_end_run: Signal<()>,
}

#[derive(Debug)]
pub struct PlayerMovement {
    config: MovementConfig,
    stamina: StaminaModel,
    platform: MovingPlatformModel,
    initialized: bool,

    position: Vec3,
    rotation: Quat,
    previous_position: Vec3,
    velocity: Vec3,
    move_direction: Vec3,
    /// Горизонтальная скорость в момент отрыва от земли (база для air control)
    ground_velocity: Vec3,

    raw_input: Vec2,
    smoothed_input: Vec2,
    input_velocity: Vec2,
    has_user_input: bool,

    is_grounded: bool,
    was_grounded: bool,
    is_falling: bool,
    is_jumping: bool,
    is_crouching: bool,
    is_running: bool,
    should_run: bool,
    should_crouch: bool,
    can_stand_up: bool,

    current_air_time: f32,
    current_jumps: i32,
    jump_start_y: f32,
    /// Где персонаж оторвался от земли (прыжок или сход с края)
    jump_position: Vec3,
    last_flags: CollisionFlags,

    move_speed: MovementSpeeds,
    crouch: CrouchEase,
    force: ForceImpact,

    pub signals: MovementSignals,
    events: Vec<MovementEvent>,
}

impl PlayerMovement {
    pub fn new(mut config: MovementConfig) -> Self {
        config.rebuild_caches();
        let stamina = StaminaModel::default();
        let platform = MovingPlatformModel::default();
        let crouch = CrouchEase::new(config.standing_head_offset);
        let move_speed = config.walking_speeds;
        let air_time = config.air_jump_time;

        Self {
            config,
            stamina,
            platform,
            initialized: false,
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            previous_position: Vec3::ZERO,
            velocity: Vec3::ZERO,
            move_direction: Vec3::ZERO,
            ground_velocity: Vec3::ZERO,
            raw_input: Vec2::ZERO,
            smoothed_input: Vec2::ZERO,
            input_velocity: Vec2::ZERO,
            has_user_input: false,
            is_grounded: true,
            was_grounded: true,
            is_falling: false,
            is_jumping: false,
            is_crouching: false,
            is_running: false,
            should_run: false,
            should_crouch: false,
            can_stand_up: true,
            current_air_time: air_time,
            current_jumps: -1,
            jump_start_y: 0.0,
            jump_position: Vec3::ZERO,
            last_flags: CollisionFlags::NONE,
            move_speed,
            crouch,
            force: ForceImpact::default(),
            signals: MovementSignals::default(),
            events: Vec::with_capacity(MAX_EVENTS_PER_FRAME),
        }
    }

    pub fn with_stamina(mut self, config: StaminaConfig) -> Self {
        self.stamina = StaminaModel::new(config);
        self
    }

    pub fn with_platform(mut self, config: PlatformConfig) -> Self {
        self.platform = MovingPlatformModel::new(config);
        self
    }

    /// Ставит персонажа в мир (ноги в `position`); состояние: GROUNDED
    pub fn initialize(&mut self, position: Vec3, rotation: Quat) {
        self.position = position;
        self.previous_position = position;
        self.rotation = rotation.normalize();
        self.velocity = Vec3::ZERO;
        self.move_direction = Vec3::ZERO;
        self.ground_velocity = Vec3::ZERO;
        self.smoothed_input = Vec2::ZERO;
        self.input_velocity = Vec2::ZERO;
        self.is_grounded = true;
        self.was_grounded = true;
        self.is_falling = false;
        self.is_jumping = false;
        self.current_jumps = -1;
        self.current_air_time = self.config.air_jump_time;
        self.jump_start_y = position.y;
        self.jump_position = position;
        self.crouch = CrouchEase::new(self.config.standing_head_offset);
        self.initialized = true;
    }

    pub fn update(
        &mut self,
        physics: &dyn PhysicsWorld,
        input: &dyn InputSource,
        bindings: &ActionBindings,
        time: FrameTime,
        facing: Quat,
    ) {
        if !self.initialized {
            logger::log_error(
                &ControllerError::NotInitialized {
                    component: "PlayerMovement",
                }
                .to_string(),
            );
            return;
        }

        self.events.clear();
        let delta = time.delta(self.config.time_base);
        if delta <= 0.0 {
            return;
        }

        // 1-2
        self.previous_position = self.position;
        self.stamina.update(
            delta,
            StaminaInputs {
                is_running: self.is_running,
                pressing_run: input.button(bindings.run),
                speed: self.velocity.length(),
            },
        );
        let capsule = self.capsule();
        let carry = self
            .platform
            .update(physics, &capsule, self.config.collision_mask);
        self.position += carry.displacement;
        // Движение только платформой не даёт velocity
        self.previous_position += carry.displacement;
        self.rotation = (carry.rotation * self.rotation).normalize();

        // 3
        self.check_ground(physics);

        // 4
        self.sample_input(input, bindings, delta);

        // 5
        self.update_vertical(delta);

        // 6
        self.update_horizontal(facing);

        // 7
        if self.config.can_jump && input.button_down(bindings.jump) && self.should_jump() {
            self.jump(facing);
        }

        // 8
        self.update_crouch(physics, input, bindings, delta);

        // 9
        self.apply_movement(physics, delta);

        // 10
        self.update_run_state(input, bindings);

        self.platform.late_update(physics, self.position);
    }

    fn check_ground(&mut self, physics: &dyn PhysicsWorld) {
        self.was_grounded = self.is_grounded;
        match self
            .config
            .ground_check
            .is_grounded(physics, &self.capsule(), self.config.ground_layers)
        {
            Ok(grounded) => self.is_grounded = grounded,
            // Probe пропускает кадр, grounded остаётся прежним
            Err(error) => logger::log_error(&format!("PlayerMovement ground check: {}", error)),
        }

        if self.is_jumping && !self.is_falling && self.position.y - self.jump_start_y < JUMP_GRACE_HEIGHT {
            self.is_grounded = false;
        }
    }

    fn sample_input(&mut self, input: &dyn InputSource, bindings: &ActionBindings, delta: f32) {
        let mut raw = input.vector2(bindings.move_action);
        if !raw.is_finite() {
            raw = Vec2::ZERO;
        }
        self.raw_input = raw.clamp_length_max(1.0);
        self.has_user_input = self.raw_input.length_squared() > 1e-6;

        let smoothing = self.config.acceleration.max(0.0);
        let x = smooth_damp(self.smoothed_input.x, self.raw_input.x, &mut self.input_velocity.x, smoothing, delta);
        let y = smooth_damp(self.smoothed_input.y, self.raw_input.y, &mut self.input_velocity.y, smoothing, delta);
        let smoothed = Vec2::new(x, y);

        if smoothed.is_finite() && self.input_velocity.is_finite() {
            // Диагональ не быстрее прямой
            self.smoothed_input = smoothed.clamp_length_max(1.0);
        } else {
            self.smoothed_input = Vec2::ZERO;
            self.input_velocity = Vec2::ZERO;
        }
    }

    fn update_vertical(&mut self, delta: f32) {
        if !self.is_grounded {
            if self.was_grounded {
                self.ground_velocity = Vec3::new(self.move_direction.x, 0.0, self.move_direction.z);
                self.jump_position = self.position;
            }
            self.current_air_time = (self.current_air_time - delta).clamp(0.0, self.config.air_jump_time);

            if self.last_flags.contains(CollisionFlags::ABOVE) && self.move_direction.y > 0.0 {
                self.move_direction.y = CEILING_BOUNCE;
                self.is_falling = true;
                self.is_jumping = false;
            }

            if !self.is_jumping && !self.is_falling {
                // Сошёл с края
                self.is_falling = true;
                self.current_air_time = self.config.air_jump_time;
                self.move_direction.y = 0.0;
            } else if self.is_jumping && self.move_direction.y + self.force.contribution().y <= 0.0 {
                // Прошли верхнюю точку
                self.is_jumping = false;
                self.is_falling = true;
            }

            self.move_direction.y -= self.config.gravity() * delta;
        } else {
            if self.is_falling || self.is_jumping {
                let fall_height = self.jump_position.y - self.position.y;
                self.fire(MovementEvent::Landed { fall_height });
            }
            self.current_jumps = -1;
            self.is_falling = false;
            self.is_jumping = false;
            self.current_air_time = self.config.air_jump_time;
            self.move_direction.y = if self.config.stick_to_ground {
                -self.config.ground_stick()
            } else {
                0.0
            };
        }
    }

    /// Горизонтальная скорость из сглаженного input в facing персонажа
    fn input_velocity_world(&self, facing: Quat) -> Vec3 {
        let input = self.smoothed_input;
        let forward_speed = if input.y > 0.0 {
            self.move_speed.forward()
        } else {
            self.move_speed.backwards()
        };
        let local = Vec3::new(input.x * self.move_speed.sideways(), 0.0, -input.y * forward_speed);
        yaw_rotation(yaw_of(facing)) * local
    }

    fn update_horizontal(&mut self, facing: Quat) {
        let desired = self.input_velocity_world(facing);
        let horizontal = if self.is_grounded {
            desired
        } else {
            let control = self.config.air_control;
            self.ground_velocity * (1.0 - control) + desired * control
        };
        self.move_direction.x = horizontal.x;
        self.move_direction.z = horizontal.z;
    }

    /// Можно ли прыгнуть сейчас (без учёта кнопки)
    pub fn should_jump(&self) -> bool {
        let allowed = (self.is_grounded && !self.is_jumping)
            || (self.config.air_jumps_amount > 0 && self.current_jumps < self.config.air_jumps_amount)
            || (self.config.allow_air_jump && self.is_falling && self.current_air_time > 0.0);
        if !allowed {
            return false;
        }

        let gates = self.config.jump_gates;
        if gates.block_while_crouched && self.is_crouching {
            return false;
        }
        if gates.require_stamina
            && !(self.stamina.has_stamina() && self.stamina.can_afford(self.config.jump_stamina_cost))
        {
            return false;
        }
        true
    }

    fn jump(&mut self, facing: Quat) {
        let air_jump = !self.is_grounded;

        self.is_jumping = true;
        self.is_falling = false;
        self.is_grounded = false;
        self.current_air_time = 0.0;
        self.current_jumps += 1;
        self.jump_start_y = self.position.y;
        if !air_jump {
            // Отрыв от земли прыжком: is_grounded уже false, переход в update_vertical не сработает
            self.jump_position = self.position;
        }
        self.move_direction.y = self.config.real_jump_height();

        if air_jump && self.config.air_jump_direction_change {
            self.ground_velocity = self.input_velocity_world(facing);
            self.move_direction.x = self.ground_velocity.x;
            self.move_direction.z = self.ground_velocity.z;
        } else if !air_jump {
            self.ground_velocity = Vec3::new(self.move_direction.x, 0.0, self.move_direction.z);
        }

        self.stamina.consume(self.config.jump_stamina_cost);
        let height = self.config.jump_height();
        self.fire(MovementEvent::Jumped { height });
    }

    fn update_crouch(
        &mut self,
        physics: &dyn PhysicsWorld,
        input: &dyn InputSource,
        bindings: &ActionBindings,
        delta: f32,
    ) {
        self.should_crouch = match self.config.crouch_policy {
            CrouchPolicy::Hold => input.button(bindings.crouch),
            CrouchPolicy::Toggle => {
                if input.button_down(bindings.crouch) {
                    !self.should_crouch
                } else {
                    self.should_crouch
                }
            }
        };
        if !self.config.can_crouch {
            self.should_crouch = false;
        }

        if self.is_crouching {
            self.can_stand_up = self.check_can_stand_up(physics);
            // can_crouch = false выпрямляет принудительно
            if !self.config.can_crouch || (!self.should_crouch && self.can_stand_up) {
                self.is_crouching = false;
                self.crouch.begin(self.config.standing_head_offset);
                self.select_move_speed();
                self.fire(MovementEvent::EndCrouch);
            }
        } else {
            self.can_stand_up = true;
            if self.should_crouch {
                self.is_crouching = true;
                self.crouch.begin(self.config.crouch_head_offset);
                self.select_move_speed();
                self.fire(MovementEvent::BeginCrouch);
            }
        }

        let (duration, easing) = if self.is_crouching {
            (self.config.crouch_time, self.config.crouch_easing)
        } else {
            (self.config.stand_up_time, self.config.stand_up_easing)
        };
        self.crouch.advance(delta, duration, easing);
    }

    fn check_can_stand_up(&self, physics: &dyn PhysicsWorld) -> bool {
        let radius = self.config.radius * STAND_UP_RADIUS_SCALE;
        let bottom = self.position + Vec3::Y * self.config.radius;
        let top = self.position + Vec3::Y * (self.config.standing_height - self.config.radius);
        !physics.overlap_capsule(bottom, top, radius, self.config.collision_mask, true)
    }

    fn apply_movement(&mut self, physics: &dyn PhysicsWorld, delta: f32) {
        if !self.move_direction.is_finite() {
            logger::log_error("PlayerMovement: non-finite move direction, resetting to rest");
            self.move_direction = Vec3::ZERO;
            self.ground_velocity = Vec3::ZERO;
        }

        let displacement = (self.move_direction + self.force.contribution()) * delta;
        self.force.decay(delta);

        let result = physics.move_capsule(&self.capsule(), displacement, self.config.collision_mask);
        self.position = sanitize_vec3(result.position, self.position);
        self.last_flags = result.flags;
        self.velocity = sanitize_vec3(-(self.previous_position - self.position) / delta, Vec3::ZERO);
    }

    fn update_run_state(&mut self, input: &dyn InputSource, bindings: &ActionBindings) {
        let pressed = input.button_down(bindings.run);
        match self.config.run_policy {
            RunPolicy::Hold => self.should_run = input.button(bindings.run),
            RunPolicy::Toggle => {
                if pressed {
                    self.should_run = !self.should_run;
                }
            }
            RunPolicy::UntilNoInput => {
                if !self.has_user_input {
                    self.should_run = false;
                } else if pressed {
                    if self.should_run {
                        self.should_run = false;
                    } else if !self.is_running {
                        self.should_run = true;
                    }
                }
            }
        }
        if !self.config.can_run || !self.stamina.has_stamina() {
            self.should_run = false;
        }
        self.select_move_speed();

        let horizontal_speed = Vec2::new(self.velocity.x, self.velocity.z).length();
        let running = horizontal_speed > self.config.walking_speeds.max() + RUN_SPEED_MARGIN;
        if running != self.is_running {
            self.is_running = running;
            self.fire(if running {
                MovementEvent::BeginRun
            } else {
                MovementEvent::EndRun
            });
        }
    }

    fn select_move_speed(&mut self) {
        self.move_speed = if self.is_crouching {
            self.config.crouch_speeds
        } else if self.should_run {
            self.config.run_speeds
        } else {
            self.config.walking_speeds
        };
    }

    fn fire(&mut self, event: MovementEvent) {
        if self.events.len() < MAX_EVENTS_PER_FRAME {
            self.events.push(event);
        }
        match event {
            MovementEvent::Jumped { height } => self.signals.on_jump.emit(height),
            MovementEvent::Landed { fall_height } => self.signals.on_land.emit(fall_height),
            MovementEvent::BeginCrouch => self.signals.on_begin_crouch.emit(()),
            MovementEvent::EndCrouch => self.signals.on_end_crouch.emit(()),
            MovementEvent::BeginRun => self.signals.on_begin_run.emit(()),
            MovementEvent::EndRun => self.signals.on_end_run.emit(()),
        }
    }

    /// Внешний impulse (взрыв, knockback)
    ///
    /// Направление нормализуется, отрицательный Y отражается вверх.
    pub fn add_force(&mut self, direction: Vec3, magnitude: f32) {
        if self.force.add(direction, magnitude) {
            // Knockback вверх: не завершённый прыжок
            self.is_jumping = true;
            self.is_falling = false;
            self.current_air_time = 0.0;
            self.jump_start_y = self.position.y;
        }
    }

    /// Capsule в текущей позе (присед меняет высоту, ноги на месте)
    pub fn capsule(&self) -> Capsule {
        let height = if self.is_crouching {
            self.config.crouch_height
        } else {
            self.config.standing_height
        };
        Capsule::new(self.position, height, self.config.radius)
    }

    /// Телепорт (без velocity)
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        self.previous_position = position;
        self.jump_position = position;
        self.platform.clear();
    }

    pub fn rotation_mut(&mut self) -> &mut Quat {
        &mut self.rotation
    }

    pub fn events(&self) -> &[MovementEvent] {
        &self.events
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn rotation(&self) -> Quat {
        self.rotation
    }

    pub fn velocity(&self) -> Vec3 {
        self.velocity
    }

    pub fn move_direction(&self) -> Vec3 {
        self.move_direction
    }

    pub fn smoothed_movement_input(&self) -> Vec2 {
        self.smoothed_input
    }

    pub fn raw_movement_input(&self) -> Vec2 {
        self.raw_input
    }

    pub fn has_user_input(&self) -> bool {
        self.has_user_input
    }

    pub fn is_grounded(&self) -> bool {
        self.is_grounded
    }

    pub fn is_falling(&self) -> bool {
        self.is_falling
    }

    pub fn is_jumping(&self) -> bool {
        self.is_jumping
    }

    pub fn is_crouching(&self) -> bool {
        self.is_crouching
    }

    pub fn is_running(&self) -> bool {
        self.is_running
    }

    pub fn should_run(&self) -> bool {
        self.should_run
    }

    pub fn can_stand_up(&self) -> bool {
        self.can_stand_up
    }

    pub fn current_air_time(&self) -> f32 {
        self.current_air_time
    }

    pub fn current_jumps(&self) -> i32 {
        self.current_jumps
    }

    pub fn move_speed(&self) -> MovementSpeeds {
        self.move_speed
    }

    /// Высота camera head над ногами (с учётом crouch easing)
    pub fn head_offset(&self) -> f32 {
        sanitize(self.crouch.current_offset(), self.config.standing_head_offset)
    }

    pub fn force_impact(&self) -> Vec3 {
        self.force.value()
    }

    pub fn stamina(&self) -> &StaminaModel {
        &self.stamina
    }

    pub fn stamina_mut(&mut self) -> &mut StaminaModel {
        &mut self.stamina
    }

    pub fn platform(&self) -> &MovingPlatformModel {
        &self.platform
    }

    /// Runtime-правка платформ: `platform_mut().config_mut()`
    pub fn platform_mut(&mut self) -> &mut MovingPlatformModel {
        &mut self.platform
    }

    pub fn config(&self) -> &MovementConfig {
        &self.config
    }

    /// Runtime-правка конфига; кэши пересчитываются setter'ами конфига
    pub fn config_mut(&mut self) -> &mut MovementConfig {
        &mut self.config
    }

    pub fn set_can_run(&mut self, can_run: bool) {
        self.config.can_run = can_run;
    }

    pub fn set_can_crouch(&mut self, can_crouch: bool) {
        self.config.can_crouch = can_crouch;
    }

    pub fn set_can_jump(&mut self, can_jump: bool) {
        self.config.can_jump = can_jump;
    }
}
