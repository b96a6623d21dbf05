//! PlayerCamera: look, shake, zoom, recoil, force-look
//!
//! Владеет local rotation camera head и field of view.
//! Углы в градусах: x = pitch (+ вверх), y = yaw (+ вправо).
//!
//! Body yaw применяется к rotation тела ИНКРЕМЕНТАЛЬНО (delta за кадр),
//! поэтому поворот от moving platform не перетирается.

use bevy::prelude::*;

use crate::error::ControllerError;
use crate::input::{ActionBindings, InputSource};
use crate::logger;
use crate::math::smoothing::delta_angle;
use crate::math::{sanitize, smooth_damp, yaw_of, yaw_rotation};
use crate::signal::Signal;
use crate::time::FrameTime;

use super::config::CameraConfig;
use super::recoil::Recoil;
use super::shake::{CameraShake, ShakeEdge};
use super::zoom::{Zoom, ZoomLeg};

const MAX_EVENTS_PER_FRAME: usize = 4;

/// Куда смотреть в force-look режиме
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LookTarget {
    Point(Vec3),
    /// Позиция резолвится вызывающим каждый кадр (движущаяся цель)
    Entity(Entity),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraEvent {
    BeginShake,
    EndShake,
}

#[derive(Debug, Default)]
pub struct CameraSignals {
    pub on_begin_camera_shake: Signal<()>,
    pub on_end_camera_shake: Signal<()>,
}

/// Всё что камере нужно от кадра
pub struct CameraFrame<'a> {
    pub input: &'a dyn InputSource,
    pub bindings: &'a ActionBindings,
    pub time: FrameTime,
    /// Мировая позиция глаз (force-look целится отсюда)
    pub eye: Vec3,
    pub resolve_target: &'a dyn Fn(Entity) -> Option<Vec3>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct ForceLook {
    target: LookTarget,
    strength: f32,
}

#[derive(Debug)]
pub struct PlayerCamera {
    config: CameraConfig,
    initialized: bool,
    /// Head не назначен: look (pitch)/shake/recoil отключены
    head_missing: bool,
    original_head_rotation: Quat,
    head_rotation: Quat,

    target_head_x: f32,
    target_body_y: f32,
    follow_head_x: f32,
    follow_body_y: f32,
    head_velocity: f32,
    body_velocity: f32,
    /// Сколько yaw уже применено к телу
    applied_body_y: f32,

    shake: CameraShake,
    recoil: Recoil,
    zoom: Zoom,
    zoom_requested: bool,
    force_look: Option<ForceLook>,

    pub signals: CameraSignals,
    events: Vec<CameraEvent>,
}

impl PlayerCamera {
    pub fn new(mut config: CameraConfig, seed: u64) -> Self {
        config.rebuild_caches();
        let zoom = Zoom::new(config.field_of_view);
        Self {
            config,
            initialized: false,
            head_missing: false,
            original_head_rotation: Quat::IDENTITY,
            head_rotation: Quat::IDENTITY,
            target_head_x: 0.0,
            target_body_y: 0.0,
            follow_head_x: 0.0,
            follow_body_y: 0.0,
            head_velocity: 0.0,
            body_velocity: 0.0,
            applied_body_y: 0.0,
            shake: CameraShake::new(seed),
            recoil: Recoil::default(),
            zoom,
            zoom_requested: false,
            force_look: None,
            signals: CameraSignals::default(),
            events: Vec::with_capacity(MAX_EVENTS_PER_FRAME),
        }
    }

    /// `head`: исходная local rotation camera head; None = head не назначен
    pub fn initialize(&mut self, head: Option<Quat>) {
        match head {
            Some(rotation) => {
                self.original_head_rotation = rotation.normalize();
                self.head_missing = false;
            }
            None => {
                logger::log_error(&ControllerError::MissingCameraHead.to_string());
                self.original_head_rotation = Quat::IDENTITY;
                self.head_missing = true;
            }
        }
        self.head_rotation = self.original_head_rotation;
        self.target_head_x = 0.0;
        self.follow_head_x = 0.0;
        self.target_body_y = 0.0;
        self.follow_body_y = 0.0;
        self.applied_body_y = 0.0;
        self.head_velocity = 0.0;
        self.body_velocity = 0.0;
        self.zoom.snap(self.config.field_of_view);
        self.initialized = true;
    }

    pub fn update(&mut self, frame: &CameraFrame, body: &mut Quat) {
        if !self.initialized {
            logger::log_error(
                &ControllerError::NotInitialized {
                    component: "PlayerCamera",
                }
                .to_string(),
            );
            return;
        }
        self.events.clear();

        let look_delta = frame.time.delta(self.config.look_time_base);
        let shake_delta = frame.time.delta(self.config.shake_time_base);
        let zoom_delta = frame.time.delta(self.config.zoom_time_base);

        if self.force_look.is_some() {
            self.update_force_look(frame, *body, look_delta);
        } else {
            self.update_look(frame, look_delta);
        }
        self.apply_body_yaw(body);

        let recoil = if self.head_missing {
            0.0
        } else {
            self.recoil.advance(look_delta)
        };

        match self.shake.advance(shake_delta) {
            ShakeEdge::Began => self.fire(CameraEvent::BeginShake),
            ShakeEdge::Ended => self.fire(CameraEvent::EndShake),
            ShakeEdge::None => {}
        }

        self.update_zoom(frame, zoom_delta);

        if !self.head_missing {
            let pitch = Quat::from_rotation_x((self.follow_head_x + recoil).to_radians());
            let mut rotation = self.original_head_rotation;
            if self.config.rotate_camera_only {
                rotation *= yaw_rotation(self.follow_body_y);
            }
            self.head_rotation = (rotation * pitch * self.shake.rotation()).normalize();
        }
    }

    fn update_look(&mut self, frame: &CameraFrame, delta: f32) {
        if !self.config.can_look || delta <= 0.0 {
            return;
        }

        let mut look = frame.input.vector2(frame.bindings.look);
        if !look.is_finite() {
            look = Vec2::ZERO;
        }
        let sign_x = if self.config.invert_x { -1.0 } else { 1.0 };
        let sign_y = if self.config.invert_y { -1.0 } else { 1.0 };

        self.target_body_y += look.x * self.config.sensitivity_x * sign_x;
        if !self.head_missing {
            self.target_head_x += look.y * self.config.sensitivity_y * sign_y;
        }
        self.target_head_x = self.config.clamp_pitch(self.target_head_x);

        let damping = self.config.damping;
        self.follow_head_x = smooth_damp(self.follow_head_x, self.target_head_x, &mut self.head_velocity, damping, delta);
        self.follow_body_y = smooth_damp(self.follow_body_y, self.target_body_y, &mut self.body_velocity, damping, delta);

        if !self.follow_head_x.is_finite() || !self.follow_body_y.is_finite() {
            self.follow_head_x = sanitize(self.follow_head_x, self.target_head_x);
            self.follow_body_y = sanitize(self.follow_body_y, self.target_body_y);
            self.head_velocity = 0.0;
            self.body_velocity = 0.0;
        }
    }

    fn update_force_look(&mut self, frame: &CameraFrame, body: Quat, delta: f32) {
        let Some(force) = self.force_look else {
            return;
        };
        let point = match force.target {
            LookTarget::Point(point) => Some(point),
            LookTarget::Entity(entity) => (frame.resolve_target)(entity),
        };
        let Some(point) = point else {
            logger::log_error(&ControllerError::UnknownLookTarget.to_string());
            self.stop_force_looking();
            return;
        };

        let direction = (point - frame.eye).normalize_or_zero();
        if direction == Vec3::ZERO {
            return;
        }
        let desired_yaw = direction.x.atan2(-direction.z).to_degrees();
        let desired_pitch = self
            .config
            .clamp_pitch(direction.y.clamp(-1.0, 1.0).asin().to_degrees());

        // strength = время выравнивания; 0 = мгновенно
        let t = if force.strength <= 0.0 {
            1.0
        } else {
            (delta / force.strength).min(1.0)
        };

        let facing_yaw = yaw_of(self.facing(body));
        self.follow_body_y += delta_angle(facing_yaw, desired_yaw) * t;
        if !self.head_missing {
            self.follow_head_x += (desired_pitch - self.follow_head_x) * t;
        }

        // Write-back: обычный look продолжит отсюда без скачка
        self.target_body_y = self.follow_body_y;
        self.target_head_x = self.config.clamp_pitch(self.follow_head_x);
        self.head_velocity = 0.0;
        self.body_velocity = 0.0;
    }

    fn apply_body_yaw(&mut self, body: &mut Quat) {
        if self.config.rotate_camera_only {
            return;
        }
        let delta = self.follow_body_y - self.applied_body_y;
        if delta != 0.0 && delta.is_finite() {
            *body = (yaw_rotation(delta) * *body).normalize();
        }
        self.applied_body_y = self.follow_body_y;
    }

    fn update_zoom(&mut self, frame: &CameraFrame, delta: f32) {
        let zooming = self.config.can_zoom && (self.zoom_requested || frame.input.button(frame.bindings.zoom));
        let leg = if zooming {
            ZoomLeg {
                target_fov: self.config.zoom_field_of_view,
                duration: self.config.zoom_in_time,
                easing: self.config.zoom_in_easing,
            }
        } else {
            ZoomLeg {
                target_fov: self.config.field_of_view,
                duration: self.config.zoom_out_time,
                easing: self.config.zoom_out_easing,
            }
        };
        self.zoom.advance(zooming, leg, delta);
    }

    fn fire(&mut self, event: CameraEvent) {
        if self.events.len() < MAX_EVENTS_PER_FRAME {
            self.events.push(event);
        }
        match event {
            CameraEvent::BeginShake => self.signals.on_begin_camera_shake.emit(()),
            CameraEvent::EndShake => self.signals.on_end_camera_shake.emit(()),
        }
    }

    pub fn camera_shake(&mut self, frequency: f32, magnitude: f32, duration: f32) {
        if self.head_missing {
            return;
        }
        self.shake.start(frequency, magnitude, duration);
    }

    pub fn stop_camera_shake(&mut self) {
        self.shake.stop();
    }

    /// Отдача вверх на `amount` градусов, гаснет линейно за `decay_time`
    pub fn apply_recoil(&mut self, amount: f32, decay_time: f32) {
        if self.head_missing {
            return;
        }
        self.recoil.apply(amount, decay_time);
    }

    /// `strength`: время выравнивания в секундах (0 = snap)
    pub fn force_look(&mut self, target: LookTarget, strength: f32) {
        self.force_look = Some(ForceLook {
            target,
            strength: strength.max(0.0),
        });
    }

    pub fn stop_force_looking(&mut self) {
        if self.force_look.take().is_some() {
            self.target_body_y = self.follow_body_y;
            self.target_head_x = self.config.clamp_pitch(self.follow_head_x);
            self.head_velocity = 0.0;
            self.body_velocity = 0.0;
        }
    }

    pub fn set_zooming(&mut self, zooming: bool) {
        self.zoom_requested = zooming;
    }

    pub fn field_of_view(&self) -> f32 {
        self.zoom.field_of_view()
    }

    /// Базовый FOV; вне zoom применяется сразу
    pub fn set_field_of_view(&mut self, field_of_view: f32) {
        self.config.field_of_view = field_of_view;
        if !self.zoom.is_zooming() {
            self.zoom.snap(field_of_view);
        }
    }

    /// Мировой facing для движения (в camera-only режиме тело не крутится)
    pub fn facing(&self, body: Quat) -> Quat {
        if self.config.rotate_camera_only {
            body * yaw_rotation(self.follow_body_y)
        } else {
            body
        }
    }

    /// Текущий pitch камеры в градусах (+ вверх), включая recoil
    pub fn pitch(&self) -> f32 {
        if self.head_missing {
            0.0
        } else {
            self.follow_head_x + self.recoil.amount()
        }
    }

    pub fn head_rotation(&self) -> Quat {
        self.head_rotation
    }

    pub fn target_head_angle(&self) -> f32 {
        self.target_head_x
    }

    pub fn follow_head_angle(&self) -> f32 {
        self.follow_head_x
    }

    pub fn target_body_angle(&self) -> f32 {
        self.target_body_y
    }

    pub fn follow_body_angle(&self) -> f32 {
        self.follow_body_y
    }

    pub fn recoil(&self) -> f32 {
        self.recoil.amount()
    }

    pub fn shake(&self) -> &CameraShake {
        &self.shake
    }

    pub fn is_shaking(&self) -> bool {
        self.shake.is_shaking()
    }

    pub fn is_zooming(&self) -> bool {
        self.zoom.is_zooming()
    }

    pub fn is_force_looking(&self) -> bool {
        self.force_look.is_some()
    }

    pub fn is_head_missing(&self) -> bool {
        self.head_missing
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn events(&self) -> &[CameraEvent] {
        &self.events
    }

    pub fn config(&self) -> &CameraConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut CameraConfig {
        &mut self.config
    }
}
