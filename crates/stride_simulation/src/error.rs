//! Ошибки контроллера
//!
//! Ни одна из них не пробрасывается наружу из per-frame update:
//! вызывающий логирует через `crate::logger` и восстанавливается локально.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ControllerError {
    /// Camera head не назначен: look/shake/recoil отключены на lifetime камеры
    #[error("camera head is missing, camera look is disabled")]
    MissingCameraHead,

    /// update() вызван до initialize()
    #[error("{component} updated before initialize()")]
    NotInitialized { component: &'static str },

    /// Ray buffer ground probe не совпадает с ray_count (после десериализации без rebuild)
    #[error("ground probe ray buffer holds {actual} rays, expected {expected}")]
    RayBufferMismatch { expected: usize, actual: usize },

    /// Force-look target больше не резолвится в позицию
    #[error("force look target could not be resolved")]
    UnknownLookTarget,
}
