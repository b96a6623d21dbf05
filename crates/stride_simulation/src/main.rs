//! Headless симуляция STRIDE
//!
//! Один персонаж на плоском полу со scripted input:
//! ходьба → бег → прыжок → присед. Печатает состояние раз в секунду.

use bevy::prelude::*;
use stride_simulation::{
    actions, create_headless_app, logger, spawn_first_person_character, CharacterConfig, CharacterController,
    DeterministicRng, HeadlessPhysics, InputAction, InputState, PlayerJumped, PlayerLanded, SimulationPlugin,
};

const MOVE: InputAction = InputAction::new(actions::MOVE);
const RUN: InputAction = InputAction::new(actions::RUN);
const JUMP: InputAction = InputAction::new(actions::JUMP);
const CROUCH: InputAction = InputAction::new(actions::CROUCH);

/// Scripted input по номеру тика
fn scripted_input(tick: u32, input: &mut InputState) {
    input.set_vector2(MOVE, if tick < 480 { Vec2::Y } else { Vec2::ZERO });
    input.set_button(RUN, (120..300).contains(&tick));
    input.set_button(JUMP, tick == 200);
    input.set_button(CROUCH, (360..420).contains(&tick));
}

fn main() {
    let seed = 42;
    stride_simulation::init_logger();
    logger::log_info(&format!("Starting STRIDE headless simulation (seed: {})", seed));

    let mut app = create_headless_app(seed);
    app.add_plugins(SimulationPlugin);

    app.world_mut()
        .resource_mut::<HeadlessPhysics>()
        .add_floor(0.0, 500.0);

    let character_seed = app.world_mut().resource_mut::<DeterministicRng>().next_seed();
    let player = spawn_first_person_character(
        &mut app.world_mut().commands(),
        Vec3::ZERO,
        CharacterConfig::default(),
        character_seed,
    );
    app.world_mut().flush();

    for tick in 0..600u32 {
        if let Some(mut input) = app.world_mut().get_mut::<InputState>(player) {
            scripted_input(tick, &mut input);
        }
        app.update();

        for jumped in app.world_mut().resource_mut::<Events<PlayerJumped>>().drain() {
            logger::log_info(&format!("Tick {}: jump (height {:.2})", tick, jumped.height));
        }
        for landed in app.world_mut().resource_mut::<Events<PlayerLanded>>().drain() {
            logger::log_info(&format!("Tick {}: land (fall {:.2})", tick, landed.fall_height));
        }

        if tick % 60 == 0 {
            if let Some(controller) = app.world().get::<CharacterController>(player) {
                let movement = controller.character.movement();
                logger::log_info(&format!(
                    "Tick {}: pos {:.2?} speed {:.2} grounded {} running {} crouching {} stamina {:.1}",
                    tick,
                    movement.position(),
                    movement.velocity().length(),
                    movement.is_grounded(),
                    movement.is_running(),
                    movement.is_crouching(),
                    movement.stamina().current_stamina(),
                ));
            }
        }
    }

    logger::log_info("Simulation complete!");
}
