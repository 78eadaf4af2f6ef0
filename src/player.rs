use crate::{
    board::Grid,
    common::{AttackOutcome, Coord},
    game::{GameEngine, MoveError},
};
use rand::rngs::SmallRng;

/// The local agent that picks targets and is told what happened.
///
/// Fleet placement is always random (see [`crate::placement`]), so players only
/// take part once play starts.
pub trait Player: Send {
    /// Choose the next target on the opponent view. `remaining` holds the
    /// lengths of opponent ships not sunk yet. `None` means the player quit.
    fn select_target(
        &mut self,
        rng: &mut SmallRng,
        view: &Grid,
        remaining: &[usize],
    ) -> Option<Coord>;

    /// The last target was refused; `select_target` will be called again.
    fn reject_target(&mut self, _coord: Coord, _reason: MoveError) {}

    /// Inform the player of the result of its own shot.
    fn handle_attack_result(&mut self, _coord: Coord, _outcome: &AttackOutcome) {}

    /// Inform the player of an opponent shot against its board.
    fn handle_incoming_attack(&mut self, _coord: Coord, _outcome: &AttackOutcome) {}

    /// Called whenever the boards changed.
    fn show(&mut self, _engine: &GameEngine) {}
}
