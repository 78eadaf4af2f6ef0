use rand::rngs::SmallRng;

use crate::{ai, board::Grid, common::Coord, player::Player};

/// Computer player using probability-based targeting.
#[derive(Debug, Default)]
pub struct AiPlayer;

impl AiPlayer {
    pub fn new() -> Self {
        Self
    }
}

impl Player for AiPlayer {
    fn select_target(
        &mut self,
        rng: &mut SmallRng,
        view: &Grid,
        remaining: &[usize],
    ) -> Option<Coord> {
        ai::choose_target(view, remaining, rng)
    }
}
