#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic refill system responsible for spawning dots into empty cells.

use dot_merge_core::{ColorPalette, Command, GridView};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Pure system that fills every empty cell with a randomly colored dot.
#[derive(Debug)]
pub struct Refill {
    rng: ChaCha8Rng,
}

impl Refill {
    /// Creates a refill system whose colors derive from `seed`.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Emits one spawn per empty cell, columns left to right and rows bottom
    /// to top. Occupied cells are never touched.
    pub fn handle(&mut self, grid: GridView<'_>, palette: ColorPalette, out: &mut Vec<Command>) {
        for (cell, contents) in grid.iter() {
            if contents.is_empty() {
                out.push(Command::SpawnDot {
                    cell,
                    color: palette.random_color(&mut self.rng),
                });
            }
        }
    }
}
