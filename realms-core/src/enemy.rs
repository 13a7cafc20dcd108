//! Enemy movement policy

use crate::hex::Hex;
use crate::world::World;

/// Picks the enemy's position for its single step
pub trait EnemyPolicy {
    fn next_position(&self, enemy: Hex, player: Hex, world: &World) -> Hex;
}

/// One-step greedy pursuit.
///
/// Candidates are the six neighbors in `DIRECTIONS` order followed by the
/// current hex. Only existing passable cells count. The first candidate that
/// strictly shortens the distance to the player becomes the bar to beat; the
/// enemy stays put if nothing improves. Stalls against concave obstacles.
#[derive(Clone, Copy, Debug, Default)]
pub struct GreedyChase;

impl EnemyPolicy for GreedyChase {
    fn next_position(&self, enemy: Hex, player: Hex, world: &World) -> Hex {
        let candidates = enemy
            .neighbors()
            .chain(std::iter::once(enemy))
            .filter(|&hex| world.is_passable(hex));

        let mut best = enemy;
        let mut best_distance = enemy.distance_to(player);
        for hex in candidates {
            let distance = hex.distance_to(player);
            if distance < best_distance {
                best = hex;
                best_distance = distance;
            }
        }
        best
    }
}

/// Next enemy position under the default greedy chase
pub fn next_enemy_position(enemy: Hex, player: Hex, world: &World) -> Hex {
    GreedyChase.next_position(enemy, player, world)
}
