use crate::engine::board::Board;
use crate::level::LevelSpec;
use crate::rng::Rng;
use crate::types::EnemyKind;

pub(super) fn candidates(
    board: &Board,
    level: &LevelSpec,
    current: &str,
    occupied_by_others: &[&str],
) -> Vec<String> {
    board
        .neighbors(current)
        .into_iter()
        .filter(|cell| !board.is_bridge(cell))
        .filter(|cell| !level.is_blocked(board.logical(cell)))
        .filter(|cell| !occupied_by_others.contains(&cell.as_str()))
        .collect()
}

pub(super) fn choose_next(
    kind: EnemyKind,
    board: &Board,
    current: &str,
    player: &str,
    candidates: &[String],
    rng: &mut Rng,
) -> String {
    match kind {
        EnemyKind::Random => random_step(current, candidates, rng),
        EnemyKind::Chaser | EnemyKind::Timed => chase_step(board, current, player, candidates),
    }
}

// Only a strictly shorter distance replaces the best move; ties keep the earlier cell.
pub(super) fn chase_step(board: &Board, current: &str, player: &str, candidates: &[String]) -> String {
    let mut best = current;
    let mut best_distance = board.distance(current, player);
    for cell in candidates {
        let distance = board.distance(cell, player);
        if distance < best_distance {
            best_distance = distance;
            best = cell.as_str();
        }
    }
    best.to_string()
}

pub(super) fn random_step(current: &str, candidates: &[String], rng: &mut Rng) -> String {
    rng.pick(candidates)
        .cloned()
        .unwrap_or_else(|| current.to_string())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::keyboard::Topology;

    fn board() -> Board {
        Board::standard(Arc::new(Topology::standard()))
    }

    fn owned(keys: &[&str]) -> Vec<String> {
        keys.iter().map(|key| key.to_string()).collect()
    }

    #[test]
    fn candidates_skip_blocked_occupied_and_bridge() {
        let board = board();
        let level = LevelSpec::new(1, "A", "Enter").with_blocked(&["G"]);
        let cells = candidates(&board, &level, "B", &["V"]);
        assert_eq!(cells, owned(&["H", "N"]));
    }

    #[test]
    fn candidates_keep_the_player_cell() {
        let board = board();
        let level = LevelSpec::new(1, "S", "Enter");
        let cells = candidates(&board, &level, "A", &[]);
        assert!(cells.contains(&"S".to_string()));
    }

    #[test]
    fn chaser_moves_strictly_closer() {
        let board = board();
        let level = LevelSpec::new(1, "L", "Enter");
        let options = candidates(&board, &level, "Q", &[]);
        let next = chase_step(&board, "Q", "L", &options);
        assert!(board.distance(&next, "L") < board.distance("Q", "L"));
        assert_eq!(next, "W");
    }

    #[test]
    fn chaser_stays_when_nothing_is_closer() {
        let board = board();
        let next = chase_step(&board, "A", "S", &owned(&["CapsLock", "Q"]));
        assert_eq!(next, "A");
        let next = chase_step(&board, "A", "S", &[]);
        assert_eq!(next, "A");
    }

    #[test]
    fn chaser_keeps_first_of_equal_candidates() {
        let board = board();
        // Z and X are both one row above the bridge.
        let next = chase_step(&board, "A", "Space", &owned(&["Z", "X"]));
        assert_eq!(next, "Z");
    }

    #[test]
    fn random_step_picks_only_candidates() {
        let mut rng = Rng::new(11);
        let options = owned(&["W", "S", "A"]);
        for _ in 0..32 {
            let next = random_step("Q", &options, &mut rng);
            assert!(options.contains(&next));
        }
        assert_eq!(random_step("Q", &[], &mut rng), "Q");
    }

    #[test]
    fn timed_enemies_chase() {
        let board = board();
        let mut rng = Rng::new(0);
        let options = owned(&["W", "A"]);
        assert_eq!(
            choose_next(EnemyKind::Timed, &board, "Q", "L", &options, &mut rng),
            choose_next(EnemyKind::Chaser, &board, "Q", "L", &options, &mut rng),
        );
    }
}
