use crate::level::LevelSpec;
use crate::types::EnemyKind;

const LEFT_HALF: [&str; 24] = [
    "`", "1", "2", "3", "4", "5", //
    "Tab", "Q", "W", "E", "R", "T", //
    "CapsLock", "A", "S", "D", "F", "G", //
    "ShiftLeft", "Z", "X", "C", "V", "B",
];

const RIGHT_HALF: [&str; 29] = [
    "6", "7", "8", "9", "0", "-", "=", "Backspace", //
    "Y", "U", "I", "O", "P", "[", "]", "\\", //
    "H", "J", "K", "L", ";", "'", "Enter", //
    "N", "M", ",", ".", "/", "ShiftRight",
];

pub fn builtin_levels() -> Vec<LevelSpec> {
    vec![
        LevelSpec::new(1, "A", "Enter").with_message("REACH ENTER"),
        LevelSpec::new(2, "C", "Enter")
            .with_blocked(&["T", "Y", "G", "H", "B", "N"])
            .with_message("REACH ENTER"),
        LevelSpec::new(3, "G", "Enter")
            .with_blocked(&["T", "Y", "H", "B", "N"])
            .with_enemy("e1", "Q", EnemyKind::Chaser)
            .with_enemy("e2", "P", EnemyKind::Chaser)
            .with_message("AVOID THE CHASERS; REACH ENTER"),
        LevelSpec::new(4, "2", "Enter").with_enemy("e1", "E", EnemyKind::Chaser),
        LevelSpec::new(5, "Z", "Enter").with_enemy("e1", "S", EnemyKind::Chaser),
        LevelSpec::new(6, "Q", "P")
            .with_split(&LEFT_HALF, &RIGHT_HALF)
            .with_enemy("e1", "E", EnemyKind::Chaser)
            .with_message("USE SPACE TO SLIDE"),
        LevelSpec::new(7, "ShiftLeft", "Backspace")
            .with_blocked(&["5", "R", "G", "N"])
            .with_enemy("e1", "I", EnemyKind::Random)
            .with_enemy("e2", "K", EnemyKind::Random)
            .with_message("THEY WANDER"),
        LevelSpec::new(8, "`", "ShiftRight")
            .with_blocked(&["E", "D", "O", "L"])
            .with_enemy("e1", "M", EnemyKind::Timed)
            .with_enemy("e2", "9", EnemyKind::Chaser)
            .with_message("THE CLOCK IS TICKING"),
    ]
}
