pub const ENEMY_TURN_DELAY_MS: u64 = 100;
pub const TIMED_ENEMY_INTERVAL_MS: u64 = 2_000;
pub const SHAKE_CLEAR_MS: u64 = 400;
pub const LEVEL_ADVANCE_DELAY_MS: u64 = 1_500;

pub const BRIDGE_KEY: &str = "Space";
pub const RESTART_KEY: &str = "R";

pub const BRIDGE_ROW: i32 = 4;
pub const BOTTOM_ROW: i32 = 3;

pub const ROW_OFFSETS: [f64; 5] = [0.0, 1.5, 1.8, 2.3, 3.5];

pub const UNREACHABLE_DISTANCE: f64 = 999_999.0;

pub const STANDARD_ROWS: [&[&str]; 4] = [
    &[
        "`", "1", "2", "3", "4", "5", "6", "7", "8", "9", "0", "-", "=", "Backspace",
    ],
    &[
        "Tab", "Q", "W", "E", "R", "T", "Y", "U", "I", "O", "P", "[", "]", "\\",
    ],
    &[
        "CapsLock", "A", "S", "D", "F", "G", "H", "J", "K", "L", ";", "'", "Enter",
    ],
    &[
        "ShiftLeft", "Z", "X", "C", "V", "B", "N", "M", ",", ".", "/", "ShiftRight",
    ],
];

pub fn row_offset(row: i32) -> f64 {
    usize::try_from(row)
        .ok()
        .and_then(|idx| ROW_OFFSETS.get(idx).copied())
        .unwrap_or(0.0)
}

pub fn key_label(key: &str) -> &str {
    match key {
        "ShiftLeft" | "ShiftRight" => "Shift",
        "CapsLock" => "Caps",
        "Backspace" => "Bksp",
        "Enter" => "Ent",
        "Tab" => "Tab",
        "Space" => "____",
        other => other,
    }
}
