//! Known avionics boards on the CAN bus

use serde::Serialize;

/// Static description of one board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BoardInfo {
    /// Board name as reported in `board_id`
    pub name: &'static str,
    /// CAN board id
    pub id: u8,
    /// Display color used for this board's messages
    pub color: &'static str,
}

const fn board(name: &'static str, id: u8, color: &'static str) -> BoardInfo {
    BoardInfo { name, id, color }
}

/// Board table, in display order
pub const BOARDS: [BoardInfo; 13] = [
    board("DUMMY", 0x00, "black"),
    board("INJECTOR", 0x01, "chocolate"),
    board("LOGGER", 0x03, "darkCyan"),
    board("RADIO", 0x05, "blue"),
    board("SENSOR", 0x07, "darkblue"),
    board("VENT", 0x0B, "slategray"),
    board("GPS", 0x0D, "darkMagenta"),
    board("ARMING", 0x11, "darkGreen"),
    board("PAPA", 0x13, "olive"),
    board("ROCKET_PI", 0x15, "purple"),
    board("ROCKET_PI_2", 0x16, "deeppink"),
    board("SENSOR_2", 0x19, "steelblue"),
    board("SENSOR_3", 0x1B, "darkorange"),
];

/// Find a board by its name
pub fn board_by_name(name: &str) -> Option<&'static BoardInfo> {
    BOARDS.iter().find(|b| b.name == name)
}

/// Find a board by its CAN id
pub fn board_by_id(id: u8) -> Option<&'static BoardInfo> {
    BOARDS.iter().find(|b| b.id == id)
}

/// Index of a board in [`BOARDS`]
pub fn board_index(name: &str) -> Option<usize> {
    BOARDS.iter().position(|b| b.name == name)
}
