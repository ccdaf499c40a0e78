//! Command classification
//!
//! Maps numeric G and M codes to [`CommandType`] and answers the static
//! questions callers ask about a command type.

use serde::Serialize;

/// Kind of a parsed G-code command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CommandType {
    /// G0
    RapidMove,
    /// G1
    LinearMove,
    /// G2
    CwArc,
    /// G3
    CcwArc,
    /// G4
    Dwell,
    /// G17
    PlaneXy,
    /// G18
    PlaneXz,
    /// G19
    PlaneYz,
    /// G20
    Inches,
    /// G21
    Millimeters,
    /// G28
    ReturnHome,
    /// G30
    ReturnPredefined,
    /// G92
    CoordinateOffset,
    /// G90
    AbsoluteMode,
    /// G91
    IncrementalMode,
    /// G93/G94/G95, never produced by the classification tables
    FeedRateMode,
    /// M3
    SpindleCw,
    /// M4
    SpindleCcw,
    /// M5
    SpindleStop,
    /// M6
    ToolChange,
    /// M7
    CoolantMist,
    /// M8
    CoolantFlood,
    /// M9
    CoolantOff,
    /// M2 and M30
    ProgramEnd,
    /// M0
    ProgramStop,
    /// M1
    OptionalStop,
    /// G54
    WorkCoord1,
    /// G55
    WorkCoord2,
    /// G56
    WorkCoord3,
    /// G57
    WorkCoord4,
    /// G58
    WorkCoord5,
    /// G59
    WorkCoord6,
    /// G81
    CannedCycleDrill,
    /// G82
    CannedCycleDwell,
    /// G83
    CannedCyclePeck,
    /// G84
    CannedCycleTap,
    /// G85
    CannedCycleBore,
    /// G80
    CancelCycle,
    Unknown,
}

/// Look up a G code
pub fn classify_gcode(code: i32) -> Option<CommandType> {
    use CommandType::*;

    let command_type = match code {
        0 => RapidMove,
        1 => LinearMove,
        2 => CwArc,
        3 => CcwArc,
        4 => Dwell,
        17 => PlaneXy,
        18 => PlaneXz,
        19 => PlaneYz,
        20 => Inches,
        21 => Millimeters,
        28 => ReturnHome,
        30 => ReturnPredefined,
        54 => WorkCoord1,
        55 => WorkCoord2,
        56 => WorkCoord3,
        57 => WorkCoord4,
        58 => WorkCoord5,
        59 => WorkCoord6,
        80 => CancelCycle,
        81 => CannedCycleDrill,
        82 => CannedCycleDwell,
        83 => CannedCyclePeck,
        84 => CannedCycleTap,
        85 => CannedCycleBore,
        90 => AbsoluteMode,
        91 => IncrementalMode,
        92 => CoordinateOffset,
        _ => return None,
    };

    Some(command_type)
}

/// Look up an M code
pub fn classify_mcode(code: i32) -> Option<CommandType> {
    use CommandType::*;

    let command_type = match code {
        0 => ProgramStop,
        1 => OptionalStop,
        2 | 30 => ProgramEnd,
        3 => SpindleCw,
        4 => SpindleCcw,
        5 => SpindleStop,
        6 => ToolChange,
        7 => CoolantMist,
        8 => CoolantFlood,
        9 => CoolantOff,
        _ => return None,
    };

    Some(command_type)
}

/// Human readable label, e.g. `"G1 (Linear Move)"`
pub fn command_type_to_string(command_type: CommandType) -> &'static str {
    use CommandType::*;

    match command_type {
        RapidMove => "G0 (Rapid Move)",
        LinearMove => "G1 (Linear Move)",
        CwArc => "G2 (Clockwise Arc)",
        CcwArc => "G3 (Counter-clockwise Arc)",
        Dwell => "G4 (Dwell)",
        PlaneXy => "G17 (XY Plane)",
        PlaneXz => "G18 (XZ Plane)",
        PlaneYz => "G19 (YZ Plane)",
        Inches => "G20 (Inches)",
        Millimeters => "G21 (Millimeters)",
        ReturnHome => "G28 (Return Home)",
        ReturnPredefined => "G30 (Return Predefined)",
        CoordinateOffset => "G92 (Coordinate Offset)",
        AbsoluteMode => "G90 (Absolute Mode)",
        IncrementalMode => "G91 (Incremental Mode)",
        FeedRateMode => "G93/G94/G95 (Feed Rate Mode)",
        SpindleCw => "M3 (Spindle CW)",
        SpindleCcw => "M4 (Spindle CCW)",
        SpindleStop => "M5 (Spindle Stop)",
        ToolChange => "M6 (Tool Change)",
        CoolantMist => "M7 (Coolant Mist)",
        CoolantFlood => "M8 (Coolant Flood)",
        CoolantOff => "M9 (Coolant Off)",
        ProgramEnd => "M2/M30 (Program End)",
        ProgramStop => "M0 (Program Stop)",
        OptionalStop => "M1 (Optional Stop)",
        WorkCoord1 => "G54 (Work Coordinates 1)",
        WorkCoord2 => "G55 (Work Coordinates 2)",
        WorkCoord3 => "G56 (Work Coordinates 3)",
        WorkCoord4 => "G57 (Work Coordinates 4)",
        WorkCoord5 => "G58 (Work Coordinates 5)",
        WorkCoord6 => "G59 (Work Coordinates 6)",
        CannedCycleDrill => "G81 (Drill Cycle)",
        CannedCycleDwell => "G82 (Drill Cycle with Dwell)",
        CannedCyclePeck => "G83 (Peck Drill Cycle)",
        CannedCycleTap => "G84 (Tapping Cycle)",
        CannedCycleBore => "G85 (Boring Cycle)",
        CancelCycle => "G80 (Cancel Canned Cycle)",
        Unknown => "Unknown",
    }
}

/// Commands whose effect persists across lines
pub fn is_modal_command(command_type: CommandType) -> bool {
    use CommandType::*;

    matches!(
        command_type,
        RapidMove
            | LinearMove
            | CwArc
            | CcwArc
            | PlaneXy
            | PlaneXz
            | PlaneYz
            | Inches
            | Millimeters
            | AbsoluteMode
            | IncrementalMode
            | WorkCoord1
            | WorkCoord2
            | WorkCoord3
            | WorkCoord4
            | WorkCoord5
            | WorkCoord6
    )
}

/// Commands that move the machine, canned cycles included
pub fn is_motion_command(command_type: CommandType) -> bool {
    use CommandType::*;

    matches!(
        command_type,
        RapidMove
            | LinearMove
            | CwArc
            | CcwArc
            | CannedCycleDrill
            | CannedCycleDwell
            | CannedCyclePeck
            | CannedCycleTap
            | CannedCycleBore
    )
}

/// Arc motion (G2/G3)
pub fn is_arc_command(command_type: CommandType) -> bool {
    matches!(command_type, CommandType::CwArc | CommandType::CcwArc)
}

/// Commands that take X/Y/Z/A/B/C words as their own arguments
pub fn consumes_axis_words(command_type: CommandType) -> bool {
    is_motion_command(command_type)
        || matches!(
            command_type,
            CommandType::ReturnHome | CommandType::ReturnPredefined | CommandType::CoordinateOffset
        )
}
