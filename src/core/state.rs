//! Modal machine state
//!
//! [`GCodeState`] holds everything that persists between lines of a
//! program. It changes only through [`GCodeState::update_modal_state`].

use serde::Serialize;

use crate::parser::{AxisWords, CommandType, GCodeCommand, Position, is_motion_command};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum Units {
    #[default]
    Millimeters,
    Inches,
}

/// Active work coordinate system
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum CoordinateSystem {
    #[default]
    G54,
    G55,
    G56,
    G57,
    G58,
    G59,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum Plane {
    #[default]
    Xy,
    Xz,
    Yz,
}

/// G90/G91
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum PositionMode {
    #[default]
    Absolute,
    Incremental,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum FeedRateMode {
    #[default]
    UnitsPerMinute,
    InverseTime,
    UnitsPerRev,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum SpindleState {
    #[default]
    Off,
    Cw,
    Ccw,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CoolantState {
    pub mist: bool,
    pub flood: bool,
}

impl CoolantState {
    pub fn is_on(&self) -> bool {
        self.mist || self.flood
    }
}

/// Persistent state of the G-code interpreter
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GCodeState {
    pub current_position: Position,
    pub work_offset: Position,
    /// Motion used by lines that carry axis words but no G code
    pub motion_mode: CommandType,
    pub units: Units,
    pub coordinate_system: CoordinateSystem,
    pub plane: Plane,
    pub position_mode: PositionMode,
    pub feed_rate_mode: FeedRateMode,
    pub spindle_state: SpindleState,
    pub coolant: CoolantState,
    pub current_tool: i32,
    pub feed_rate: f64,
    pub spindle_speed: f64,
    pub dwell_time: f64,
    pub retract_height: f64,
    pub peck_increment: f64,
    pub program_running: bool,
    pub line_number: usize,
}

impl Default for GCodeState {
    fn default() -> Self {
        Self::new()
    }
}

impl GCodeState {
    pub fn new() -> Self {
        Self {
            current_position: Position::default(),
            work_offset: Position::default(),
            motion_mode: CommandType::RapidMove,
            units: Units::default(),
            coordinate_system: CoordinateSystem::default(),
            plane: Plane::default(),
            position_mode: PositionMode::default(),
            feed_rate_mode: FeedRateMode::default(),
            spindle_state: SpindleState::default(),
            coolant: CoolantState::default(),
            current_tool: 0,
            feed_rate: 0.0,
            spindle_speed: 0.0,
            dwell_time: 0.0,
            retract_height: 0.0,
            peck_increment: 0.0,
            program_running: true,
            line_number: 0,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    pub fn spindle_on(&self) -> bool {
        self.spindle_state != SpindleState::Off
    }

    /// Position the axis words lead to from the current position
    ///
    /// Absent axes keep their current value in both modes.
    pub fn resolve_target(&self, words: &AxisWords) -> Position {
        match self.position_mode {
            PositionMode::Absolute => words.apply_absolute(&self.current_position),
            PositionMode::Incremental => words.apply_incremental(&self.current_position),
        }
    }

    /// Apply one command to the modal state
    pub fn update_modal_state(&mut self, command: &GCodeCommand) {
        use CommandType::*;

        match command.command_type {
            RapidMove | LinearMove | CwArc | CcwArc => self.motion_mode = command.command_type,
            AbsoluteMode => self.position_mode = PositionMode::Absolute,
            IncrementalMode => self.position_mode = PositionMode::Incremental,
            Millimeters => self.units = Units::Millimeters,
            Inches => self.units = Units::Inches,
            PlaneXy => self.plane = Plane::Xy,
            PlaneXz => self.plane = Plane::Xz,
            PlaneYz => self.plane = Plane::Yz,
            WorkCoord1 => self.coordinate_system = CoordinateSystem::G54,
            WorkCoord2 => self.coordinate_system = CoordinateSystem::G55,
            WorkCoord3 => self.coordinate_system = CoordinateSystem::G56,
            WorkCoord4 => self.coordinate_system = CoordinateSystem::G57,
            WorkCoord5 => self.coordinate_system = CoordinateSystem::G58,
            WorkCoord6 => self.coordinate_system = CoordinateSystem::G59,
            SpindleCw => self.spindle_state = SpindleState::Cw,
            SpindleCcw => self.spindle_state = SpindleState::Ccw,
            SpindleStop => self.spindle_state = SpindleState::Off,
            CoolantMist => self.coolant.mist = true,
            CoolantFlood => self.coolant.flood = true,
            CoolantOff => self.coolant = CoolantState::default(),
            ToolChange => {
                if let Some(tool) = command.tool_number.filter(|t| *t >= 0) {
                    self.current_tool = tool;
                }
            }
            CoordinateOffset => self.set_work_offset(&command.position),
            ProgramEnd | ProgramStop => self.program_running = false,
            _ => {}
        }

        if let Some(feed) = non_negative(command.feed_rate) {
            self.feed_rate = feed;
        }
        if let Some(speed) = non_negative(command.spindle_speed) {
            self.spindle_speed = speed;
        }
        if let Some(dwell) = non_negative(command.dwell_time) {
            self.dwell_time = dwell;
        }
        if let Some(retract) = command.retract_height {
            self.retract_height = retract;
        }
        if let Some(peck) = non_negative(command.peck_increment) {
            self.peck_increment = peck;
        }

        if is_motion_command(command.command_type) || command.position.any() {
            self.current_position = self.resolve_target(&command.position);
        }
    }

    /// G92: make the current position read as the given values
    fn set_work_offset(&mut self, words: &AxisWords) {
        let current = self.current_position;
        let offset = &mut self.work_offset;
        if let Some(x) = words.x {
            offset.x = current.x - x;
        }
        if let Some(y) = words.y {
            offset.y = current.y - y;
        }
        if let Some(z) = words.z {
            offset.z = current.z - z;
        }
        if let Some(a) = words.a {
            offset.a = current.a - a;
        }
        if let Some(b) = words.b {
            offset.b = current.b - b;
        }
        if let Some(c) = words.c {
            offset.c = current.c - c;
        }
    }

    /// Machine coordinates to work coordinates
    pub fn transform_to_work_coordinates(&self, machine: &Position) -> Position {
        let o = &self.work_offset;
        Position {
            x: machine.x - o.x,
            y: machine.y - o.y,
            z: machine.z - o.z,
            a: machine.a - o.a,
            b: machine.b - o.b,
            c: machine.c - o.c,
        }
    }

    /// Work coordinates to machine coordinates
    pub fn transform_to_machine_coordinates(&self, work: &Position) -> Position {
        let o = &self.work_offset;
        Position {
            x: work.x + o.x,
            y: work.y + o.y,
            z: work.z + o.z,
            a: work.a + o.a,
            b: work.b + o.b,
            c: work.c + o.c,
        }
    }
}

fn non_negative(value: Option<f64>) -> Option<f64> {
    value.filter(|v| *v >= 0.0)
}
