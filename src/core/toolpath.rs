//! Toolpath segments
//!
//! Builds one [`ToolpathSegment`] per rapid, linear or arc command, with
//! its length and an estimated duration.

use std::f64::consts::PI;

use serde::Serialize;

use crate::core::state::GCodeState;
use crate::parser::{ArcParameters, CommandType, GCodeCommand, Position};

/// Rate assumed for rapids and for moves without a feed rate, in mm/min
pub const RAPID_RATE: f64 = 10_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SegmentType {
    Rapid,
    Linear,
    ArcCw,
    ArcCcw,
    /// Reserved; canned cycles are not expanded into segments yet
    DrillCycle,
}

impl SegmentType {
    fn from_command(command_type: CommandType) -> Option<Self> {
        match command_type {
            CommandType::RapidMove => Some(Self::Rapid),
            CommandType::LinearMove => Some(Self::Linear),
            CommandType::CwArc => Some(Self::ArcCw),
            CommandType::CcwArc => Some(Self::ArcCcw),
            _ => None,
        }
    }

    pub fn is_arc(self) -> bool {
        matches!(self, Self::ArcCw | Self::ArcCcw)
    }
}

/// Centre and radius of an arc segment
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ArcGeometry {
    pub center: Position,
    pub radius: f64,
}

/// One atomic motion
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolpathSegment {
    pub segment_type: SegmentType,
    pub start: Position,
    pub end: Position,
    /// Present on arc segments whose centre could be resolved
    pub arc: Option<ArcGeometry>,
    pub feed_rate: f64,
    pub spindle_speed: f64,
    pub spindle_on: bool,
    pub coolant_on: bool,
    pub tool_number: i32,
    pub length: f64,
    /// Seconds
    pub estimated_time: f64,
    pub line_number: usize,
}

/// Build the segment for a motion command
///
/// `start` is the position before the command and `end` its resolved
/// target. Feed, spindle, coolant and tool are taken from `state`, which
/// already includes the command's own modal words. Returns `None` for
/// anything that is not a rapid, linear or arc move; canned cycles are not
/// expanded.
pub fn generate_segment(
    command: &GCodeCommand,
    start: Position,
    end: Position,
    state: &GCodeState,
) -> Option<ToolpathSegment> {
    let segment_type = SegmentType::from_command(command.command_type)?;

    let arc = if segment_type.is_arc() {
        resolve_arc_center(&command.arc, &start, &end)
    } else {
        None
    };

    let length = match (segment_type.is_arc(), &arc) {
        (false, _) => start.distance_xyz(&end),
        (true, Some(geometry)) => arc_length(&start, &end, geometry),
        (true, None) => 0.0,
    };

    let estimated_time = if state.feed_rate > 0.0 && segment_type != SegmentType::Rapid {
        length / state.feed_rate * 60.0
    } else {
        length / RAPID_RATE * 60.0
    };

    Some(ToolpathSegment {
        segment_type,
        start,
        end,
        arc,
        feed_rate: state.feed_rate,
        spindle_speed: state.spindle_speed,
        spindle_on: state.spindle_on(),
        coolant_on: state.coolant.is_on(),
        tool_number: state.current_tool,
        length,
        estimated_time,
        line_number: command.line_number,
    })
}

/// Resolve centre and radius of an arc in the XY plane
///
/// With R the centre is approximated by the midpoint of start and end and
/// the sign of R is ignored; of the two possible centres neither is picked.
/// With I/J the centre is `start + (i, j, k)` and the radius its XY distance
/// from `start`. Returns `None` when neither or both formats are given.
pub fn resolve_arc_center(
    arc: &ArcParameters,
    start: &Position,
    end: &Position,
) -> Option<ArcGeometry> {
    match (arc.r, arc.has_center_offset()) {
        (Some(r), false) => Some(ArcGeometry {
            center: Position::new((start.x + end.x) / 2.0, (start.y + end.y) / 2.0, start.z),
            radius: r.abs(),
        }),
        (None, true) => {
            let center = Position::new(
                start.x + arc.i.unwrap_or(0.0),
                start.y + arc.j.unwrap_or(0.0),
                start.z + arc.k.unwrap_or(0.0),
            );
            let radius = (start.x - center.x).hypot(start.y - center.y);
            Some(ArcGeometry { center, radius })
        }
        _ => None,
    }
}

/// Radius times the angular span between start and end
///
/// The span is always the shorter way around, whatever the arc direction.
// TODO: sweep the long way for G2/G3 arcs that pass more than 180 degrees
fn arc_length(start: &Position, end: &Position, geometry: &ArcGeometry) -> f64 {
    let c = &geometry.center;
    let start_angle = (start.y - c.y).atan2(start.x - c.x);
    let end_angle = (end.y - c.y).atan2(end.x - c.x);

    let mut span = (end_angle - start_angle).abs();
    if span > PI {
        span = 2.0 * PI - span;
    }

    geometry.radius * span
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn arc_command(
        command_type: CommandType,
        i: Option<f64>,
        j: Option<f64>,
        r: Option<f64>,
    ) -> GCodeCommand {
        let mut command = GCodeCommand::new(command_type, 1, "");
        command.arc = ArcParameters { i, j, k: None, r };
        command
    }

    #[test]
    fn test_linear_length_and_time() {
        let mut state = GCodeState::new();
        state.feed_rate = 600.0;
        let command = GCodeCommand::new(CommandType::LinearMove, 1, "");
        let seg = generate_segment(
            &command,
            Position::default(),
            Position::new(3.0, 4.0, 0.0),
            &state,
        )
        .unwrap();

        assert_eq!(seg.segment_type, SegmentType::Linear);
        assert!(approx(seg.length, 5.0));
        assert!(approx(seg.estimated_time, 0.5));
        assert!(seg.arc.is_none());
    }

    #[test]
    fn test_rapid_uses_rapid_rate() {
        let mut state = GCodeState::new();
        state.feed_rate = 100.0;
        let command = GCodeCommand::new(CommandType::RapidMove, 1, "");
        let seg = generate_segment(
            &command,
            Position::default(),
            Position::new(0.0, 0.0, 1000.0),
            &state,
        )
        .unwrap();
        assert!(approx(seg.estimated_time, 6.0));
    }

    #[test]
    fn test_rotary_axes_do_not_add_length() {
        let state = GCodeState::new();
        let command = GCodeCommand::new(CommandType::LinearMove, 1, "");
        let mut end = Position::default();
        end.a = 90.0;
        let seg = generate_segment(&command, Position::default(), end, &state).unwrap();
        assert_eq!(seg.length, 0.0);
    }

    #[test]
    fn test_non_motion_has_no_segment() {
        let state = GCodeState::new();
        let dwell = GCodeCommand::new(CommandType::Dwell, 1, "");
        let drill = GCodeCommand::new(CommandType::CannedCycleDrill, 1, "");
        let p = Position::default();
        assert!(generate_segment(&dwell, p, p, &state).is_none());
        assert!(generate_segment(&drill, p, p, &state).is_none());
    }

    #[test]
    fn test_ij_arc_half_circle() {
        let state = GCodeState::new();
        let command = arc_command(CommandType::CwArc, Some(5.0), Some(0.0), None);
        let seg = generate_segment(
            &command,
            Position::new(10.0, 10.0, 0.0),
            Position::new(20.0, 10.0, 0.0),
            &state,
        )
        .unwrap();

        let geometry = seg.arc.unwrap();
        assert_eq!(geometry.center, Position::new(15.0, 10.0, 0.0));
        assert!(approx(geometry.radius, 5.0));
        assert!(approx(seg.length, 5.0 * PI));
    }

    #[test]
    fn test_quarter_arc_length() {
        let geometry = resolve_arc_center(
            &ArcParameters {
                i: Some(-10.0),
                ..ArcParameters::default()
            },
            &Position::new(10.0, 0.0, 0.0),
            &Position::new(0.0, 10.0, 0.0),
        )
        .unwrap();
        let length = arc_length(
            &Position::new(10.0, 0.0, 0.0),
            &Position::new(0.0, 10.0, 0.0),
            &geometry,
        );
        assert!(approx(length, 10.0 * PI / 2.0));
    }

    #[test]
    fn test_long_way_arc_takes_short_span() {
        // 270 degree sweep is measured as 90
        let geometry = ArcGeometry {
            center: Position::default(),
            radius: 1.0,
        };
        let length = arc_length(
            &Position::new(1.0, 0.0, 0.0),
            &Position::new(0.0, -1.0, 0.0),
            &geometry,
        );
        assert!(approx(length, PI / 2.0));
    }

    #[test]
    fn test_radius_format_uses_midpoint() {
        let geometry = resolve_arc_center(
            &ArcParameters {
                r: Some(-5.0),
                ..ArcParameters::default()
            },
            &Position::new(0.0, 0.0, 2.0),
            &Position::new(10.0, 0.0, 4.0),
        )
        .unwrap();
        assert_eq!(geometry.center, Position::new(5.0, 0.0, 2.0));
        assert_eq!(geometry.radius, 5.0);
    }

    #[test]
    fn test_unresolvable_arc_still_emits_segment() {
        let state = GCodeState::new();
        let both = arc_command(CommandType::CcwArc, Some(1.0), None, Some(1.0));
        let seg = generate_segment(
            &both,
            Position::default(),
            Position::new(2.0, 0.0, 0.0),
            &state,
        )
        .unwrap();
        assert_eq!(seg.segment_type, SegmentType::ArcCcw);
        assert!(seg.arc.is_none());
        assert_eq!(seg.length, 0.0);
    }
}
