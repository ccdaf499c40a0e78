//! Tests for toolpath generation and program statistics
use gcode_toolpath::core::{RAPID_RATE, Rate};
use gcode_toolpath::{GCodeParser, Position, SegmentType};

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-6
}

const POCKET: &str = "\
(simple pocket)
G21 G90
T1 M6
M3 S10000
G0 Z5
G0 X0 Y0
G1 Z-1 F200
G1 X20 F800
G1 Y10
G3 X10 Y20 I-10 J0
G2 X0 Y10 R10
G1 X0 Y0
G0 Z5
M5
M30
";

#[test]
fn test_pocket_segment_sequence() {
    let mut parser = GCodeParser::new();
    assert!(parser.parse_string(POCKET));
    assert!(parser.errors().is_empty());

    let types: Vec<SegmentType> = parser.toolpath().iter().map(|s| s.segment_type).collect();
    assert_eq!(
        types,
        vec![
            SegmentType::Rapid,
            SegmentType::Rapid,
            SegmentType::Linear,
            SegmentType::Linear,
            SegmentType::Linear,
            SegmentType::ArcCcw,
            SegmentType::ArcCw,
            SegmentType::Linear,
            SegmentType::Rapid,
        ]
    );
}

#[test]
fn test_segments_chain_end_to_start() {
    let mut parser = GCodeParser::new();
    parser.parse_string(POCKET);

    for pair in parser.toolpath().windows(2) {
        assert_eq!(pair[0].end, pair[1].start, "gap before line {}", pair[1].line_number);
    }
    let last = parser.toolpath().last().unwrap();
    assert_eq!(last.end, parser.state().current_position);
}

#[test]
fn test_center_format_arc_geometry() {
    let mut parser = GCodeParser::new();
    parser.parse_string(POCKET);

    let arc = &parser.toolpath()[5];
    assert_eq!(arc.start, Position::new(20.0, 10.0, -1.0));
    assert_eq!(arc.end, Position::new(10.0, 20.0, -1.0));
    let geometry = arc.arc.expect("center format resolves");
    assert_eq!(geometry.center, Position::new(10.0, 10.0, -1.0));
    assert!(approx(geometry.radius, 10.0));
    assert!(approx(arc.length, 10.0 * std::f64::consts::FRAC_PI_2));
}

#[test]
fn test_radius_format_arc_uses_midpoint() {
    let mut parser = GCodeParser::new();
    parser.parse_string(POCKET);

    let arc = &parser.toolpath()[6];
    let geometry = arc.arc.expect("radius format resolves");
    assert_eq!(geometry.center, Position::new(5.0, 15.0, -1.0));
    assert!(approx(geometry.radius, 10.0));
}

#[test]
fn test_unresolved_arc_still_emitted() {
    let mut parser = GCodeParser::new();
    parser.parse_string("G2 X10 Y0\n");

    assert_eq!(parser.errors().len(), 1);
    let segment = &parser.toolpath()[0];
    assert_eq!(segment.segment_type, SegmentType::ArcCw);
    assert!(segment.arc.is_none());
    assert_eq!(segment.length, 0.0);
    assert_eq!(parser.state().current_position, Position::new(10.0, 0.0, 0.0));
}

#[test]
fn test_feed_on_motion_line_applies_to_that_segment() {
    let mut parser = GCodeParser::new();
    parser.parse_string("G1 X10 F300\nG1 X20 F600\n");

    let toolpath = parser.toolpath();
    assert_eq!(toolpath[0].feed_rate, 300.0);
    assert_eq!(toolpath[1].feed_rate, 600.0);
    assert!(approx(toolpath[0].estimated_time, 2.0));
    assert!(approx(toolpath[1].estimated_time, 1.0));
}

#[test]
fn test_linear_without_feed_uses_rapid_rate() {
    let mut parser = GCodeParser::new();
    parser.parse_string("G1 X100\n");
    let expected = 100.0 / RAPID_RATE * 60.0;
    assert!(approx(parser.toolpath()[0].estimated_time, expected));
}

#[test]
fn test_canned_cycle_moves_without_segment() {
    let mut parser = GCodeParser::new();
    parser.parse_string("G81 X5 Y5 Z-2 R1 F100\nG80\n");

    assert!(parser.toolpath().is_empty());
    let state = parser.state();
    assert_eq!(state.current_position, Position::new(5.0, 5.0, -2.0));
    assert!(approx(state.retract_height, 1.0));
    assert!(approx(state.feed_rate, 100.0));
}

#[test]
fn test_statistics_match_toolpath() {
    let mut parser = GCodeParser::new();
    parser.parse_string(POCKET);

    let stats = parser.statistics();
    let toolpath = parser.toolpath();

    let count = |t: SegmentType| toolpath.iter().filter(|s| s.segment_type == t).count();
    assert_eq!(stats.rapid_moves, count(SegmentType::Rapid));
    assert_eq!(stats.linear_moves, count(SegmentType::Linear));
    assert_eq!(
        stats.arc_moves,
        count(SegmentType::ArcCw) + count(SegmentType::ArcCcw)
    );

    let total: f64 = toolpath.iter().map(|s| s.length).sum();
    let time: f64 = toolpath.iter().map(|s| s.estimated_time).sum();
    assert!(approx(stats.total_distance, total));
    assert!(approx(stats.rapid_distance + stats.cutting_distance, stats.total_distance));
    assert!(approx(stats.estimated_time, time));
}

#[test]
fn test_line_counters_and_tools() {
    let mut parser = GCodeParser::new();
    parser.parse_string(POCKET);

    let stats = parser.statistics();
    assert_eq!(stats.total_lines, 15);
    assert_eq!(stats.comment_lines, 1);
    assert_eq!(stats.command_lines, 14);
    assert_eq!(stats.error_lines, 0);
    assert_eq!(stats.tool_changes, 1);
    assert!(stats.tools_used.contains(&1));
}

#[test]
fn test_bounds_cover_visited_positions() {
    let mut parser = GCodeParser::new();
    parser.parse_string(POCKET);

    let (min, max) = parser.statistics().bounds().expect("positions recorded");
    assert!(approx(min.x, 0.0));
    assert!(approx(min.y, 0.0));
    assert!(approx(min.z, -1.0));
    assert!(approx(max.x, 20.0));
    assert!(approx(max.y, 20.0));
    assert!(approx(max.z, 5.0));
}

#[test]
fn test_no_bounds_without_motion() {
    let mut parser = GCodeParser::new();
    parser.parse_string("G21\nM3 S1000\n");
    assert!(parser.statistics().bounds().is_none());
}

#[test]
fn test_usage_per_feed_and_speed() {
    let mut parser = GCodeParser::new();
    parser.parse_string("M3 S5000\nG1 X10 F100\nG1 X30 F200\nM3 S8000\nG1 X40\n");

    let stats = parser.statistics();
    assert!(approx(stats.feed_rates[&Rate(100.0)], 10.0));
    assert!(approx(stats.feed_rates[&Rate(200.0)], 30.0));

    let at_5000 = stats.spindle_speeds[&Rate(5000.0)];
    assert!(approx(at_5000, 10.0 / 100.0 * 60.0 + 20.0 / 200.0 * 60.0));
    let at_8000 = stats.spindle_speeds[&Rate(8000.0)];
    assert!(approx(at_8000, 10.0 / 200.0 * 60.0));
}
