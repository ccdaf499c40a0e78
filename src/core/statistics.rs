//! Program statistics
//!
//! Line and move counters, distance and time totals, the bounding box of
//! visited positions, and per feed-rate / per spindle-speed usage.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use serde::{Serialize, Serializer};

use crate::core::state::GCodeState;
use crate::core::toolpath::{SegmentType, ToolpathSegment};
use crate::parser::{CommandType, GCodeCommand, Position};

/// A feed rate or spindle speed usable as a map key
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(transparent)]
pub struct Rate(pub f64);

impl Rate {
    /// `-0.0` is stored as `0.0` so both map to one key
    pub fn new(value: f64) -> Self {
        Self(value + 0.0)
    }
}

impl PartialEq for Rate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Rate {}

impl PartialOrd for Rate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Rate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Statistics {
    pub total_lines: usize,
    pub command_lines: usize,
    pub comment_lines: usize,
    pub error_lines: usize,

    pub rapid_moves: usize,
    pub linear_moves: usize,
    pub arc_moves: usize,
    pub tool_changes: usize,

    pub total_distance: f64,
    pub rapid_distance: f64,
    pub cutting_distance: f64,
    /// Seconds
    pub estimated_time: f64,

    pub min_bounds: Position,
    pub max_bounds: Position,
    pub bounds_valid: bool,

    pub tools_used: BTreeSet<i32>,
    /// Feed rate to cutting distance at that rate
    #[serde(serialize_with = "rate_pairs")]
    pub feed_rates: BTreeMap<Rate, f64>,
    /// Spindle speed to seconds spent cutting at that speed
    #[serde(serialize_with = "rate_pairs")]
    pub spindle_speeds: BTreeMap<Rate, f64>,
}

impl Statistics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Bounding box of visited positions, if any position was recorded
    pub fn bounds(&self) -> Option<(Position, Position)> {
        self.bounds_valid.then_some((self.min_bounds, self.max_bounds))
    }

    /// Account for one processed command
    ///
    /// `state` is the state after the command was applied and `segment` the
    /// motion it produced, if any.
    pub fn record_command(
        &mut self,
        command: &GCodeCommand,
        state: &GCodeState,
        segment: Option<&ToolpathSegment>,
    ) {
        match command.command_type {
            CommandType::RapidMove => self.rapid_moves += 1,
            CommandType::LinearMove => self.linear_moves += 1,
            CommandType::CwArc | CommandType::CcwArc => self.arc_moves += 1,
            CommandType::ToolChange => {
                self.tool_changes += 1;
                if let Some(tool) = command.tool_number.filter(|t| *t >= 0) {
                    self.tools_used.insert(tool);
                }
            }
            _ => {}
        }

        if command.position.any_xyz() {
            self.update_bounds(&state.current_position);
        }

        if let Some(feed) = command.feed_rate.filter(|f| *f >= 0.0) {
            self.feed_rates.entry(Rate::new(feed)).or_insert(0.0);
        }

        if let Some(segment) = segment {
            self.record_segment(segment);
        }
    }

    fn record_segment(&mut self, segment: &ToolpathSegment) {
        self.total_distance += segment.length;
        self.estimated_time += segment.estimated_time;

        if segment.segment_type == SegmentType::Rapid {
            self.rapid_distance += segment.length;
            return;
        }

        self.cutting_distance += segment.length;
        *self.feed_rates.entry(Rate::new(segment.feed_rate)).or_insert(0.0) += segment.length;
        if segment.spindle_on {
            *self
                .spindle_speeds
                .entry(Rate::new(segment.spindle_speed))
                .or_insert(0.0) += segment.estimated_time;
        }
    }

    pub fn update_bounds(&mut self, pos: &Position) {
        if !self.bounds_valid {
            self.min_bounds = *pos;
            self.max_bounds = *pos;
            self.bounds_valid = true;
            return;
        }

        self.min_bounds.x = self.min_bounds.x.min(pos.x);
        self.min_bounds.y = self.min_bounds.y.min(pos.y);
        self.min_bounds.z = self.min_bounds.z.min(pos.z);
        self.max_bounds.x = self.max_bounds.x.max(pos.x);
        self.max_bounds.y = self.max_bounds.y.max(pos.y);
        self.max_bounds.z = self.max_bounds.z.max(pos.z);
    }
}

/// Float keys are not valid JSON object keys; write `[rate, value]` pairs
fn rate_pairs<S: Serializer>(map: &BTreeMap<Rate, f64>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(map.iter().map(|(rate, value)| (rate.0, *value)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_start_invalid() {
        let mut stats = Statistics::new();
        assert!(stats.bounds().is_none());

        stats.update_bounds(&Position::new(1.0, -2.0, 3.0));
        stats.update_bounds(&Position::new(-4.0, 5.0, 0.0));

        let (min, max) = stats.bounds().unwrap();
        assert_eq!(min, Position::new(-4.0, -2.0, 0.0));
        assert_eq!(max, Position::new(1.0, 5.0, 3.0));
    }

    #[test]
    fn test_tool_changes_and_tools_used() {
        let mut stats = Statistics::new();
        let state = GCodeState::new();
        let mut change = GCodeCommand::new(CommandType::ToolChange, 1, "M6 T2");
        change.tool_number = Some(2);
        stats.record_command(&change, &state, None);
        stats.record_command(&change, &state, None);

        assert_eq!(stats.tool_changes, 2);
        assert_eq!(stats.tools_used.len(), 1);
        assert!(stats.tools_used.contains(&2));
    }

    #[test]
    fn test_rate_keys_order() {
        let mut rates = BTreeMap::new();
        rates.insert(Rate(1500.0), 1.0);
        rates.insert(Rate(300.0), 2.0);
        rates.insert(Rate(300.0), 3.0);
        let keys: Vec<f64> = rates.keys().map(|r| r.0).collect();
        assert_eq!(keys, vec![300.0, 1500.0]);
    }

    #[test]
    fn test_negative_zero_feed_shares_zero_key() {
        let mut stats = Statistics::new();
        let state = GCodeState::new();
        let mut command = GCodeCommand::new(CommandType::LinearMove, 1, "G1 F-0");
        command.feed_rate = Some(-0.0);
        stats.record_command(&command, &state, None);
        command.feed_rate = Some(0.0);
        stats.record_command(&command, &state, None);

        assert_eq!(stats.feed_rates.len(), 1);
        assert!(stats.feed_rates.keys().all(|rate| rate.0.is_sign_positive()));
    }

    #[test]
    fn test_reset_zeroes_everything() {
        let mut stats = Statistics::new();
        stats.total_lines = 4;
        stats.update_bounds(&Position::default());
        stats.reset();
        assert_eq!(stats, Statistics::default());
    }
}
