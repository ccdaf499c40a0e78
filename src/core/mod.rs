//! Core Interpreter Logic
//!
//! Modal state, toolpath segment generation and statistics.

pub mod state;
pub mod statistics;
pub mod toolpath;

pub use state::{
    CoolantState, CoordinateSystem, FeedRateMode, GCodeState, Plane, PositionMode, SpindleState,
    Units,
};
pub use statistics::{Rate, Statistics};
pub use toolpath::{
    ArcGeometry, RAPID_RATE, SegmentType, ToolpathSegment, generate_segment, resolve_arc_center,
};
