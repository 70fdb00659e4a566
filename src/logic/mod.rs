//! Competition engine operations: draw, advancement, lifecycle, standings.

mod advancement;
mod bracket;
mod lifecycle;
mod ranking;

pub use advancement::resolve_advancement;
pub use bracket::{draw_bracket, feeding_side, reset_bracket};
pub use lifecycle::{
    apply_score_delta, cancel_match, control_clock, declare_walkover, remove_match,
    schedule_match, ClockAction,
};
pub use ranking::compute_ranking;
