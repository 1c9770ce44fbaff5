//! Output Stream Sizing

/// Channels a single node can carry.
pub const MAX_CHANNELS: usize = 4;

/// Longest line written to the stream, excluding the terminator.
///
/// Worst case data line: 10-digit timestamp plus four channels of
/// `,<raw>,<pct>` = 10 + 4 * 10 = 50. Diagnostics top out around 75.
pub const MAX_LINE_LEN: usize = 96;

/// Diagnostics a single channel can raise in one cycle.
pub const MAX_DIAGNOSTICS_PER_CYCLE: usize = 4;

/// Value written in place of a channel that has no usable reading.
///
/// Negative so it can never be confused with a converter code.
pub const MISSING_VALUE_SENTINEL: i32 = -1;
