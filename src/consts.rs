//! Shared numeric constants for the flowboard engine.

// ── Placement ───────────────────────────────────────────────────

/// Nominal gap between a parent and a placed child, in page units. Also the
/// collision padding used while probing candidates.
pub const PLACEMENT_GAP: f64 = 80.0;

/// Number of spiral levels probed before falling back to the level-0 slot.
pub const PLACEMENT_LEVELS: u32 = 25;

/// Number of compass directions probed per level.
pub const DIRECTION_COUNT: u32 = 8;

// ── Settling ────────────────────────────────────────────────────

/// Render passes to wait before reading back freshly created bindings.
pub const SETTLE_FRAMES: u32 = 2;

/// Default camera pan animation length in milliseconds.
pub const PAN_DURATION_MS: u64 = 300;

// ── Card sizes ──────────────────────────────────────────────────

/// Fixed width of a tweet card.
pub const TWEET_WIDTH: f64 = 400.0;
/// Height estimate for a tweet card before it has measured itself.
pub const TWEET_EST_HEIGHT: f64 = 240.0;

/// Fixed width of a question card.
pub const QUESTION_WIDTH: f64 = 300.0;
/// Height estimate for a question card before it has measured itself.
pub const QUESTION_EST_HEIGHT: f64 = 180.0;

/// Fixed width of a note card.
pub const NOTE_WIDTH: f64 = 280.0;
/// Height estimate for a note card before it has measured itself.
pub const NOTE_EST_HEIGHT: f64 = 160.0;

// ── Bindings ────────────────────────────────────────────────────

/// Normalized anchor used for both terminals of a parent-child connection.
pub const CENTER_ANCHOR: f64 = 0.5;
