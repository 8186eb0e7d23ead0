//! Deterministic per-master colors.
//!
//! Every master gets a stable hue derived from their id, so calendars
//! render the same palette on every client without storing color state.

use serde::Serialize;

/// The three CSS color strings a calendar needs for one master:
/// a pale background, a saturated indicator dot, and a border.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MasterColors {
    pub background: String,
    pub indicator: String,
    pub border: String,
}

/// Rolling 32-bit string hash (`h = h * 31 + c`, expressed as shift and
/// subtract) folded into a hue. Wrapping arithmetic keeps the result
/// identical across platforms.
fn hue_for(id: &str) -> u32 {
    let mut hash: i32 = 0;
    for unit in id.encode_utf16() {
        hash = hash.wrapping_shl(5).wrapping_sub(hash).wrapping_add(unit as i32);
    }
    hash.unsigned_abs() % 360
}

/// Maps a master id to its calendar colors.
pub fn assign_color(master_id: &str) -> MasterColors {
    let hue = hue_for(master_id);
    MasterColors {
        background: format!("hsl({hue}, 80%, 85%)"),
        indicator: format!("hsl({hue}, 100%, 45%)"),
        border: format!("hsl({hue}, 85%, 55%)"),
    }
}
