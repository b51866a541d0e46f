//! The track catalog: output records and the pure derivation helpers
//! (filename → id/title, cue points, palette colors) plus the JSON writer.

mod color;
mod cues;
mod derive;
mod record;
mod writer;

pub use color::{PALETTE, waveform_color};
pub use cues::{CueError, generate_cue_points};
pub use derive::{track_id, track_title};
pub use record::{TrackCatalog, TrackRecord};
pub use writer::{WriteError, write_catalog};
