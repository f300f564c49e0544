#![forbid(unsafe_code)]

pub mod batch;
pub mod color;
pub mod error;
pub mod instantiate;
pub mod layout;
pub mod overlay;
pub mod raster;
pub mod record;
pub mod svg;
pub mod text;

pub use batch::{BatchOptions, BatchReport, DirectorySink, OutputSink, RecordOutcome, run_batch};
pub use color::{Gradient, TeamColorPalette, derive_gradient, hex_to_hsl, hsl_to_hex};
pub use error::{TeamcardError, TeamcardResult};
pub use instantiate::{Instantiator, Template};
pub use overlay::{FetchOutcome, MapFetcher, OfflineFetcher, StaticMapFetcher};
pub use raster::{Rasterizer, SvgRasterizer};
pub use record::{Record, load_records};
pub use text::{NoteBlock, wrap_notes, wrap_title};
