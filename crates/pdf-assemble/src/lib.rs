pub mod assemble;
pub mod codec;
mod constants;
mod history;
mod ledger;
pub mod materialize;
mod options;
mod selection;
mod session;
mod types;

pub use assemble::{Assembled, AssemblyInput, assemble, assemble_sync, save_pdf};
pub use constants::{
    DEFAULT_OUTPUT_NAME, DEFAULT_WATERMARK_COLOR, DEFAULT_WATERMARK_OPACITY,
    DEFAULT_WATERMARK_TEXT, PDF_RENDER_SCALE, WATERMARK_FONT_RATIO,
};
pub use history::History;
pub use ledger::{Ledger, Snapshot};
pub use materialize::{
    LopdfMaterializer, Materialized, MaterializedPage, PageMaterializer, materialize,
};
pub use options::*;
pub use selection::Selection;
pub use session::{ImportFailure, ImportFile, ImportReport, Session, SessionView};
pub use types::*;
