mod best;
mod scan;

pub use best::run_best;
pub use scan::{load_payload, run_scan};
