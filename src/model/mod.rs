pub mod instrument;
pub mod record;
pub mod snapshot;

pub use instrument::{IndexPrice, InstrumentDescriptor, InstrumentSummary};
pub use record::{OptionRecord, OptionType};
pub use snapshot::{Snapshot, merge_records};
