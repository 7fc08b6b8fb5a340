pub mod state;
pub mod synchronizer;

pub use state::{RenderedView, ViewState, AWAITING_TEXT, LINK_LOST_TEXT};
pub use synchronizer::{SyncSettings, ViewSynchronizer};
