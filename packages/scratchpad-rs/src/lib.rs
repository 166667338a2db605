pub mod types;
pub mod error;
pub mod config;
pub mod stream;
pub mod filter;
pub mod state_cell;
pub mod bookmark;
pub mod feed;
pub mod pad;
pub mod simulator;

pub use types::StatePoint;
pub use error::{ScratchpadError, Result};
pub use config::PadConfig;
pub use stream::{LineBuffer, StreamingLineClient};
pub use filter::{FilterMode, MovingAverageFilter};
pub use state_cell::SharedStateCell;
pub use bookmark::{rank, Bookmark, BookmarkStore, PageCapture, RankedBookmark, RankedView};
pub use feed::{FeedHandle, FeedStats, FeedStatus, StateFeed};
pub use pad::{PageSource, Renderer, Scratchpad};
pub use simulator::StateSimulator;
