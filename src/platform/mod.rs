mod error;
mod model;
pub mod traits;
mod util;
mod ytdlp;

pub use error::*;
pub use model::*;
pub use traits::MediaExtractor;
pub use util::*;
pub use ytdlp::YtDlp;
