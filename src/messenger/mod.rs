mod error;
pub mod max;
mod model;
mod telegram;
pub mod traits;

pub use error::*;
pub use model::*;
pub use telegram::TelegramPlatform;
pub use traits::ChatPlatform;
