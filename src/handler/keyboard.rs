use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

use crate::messenger::KeyboardOption;

/// One button per row, in the order given.
pub fn get_format_keyboard(options: &[KeyboardOption]) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(
        options
            .iter()
            .map(|option| vec![InlineKeyboardButton::callback(option.text.clone(), option.payload.clone())]),
    )
}
