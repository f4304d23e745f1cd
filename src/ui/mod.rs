//! Terminal presentation shared by the chat and configure commands.

use inquire::InquireError;

mod spinner;
mod theme;

pub use spinner::Spinner;
pub use theme::Style;

/// Returns `true` when the user left a prompt with Escape or Ctrl+C.
pub const fn is_prompt_cancelled(err: &InquireError) -> bool {
    matches!(
        err,
        InquireError::OperationCanceled | InquireError::OperationInterrupted
    )
}
