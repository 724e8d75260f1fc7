//! Input event handling: key codes, event types and sampling

mod event;
pub mod keymap;
mod sampler;

pub use event::{InputEvent, InputKind, MouseButton, RawInput};
pub use keymap::{get_key_info, KeyCode, KeyInfo, KEYMAP};
pub use sampler::{Dispatch, EventBus, EventSampler, KeyDisposition, Subscription};
