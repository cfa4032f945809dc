pub mod text_input;
pub mod unicode;

pub use text_input::TextInput;
