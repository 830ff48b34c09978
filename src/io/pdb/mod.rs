mod reader;
mod writer;

pub use reader::read;
pub use writer::{write, write_frame};
