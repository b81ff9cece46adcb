mod selection_handler;

pub use selection_handler::*;
