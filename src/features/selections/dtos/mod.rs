mod selection_dto;

pub use selection_dto::*;
