mod ad_dto;
mod ad_query;

pub use ad_dto::*;
pub use ad_query::*;
