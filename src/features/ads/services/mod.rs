mod ad_filter;
mod ad_service;

pub use ad_filter::AdFilter;
pub use ad_service::AdService;
