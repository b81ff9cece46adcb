mod ad;

pub use ad::*;
