//! External data sources: the free dictionary API and the video platform.

pub mod bilibili;
pub mod dictionary;
