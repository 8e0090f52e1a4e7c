pub mod base_convert;
pub mod calculator;
pub mod timestamp;
pub mod web_tools;
