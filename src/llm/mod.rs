pub mod client;
pub mod generate;
pub mod json_utils;
