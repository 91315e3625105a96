#![allow(dead_code)]
pub mod test_prelude;
pub mod test_utils;
