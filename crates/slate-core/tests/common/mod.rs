#![allow(dead_code)]

pub mod docs;
pub mod fixtures;
