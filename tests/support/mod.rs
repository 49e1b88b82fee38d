#![allow(dead_code)]

pub mod organization;
