// src/lib.rs

pub mod platforms;
pub mod services;

pub use mobqueue_common::error::Error;
