pub mod display;
pub mod error;
pub mod export;
pub mod planning;
pub mod remote;
pub mod seed;
pub mod web;
