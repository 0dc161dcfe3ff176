pub mod config;
pub mod decode;
pub mod domain;
pub mod error;
pub mod harvest;
pub mod output;
pub mod store;
pub mod webhallen;
