//! Contract-first source generator: OpenAPI-style contract in, model /
//! client / server-stub sources out.

pub mod assemble;
pub mod cli;
pub mod config;
pub mod contract;
pub mod emit;
pub mod error;
pub mod hint;
pub mod mapper;
pub mod node;
pub mod normalize;
pub mod render;
