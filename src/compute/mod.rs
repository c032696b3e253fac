//! Quantization stages: validation, attribute filtering, grid assignment,
//! aggregation and row assembly, plus GeoJSON decoding of input features.

pub mod accumulator;
pub mod aggregate;
pub mod assemble;
pub mod filter;
pub mod geojson;
pub mod grid;
pub mod validation;
