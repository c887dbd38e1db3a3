//! Renderer-facing output. The simulation never draws; it only fills these
//! instance buffers.

pub mod instance;
