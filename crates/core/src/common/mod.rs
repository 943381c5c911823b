//! Common types shared by every part of the simulator.
//!
//! 1. **Geometry:** Address decomposition into set index, tag, and line-aligned chunks.
//! 2. **Access kinds:** Load/store classification.
//! 3. **Errors:** Construction, configuration, and trace errors.

/// Line geometry and address decomposition.
pub mod addr;

/// Memory access type definitions.
pub mod data;

/// Error types.
pub mod error;

pub use addr::{LineChunk, LineGeometry, LineSplit};
pub use data::AccessKind;
pub use error::{BuildError, ConfigError, TraceError};
