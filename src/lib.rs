//! Control client for a Rigol DSA815 spectrum analyzer over VXI-11.
//!
//! The [`Dsa815`] facade exposes one method per instrument capability:
//! tracking generator, frequency/bandwidth/attenuation settings, trace and
//! sweep control, single-sweep measurement with completion polling, and the
//! instrument's mass-storage commands. Setters validate locally before any
//! SCPI text is sent and return the value the instrument actually accepted.

pub mod error;
pub mod instrument;
pub mod limits;
pub mod scpi;
pub mod trace;
pub mod transport;
pub mod types;

// Re-export the primary types so users can depend on the crate
// without knowing the internal module layout.
pub use error::{InstrumentError, Result};
pub use instrument::Dsa815;
pub use trace::{Sweep, SweepPoint};
pub use transport::{Transport, Vxi11Transport};
pub use types::{DataFormat, Trace, TraceLabel, TraceMode};
