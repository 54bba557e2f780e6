//! Hardware adapter contract consumed by the core and implemented by each
//! backend (simulation by default, serial pluggable behind the same trait).

mod adapter;
mod error;
mod registry;
mod serial_adapter;
mod sim_adapter;

pub use adapter::{HardwareAdapter, HardwareConfig, HardwareStatus};
pub use error::HalError;
pub use registry::AdapterRegistry;
pub use serial_adapter::SerialAdapter;
pub use sim_adapter::SimAdapter;
