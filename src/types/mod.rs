//! Core type definitions using newtype patterns for type safety.

mod port;
mod scan_id;
mod target;

pub use port::{ParsedPorts, Port, PortError, PortSet};
pub use scan_id::ScanId;
pub use target::{ScanTarget, TargetError};
