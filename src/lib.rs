pub mod dataset;
pub mod matrix;
pub mod report;
pub mod screening;
pub mod session;
pub mod snapshot;
pub mod store;
pub mod types;
pub mod verify;

pub use matrix::*;
pub use report::*;
pub use screening::*;
pub use session::*;
pub use snapshot::*;
pub use store::*;
pub use types::*;
pub use verify::*;
