//! Change record types for Packtrace.

mod category;
mod kind;
mod process;
mod record;
mod target;

pub use category::ChangeCategory;
pub use kind::ChangeKind;
pub use process::ProcessInfo;
pub use record::ChangeRecord;
pub use target::{RegistryHive, RegistryTarget, TargetParseError};
