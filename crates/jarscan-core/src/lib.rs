pub mod config;
pub mod dispatch;
pub mod entry;
pub mod error;
pub mod filter;
pub mod locator;
pub mod member;

mod remote;
mod source;
mod visit;

pub use config::{NestedMode, RemotePolicy, ScanConfig, USER_AGENT};
pub use dispatch::{ScanResult, Scanner, TraversalKind, scan};
pub use entry::{Content, Entry};
pub use error::ScanError;
pub use filter::{Filter, NamePredicate, PackageFilter, ResourceFilter, TypeFilter, persistence_filters};
pub use locator::{Locator, LocatorError, PhysicalLocation};
pub use member::MemberKind;
