//! nvx core: version specifier parsing, remote catalog aggregation,
//! resolution, and total ordering for a Node.js runtime switcher.

pub mod config;
pub mod local;
pub mod log;
pub mod version;
