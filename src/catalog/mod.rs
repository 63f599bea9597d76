//! Entry and prize category catalog.
//!
//! The catalog is a read-only table loaded once per run:
//!
//! - **Entry categories** describe who a participant is (`M40`, `Mixed`, ...)
//! - **Prize categories** describe what can be won, with quotas and exclusivity
//! - **Eligibility** decides which entry categories may win which prizes
//!
//! A default catalog covering common UK road-race age groups and relay team
//! categories is embedded at compile time; races may supply their own JSON file
//! with the same layout.

pub mod eligibility;
pub mod store;
