//! Wire types and request headers shared by the calls this service makes to
//! third-party channel sources.

pub mod headers;
pub mod structs;
