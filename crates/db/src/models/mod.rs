//! Row structs and DTOs.
//!
//! Each submodule contains a `FromRow` entity struct matching the table row
//! plus the create/filter DTOs its repository accepts.

pub mod access_log;
pub mod alert;
pub mod guest;
pub mod notification;
pub mod remark;
pub mod station;
pub mod user;
