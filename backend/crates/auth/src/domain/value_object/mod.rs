//! Value Object Module

pub mod password;
pub mod user_id;
pub mod user_name;
