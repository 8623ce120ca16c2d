pub mod user_service;
pub mod bonafide_service;
