pub mod user_router;
pub mod bonafide_router;
