pub mod events;
pub mod notice;
