pub mod email;
pub mod factory;
pub mod media;
pub mod permissions;
pub mod repositories;
