pub mod build;
pub mod list;
pub mod register_context;
pub mod register_domain;
pub mod register_instance;
pub mod show;
