pub mod configuration;
pub mod controller;
pub mod error_handling;
pub mod image_storage;
pub mod notification;
pub mod storage;
pub mod web_interface;
