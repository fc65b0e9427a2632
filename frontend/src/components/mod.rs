//! UI 组件层

pub mod feed;
pub mod login;
pub mod notice;
pub mod profile;
pub mod register;
pub mod video;
