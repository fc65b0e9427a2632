//! 原生 Web API 封装模块
//!
//! 此模块提供对浏览器原生 API 的轻量级封装（fetch、Storage、History、
//! confirm、setTimeout），以及不依赖 DOM 的路由与守卫逻辑。

pub mod confirm;
pub mod guards;
pub mod http;
pub mod meta;
pub mod navigate;
pub mod route;
pub mod router;
pub mod storage;
pub mod timer;
