//! clima-bootstrap - 统一服务启动骨架
//!
//! gateway 与 weather 服务复用的启动逻辑

mod health;
mod runtime;
mod server;
mod shutdown;

pub use health::*;
pub use runtime::*;
pub use server::*;
pub use shutdown::*;
