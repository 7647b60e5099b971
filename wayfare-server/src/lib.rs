//! Wayfare Server - 预订与服务市场平台后端
//!
//! # 模块结构
//!
//! ```text
//! wayfare-server/src/
//! ├── core/          # 配置、状态、服务器启动
//! ├── auth/          # JWT 认证、角色中间件、限流
//! ├── db/            # SQLite 连接池、迁移、仓库层
//! ├── pricing/       # 报价计算与优惠券评估 (核心业务规则)
//! ├── gateway/       # 支付网关客户端与 webhook 签名
//! ├── services/      # 进程内服务 (通知分发)
//! ├── api/           # HTTP 路由和处理器
//! └── utils/         # 错误、日志、校验
//! ```

pub mod api;
pub mod auth;
pub mod core;
pub mod db;
pub mod gateway;
pub mod pricing;
pub mod services;
pub mod utils;

// Re-export 公共类型
pub use auth::{CurrentUser, JwtService};
pub use core::{Config, Server, ServerState};
pub use utils::{AppError, AppResponse, AppResult};
pub use utils::logger::init_logger;

// Security logging macro - 支持 tracing 格式说明符
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}

pub fn print_banner() {
    println!(
        r#"
 _       __            ____
| |     / /___ ___  __/ __/___ _________
| | /| / / __ `/ / / / /_/ __ `/ ___/ _ \
| |/ |/ / /_/ / /_/ / __/ /_/ / /  /  __/
|__/|__/\__,_/\__, /_/  \__,_/_/   \___/
             /____/
    "#
    );
}
