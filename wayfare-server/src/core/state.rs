//! 服务器状态

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::auth::{JwtService, RateLimiter};
use crate::core::Config;
use crate::db::DbService;
use crate::gateway::GatewayClient;
use crate::services::Notifier;

/// 服务器状态 - 持有所有服务的共享引用
///
/// 使用 Arc / 连接池实现浅拷贝，所有权成本极低。
///
/// | 字段 | 说明 |
/// |------|------|
/// | config | 配置项 (不可变) |
/// | pool | SQLite 连接池 |
/// | jwt_service | JWT 认证服务 |
/// | notifier | 进程内通知分发 |
/// | gateway | 支付网关客户端 |
/// | rate_limiter | 登录/注册限流 |
#[derive(Clone)]
pub struct ServerState {
    pub config: Config,
    pub pool: SqlitePool,
    pub jwt_service: Arc<JwtService>,
    pub notifier: Notifier,
    pub gateway: GatewayClient,
    pub rate_limiter: RateLimiter,
}

impl ServerState {
    /// 初始化服务器状态
    ///
    /// 按顺序：工作目录结构 → 数据库 (迁移) → JWT → 网关客户端。
    pub async fn initialize(config: &Config) -> anyhow::Result<Self> {
        config.ensure_work_dir_structure()?;

        let db = DbService::new(&config.db_path()).await?;
        let pool = db.pool;

        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));
        let notifier = Notifier::new(pool.clone());
        let gateway = GatewayClient::new(
            config.gateway_api_url.clone(),
            config.gateway_api_key.clone(),
            config.gateway_webhook_secret.clone(),
        );

        Ok(Self {
            config: config.clone(),
            pool,
            jwt_service,
            notifier,
            gateway,
            rate_limiter: RateLimiter::new(),
        })
    }

    pub fn get_jwt_service(&self) -> Arc<JwtService> {
        self.jwt_service.clone()
    }
}
