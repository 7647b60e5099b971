//! 服务器配置
//!
//! 所有配置项都可以通过环境变量覆盖：
//!
//! | 环境变量 | 默认值 | 说明 |
//! |----------|--------|------|
//! | WORK_DIR | /var/lib/wayfare | 工作目录 (数据库、上传、日志) |
//! | HTTP_PORT | 3000 | HTTP 服务端口 |
//! | ENVIRONMENT | development | 运行环境 |
//! | JWT_SECRET | (dev 自动生成) | JWT 密钥，非开发环境必填 |
//! | GATEWAY_API_URL | https://api.gateway.example/v1 | 支付网关地址 |
//! | GATEWAY_API_KEY | (dev 占位) | 支付网关 API key |
//! | GATEWAY_WEBHOOK_SECRET | (dev 占位) | webhook 签名密钥 |

use anyhow::bail;

use crate::auth::JwtConfig;

/// 升级费用表 (货币单位)
pub const UPGRADE_FEE_HOST: f64 = 49.00;
pub const UPGRADE_FEE_AGENCY: f64 = 99.00;

#[derive(Debug, Clone)]
pub struct Config {
    /// 工作目录，存储数据库、上传文件、日志
    pub work_dir: String,
    /// HTTP API 服务端口
    pub http_port: u16,
    /// JWT 认证配置
    pub jwt: JwtConfig,
    /// 运行环境: development | staging | production
    pub environment: String,
    /// 支付网关 API 地址
    pub gateway_api_url: String,
    /// 支付网关 API key
    pub gateway_api_key: String,
    /// 支付网关 webhook 签名密钥
    pub gateway_webhook_secret: String,
}

impl Config {
    /// Require a secret env var: must be set and non-empty outside development.
    fn require_secret(name: &str, environment: &str) -> anyhow::Result<String> {
        let val = match std::env::var(name) {
            Ok(v) => v,
            Err(_) => {
                if environment != "development" {
                    bail!("{name} must be set in {environment} environment");
                }
                format!("dev-{name}-not-for-production")
            }
        };
        if val.is_empty() && environment != "development" {
            bail!("{name} must not be empty in {environment} environment");
        }
        Ok(val)
    }

    /// 从环境变量加载配置
    pub fn from_env() -> anyhow::Result<Self> {
        let environment = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());

        Ok(Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "/var/lib/wayfare".into()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            jwt: JwtConfig::default(),
            gateway_api_url: std::env::var("GATEWAY_API_URL")
                .unwrap_or_else(|_| "https://api.gateway.example/v1".into()),
            gateway_api_key: Self::require_secret("GATEWAY_API_KEY", &environment)?,
            gateway_webhook_secret: Self::require_secret("GATEWAY_WEBHOOK_SECRET", &environment)?,
            environment,
        })
    }

    /// 使用自定义值覆盖部分配置
    ///
    /// 常用于测试场景
    pub fn with_overrides(work_dir: impl Into<String>, http_port: u16) -> anyhow::Result<Self> {
        let mut config = Self::from_env()?;
        config.work_dir = work_dir.into();
        config.http_port = http_port;
        Ok(config)
    }

    /// 是否生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// 数据库文件路径
    pub fn db_path(&self) -> String {
        format!("{}/database/wayfare.db", self.work_dir)
    }

    /// 上传根目录
    pub fn uploads_dir(&self) -> String {
        format!("{}/uploads", self.work_dir)
    }

    /// 确保工作目录结构存在
    pub fn ensure_work_dir_structure(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(format!("{}/database", self.work_dir))?;
        std::fs::create_dir_all(self.uploads_dir())?;
        std::fs::create_dir_all(format!("{}/logs", self.work_dir))?;
        Ok(())
    }
}
