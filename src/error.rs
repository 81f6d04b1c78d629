//! 错误类型定义

use thiserror::Error;

/// blufence 错误类型
#[derive(Error, Debug)]
pub enum BlufenceError {
    /// 配置参数非法（负方差、非正路径损耗指数等）
    #[error("配置错误: {0}")]
    InvalidConfig(String),

    /// 地理围栏定义非法
    #[error("地理围栏 {zone_id} 非法: {reason}")]
    InvalidGeofence { zone_id: String, reason: String },

    /// 重复注册同一 zone_id
    #[error("地理围栏 {0} 已注册")]
    DuplicateZone(String),

    /// 卡尔曼增益分母为零（q、r 与 p 同时为零）
    #[error("卡尔曼增益分母为零: 过程方差与测量方差不能同时为零")]
    DivisionByZero,

    #[error("I/O 错误: {0}")]
    Io(#[from] std::io::Error),

    /// 配置文件解析失败
    #[error("解析错误: {0}")]
    Parse(String),

    /// 信标 ID 过滤正则非法
    #[error("正则表达式错误: {0}")]
    InvalidPattern(#[from] regex::Error),
}

impl From<toml::de::Error> for BlufenceError {
    fn from(e: toml::de::Error) -> Self {
        BlufenceError::Parse(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, BlufenceError>;
