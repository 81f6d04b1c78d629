//! 一维卡尔曼滤波器 - 用于平滑单个信标单个通道的 RSSI 序列
//!
//! 测量量是一维的信号强度，因此只需标量形式，无需矩阵运算。

use crate::error::{BlufenceError, Result};
use serde::{Deserialize, Serialize};

/// 标量卡尔曼滤波器状态
///
/// 必须跨调用保留，估计值才会收敛；每次新建状态等价于只看单个样本。
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FilterState {
    /// 过程噪声方差 Q
    pub q: f64,
    /// 测量噪声方差 R
    pub r: f64,
    /// 当前估计值
    pub x: f64,
    /// 当前估计误差协方差 P
    pub p: f64,
}

impl FilterState {
    /// 创建新的滤波器状态，初始估计 x = 0，初始误差 p = 1
    pub fn new(q: f64, r: f64) -> Result<Self> {
        Self::with_initial(q, r, 0.0, 1.0)
    }

    /// 使用自定义初始估计和初始误差创建状态
    pub fn with_initial(q: f64, r: f64, x: f64, p: f64) -> Result<Self> {
        check_variance("过程方差 q", q)?;
        check_variance("测量方差 r", r)?;
        check_variance("初始误差 p", p)?;
        if !x.is_finite() {
            return Err(BlufenceError::InvalidConfig(format!(
                "初始估计值必须为有限数，实际为 {}",
                x
            )));
        }
        Ok(FilterState { q, r, x, p })
    }

    /// 下一次更新将使用的卡尔曼增益
    ///
    /// 分母为零时返回 None。
    pub fn next_gain(&self) -> Option<f64> {
        let predicted = self.p + self.q;
        let denom = predicted + self.r;
        if denom == 0.0 {
            None
        } else {
            Some(predicted / denom)
        }
    }

    /// 原地更新滤波器，返回平滑后的估计值
    pub fn update(&mut self, measurement: f64) -> Result<f64> {
        let (next, estimate) = update(self, measurement)?;
        *self = next;
        Ok(estimate)
    }
}

/// 单步卡尔曼更新（纯函数）
///
/// 依次执行：预测、计算增益、校正、收缩误差。`p' + r == 0` 时返回
/// [`BlufenceError::DivisionByZero`]，表示两个方差都被配置为零。
pub fn update(state: &FilterState, measurement: f64) -> Result<(FilterState, f64)> {
    // 预测
    let p = state.p + state.q;

    // 卡尔曼增益
    let denom = p + state.r;
    if denom == 0.0 {
        return Err(BlufenceError::DivisionByZero);
    }
    let k = p / denom;

    // 校正
    let x = state.x + k * (measurement - state.x);
    let p = (1.0 - k) * p;

    Ok((
        FilterState {
            q: state.q,
            r: state.r,
            x,
            p,
        },
        x,
    ))
}

fn check_variance(name: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(BlufenceError::InvalidConfig(format!(
            "{} 必须为非负有限数，实际为 {}",
            name, value
        )));
    }
    Ok(())
}
