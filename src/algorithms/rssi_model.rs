//! RSSI 到距离转换模型
//!
//! 对数距离路径损耗模型，以及作为卡尔曼滤波替代方案的滑动平均平滑。

use crate::error::{BlufenceError, Result};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;

/// 根据 RSSI 估算距离（米）
///
/// - `rssi == 0` 视为“无信号”，返回 0
/// - 信号弱于 1 米参考功率（`|rssi| > |reference_power|`）时按
///   `10 ^ ((|rssi| - |reference_power|) / (10 * n))` 计算，结果大于 1 米
/// - 其余情况（在参考距离处或更近）同样返回 0
///
/// 近距离与无读数共用 0 这一返回值，调用方需自行区分。
pub fn estimate_distance(rssi: f64, reference_power: f64, path_loss_exponent: f64) -> f64 {
    if rssi == 0.0 {
        return 0.0;
    }

    let excess_loss = rssi.abs() - reference_power.abs();
    if excess_loss > 0.0 {
        10_f64.powf(excess_loss / (10.0 * path_loss_exponent))
    } else {
        0.0
    }
}

/// 对最近 `min(window_size, len)` 个样本取算术平均
///
/// 空序列返回 0。`window_size == 0` 时对整个序列取平均。
pub fn smooth_rssi(samples: &[f64], window_size: usize) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }

    let window = if window_size == 0 {
        samples.len()
    } else {
        window_size.min(samples.len())
    };
    let tail = &samples[samples.len() - window..];
    tail.iter().sum::<f64>() / tail.len() as f64
}

/// RSSI 转距离模型 - 保存经过校验的参考功率与路径损耗指数
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RSSIModel {
    /// 1 米处的参考功率 (dBm)
    pub reference_power: f64,
    /// 路径损耗指数 n
    pub path_loss_exponent: f64,
}

impl RSSIModel {
    /// 创建模型
    ///
    /// 路径损耗指数必须为正；参考功率以 dBm 表示，必须为负。
    pub fn new(reference_power: f64, path_loss_exponent: f64) -> Result<Self> {
        let model = RSSIModel {
            reference_power,
            path_loss_exponent,
        };
        model.validate()?;
        Ok(model)
    }

    /// 根据 RSSI 计算距离
    pub fn estimate_distance(&self, rssi: f64) -> f64 {
        estimate_distance(rssi, self.reference_power, self.path_loss_exponent)
    }

    /// 根据距离反算 RSSI
    ///
    /// 公式: RSSI(d) = A - 10 * n * log10(d)
    pub fn distance_to_rssi(&self, distance: f64) -> f64 {
        if distance <= 0.0 {
            return f64::NEG_INFINITY;
        }
        self.reference_power - 10.0 * self.path_loss_exponent * distance.log10()
    }

    /// 验证模型参数的合理性
    pub fn validate(&self) -> Result<()> {
        if !self.path_loss_exponent.is_finite() || self.path_loss_exponent <= 0.0 {
            return Err(BlufenceError::InvalidConfig(format!(
                "路径损耗指数必须为正数，实际为 {}",
                self.path_loss_exponent
            )));
        }
        if !self.reference_power.is_finite() || self.reference_power >= 0.0 {
            return Err(BlufenceError::InvalidConfig(format!(
                "参考功率应为负的 dBm 值，实际为 {}",
                self.reference_power
            )));
        }
        Ok(())
    }
}

impl Default for RSSIModel {
    fn default() -> Self {
        // 常见 BLE 参数：-59 dBm @ 1m，自由空间指数 2.0
        RSSIModel {
            reference_power: -59.0,
            path_loss_exponent: 2.0,
        }
    }
}

impl fmt::Display for RSSIModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "RSSI模型 - 参考功率={:.2} dBm, n={:.2}",
            self.reference_power, self.path_loss_exponent
        )
    }
}

/// 滑动窗口平均 - 只保留最近 `window_size` 个样本
#[derive(Clone, Debug)]
pub struct MovingAverage {
    window: VecDeque<f64>,
    window_size: usize,
}

impl MovingAverage {
    /// 创建滑动平均窗口，`window_size` 必须大于 0
    pub fn new(window_size: usize) -> Result<Self> {
        if window_size == 0 {
            return Err(BlufenceError::InvalidConfig(
                "滑动平均窗口大小必须大于 0".to_string(),
            ));
        }
        Ok(MovingAverage {
            window: VecDeque::with_capacity(window_size),
            window_size,
        })
    }

    /// 加入新样本并返回当前窗口平均值
    pub fn push(&mut self, rssi: f64) -> f64 {
        if self.window.len() == self.window_size {
            self.window.pop_front();
        }
        self.window.push_back(rssi);
        self.value()
    }

    /// 当前窗口平均值，空窗口返回 0
    pub fn value(&self) -> f64 {
        if self.window.is_empty() {
            return 0.0;
        }
        self.window.iter().sum::<f64>() / self.window.len() as f64
    }

    pub fn len(&self) -> usize {
        self.window.len()
    }

    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }
}
