//! 锚点（固定接收器）定义和相关数据结构

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 单个锚点定义 - 位置已知的固定接收器
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Anchor {
    /// 锚点唯一标识符
    pub id: String,
    /// 锚点友好名称
    #[serde(default)]
    pub name: String,
    /// X 坐标（米）
    pub x: f64,
    /// Y 坐标（米）
    pub y: f64,
}

impl Anchor {
    /// 创建新的锚点
    pub fn new(id: impl Into<String>, name: impl Into<String>, x: f64, y: f64) -> Self {
        Anchor {
            id: id.into(),
            name: name.into(),
            x,
            y,
        }
    }

    /// 获取锚点的 2D 坐标
    pub fn coordinates(&self) -> (f64, f64) {
        (self.x, self.y)
    }

    /// 与某个估计距离组合成一次观测
    pub fn observe(&self, distance: f64) -> AnchorObservation {
        AnchorObservation::new(self.x, self.y, distance)
    }
}

/// 单次信标到锚点的距离观测 (anchor_x, anchor_y, distance)
///
/// 每次定位计算时临时构造，不做持久化。
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnchorObservation {
    pub anchor_x: f64,
    pub anchor_y: f64,
    /// 估计距离（米），<= 0 的观测不参与加权
    pub distance: f64,
}

impl AnchorObservation {
    pub fn new(anchor_x: f64, anchor_y: f64, distance: f64) -> Self {
        AnchorObservation {
            anchor_x,
            anchor_y,
            distance,
        }
    }
}

impl From<(f64, f64, f64)> for AnchorObservation {
    fn from((anchor_x, anchor_y, distance): (f64, f64, f64)) -> Self {
        AnchorObservation::new(anchor_x, anchor_y, distance)
    }
}

/// 锚点集合管理器
#[derive(Clone, Debug, Default)]
pub struct AnchorSet {
    /// 锚点 ID -> Anchor 的映射
    anchors: HashMap<String, Anchor>,
}

impl AnchorSet {
    /// 创建空的锚点集合
    pub fn new() -> Self {
        AnchorSet {
            anchors: HashMap::new(),
        }
    }

    /// 从锚点向量创建集合
    pub fn from_vec(anchors: Vec<Anchor>) -> Self {
        let mut set = AnchorSet::new();
        for anchor in anchors {
            set.add_anchor(anchor);
        }
        set
    }

    /// 添加锚点，同 ID 的旧锚点被替换
    pub fn add_anchor(&mut self, anchor: Anchor) {
        self.anchors.insert(anchor.id.clone(), anchor);
    }

    /// 获取锚点
    pub fn get(&self, id: &str) -> Option<&Anchor> {
        self.anchors.get(id)
    }

    /// 是否包含锚点
    pub fn contains(&self, id: &str) -> bool {
        self.anchors.contains_key(id)
    }

    /// 获取锚点数量
    pub fn len(&self) -> usize {
        self.anchors.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.anchors.is_empty()
    }

    /// 迭代锚点 ID 和锚点
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Anchor)> {
        self.anchors.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anchor_creation() {
        let anchor = Anchor::new("A1", "Anchor1", 3.0, 4.0);
        assert_eq!(anchor.id, "A1");
        assert_eq!(anchor.coordinates(), (3.0, 4.0));
        assert_eq!(anchor.observe(2.5), AnchorObservation::new(3.0, 4.0, 2.5));
    }

    #[test]
    fn test_anchor_set() {
        let mut set = AnchorSet::from_vec(vec![
            Anchor::new("A1", "Anchor1", 0.0, 0.0),
            Anchor::new("A2", "Anchor2", 10.0, 0.0),
        ]);
        assert_eq!(set.len(), 2);
        assert!(set.contains("A2"));

        set.add_anchor(Anchor::new("A2", "Moved", 12.0, 0.0));
        assert_eq!(set.len(), 2);
        assert_eq!(set.get("A2").map(|a| a.x), Some(12.0));
        assert!(set.get("A3").is_none());
    }
}
