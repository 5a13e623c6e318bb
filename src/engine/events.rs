// ==========================================
// 水泥窑配料优化系统 - 快照事件发布
// ==========================================
// 职责: 定义快照事件发布 trait，实现依赖倒置
// 说明: 引擎/API 层只依赖 trait，下游（看板刷新、消息队列）自行实现
// ==========================================

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::sync::Arc;
use tokio::sync::broadcast;

// ==========================================
// 快照事件类型
// ==========================================

/// 快照事件类型
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SnapshotEventType {
    /// 采样入库
    Ingested,
    /// 优化建议已应用
    AdjustmentApplied,
}

impl SnapshotEventType {
    /// 转换为字符串标识
    pub fn as_str(&self) -> &str {
        match self {
            SnapshotEventType::Ingested => "Ingested",
            SnapshotEventType::AdjustmentApplied => "AdjustmentApplied",
        }
    }
}

/// 快照事件
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotEvent {
    /// 工厂ID
    pub plant_id: String,
    /// 新快照的存储ID
    pub snapshot_id: i64,
    /// 事件类型
    pub event_type: SnapshotEventType,
    /// 关联的优化建议（仅 AdjustmentApplied）
    pub recommendation_id: Option<String>,
}

impl SnapshotEvent {
    /// 采样入库事件
    pub fn ingested(plant_id: String, snapshot_id: i64) -> Self {
        Self {
            plant_id,
            snapshot_id,
            event_type: SnapshotEventType::Ingested,
            recommendation_id: None,
        }
    }

    /// 调整应用事件
    pub fn adjustment_applied(plant_id: String, snapshot_id: i64, recommendation_id: String) -> Self {
        Self {
            plant_id,
            snapshot_id,
            event_type: SnapshotEventType::AdjustmentApplied,
            recommendation_id: Some(recommendation_id),
        }
    }
}

// ==========================================
// 事件发布 Trait
// ==========================================

/// 快照事件发布者
///
/// 发布失败不影响已提交的快照写入，调用方只记录日志
pub trait SnapshotEventPublisher: Send + Sync {
    fn publish(&self, event: SnapshotEvent) -> Result<(), Box<dyn Error + Send + Sync>>;
}

/// 空操作事件发布者
#[derive(Debug, Clone, Default)]
pub struct NoOpEventPublisher;

impl SnapshotEventPublisher for NoOpEventPublisher {
    fn publish(&self, event: SnapshotEvent) -> Result<(), Box<dyn Error + Send + Sync>> {
        tracing::debug!(
            "NoOpEventPublisher: 跳过事件发布 - plant_id={}, event_type={}",
            event.plant_id,
            event.event_type.as_str()
        );
        Ok(())
    }
}

/// 广播事件发布者
///
/// 将快照事件推送到 tokio 广播通道，供看板等订阅方刷新
pub struct BroadcastEventPublisher {
    sender: broadcast::Sender<SnapshotEvent>,
}

impl BroadcastEventPublisher {
    /// # 参数
    /// - `capacity`: 通道容量，慢订阅方超出后丢弃最旧事件
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// 订阅后续事件
    pub fn subscribe(&self) -> broadcast::Receiver<SnapshotEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl SnapshotEventPublisher for BroadcastEventPublisher {
    fn publish(&self, event: SnapshotEvent) -> Result<(), Box<dyn Error + Send + Sync>> {
        // 无订阅方不算失败
        if self.sender.receiver_count() == 0 {
            tracing::debug!(plant_id = %event.plant_id, "无事件订阅方，跳过广播");
            return Ok(());
        }
        self.sender.send(event)?;
        Ok(())
    }
}

/// 可选的事件发布者包装
pub struct OptionalEventPublisher {
    inner: Option<Arc<dyn SnapshotEventPublisher>>,
}

impl OptionalEventPublisher {
    pub fn with_publisher(publisher: Arc<dyn SnapshotEventPublisher>) -> Self {
        Self {
            inner: Some(publisher),
        }
    }

    pub fn none() -> Self {
        Self { inner: None }
    }

    /// 发布事件；失败只记录告警
    pub fn publish(&self, event: SnapshotEvent) {
        let Some(publisher) = &self.inner else {
            return;
        };
        let plant_id = event.plant_id.clone();
        let event_type = event.event_type.as_str().to_string();
        if let Err(e) = publisher.publish(event) {
            tracing::warn!(
                plant_id = %plant_id,
                event_type = %event_type,
                error = %e,
                "快照事件发布失败"
            );
        }
    }

    pub fn is_configured(&self) -> bool {
        self.inner.is_some()
    }
}

impl Default for OptionalEventPublisher {
    fn default() -> Self {
        Self::none()
    }
}
