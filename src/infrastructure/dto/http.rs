//! HTTP API レスポンスの DTO

use serde::{Deserialize, Serialize};

/// `GET /debug/stats` のレスポンス
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrokerStatsDto {
    /// ビデオチャット待機中のクライアント数
    pub waiting_video: usize,
    /// テキストチャット待機中のクライアント数
    pub waiting_text: usize,
    /// 確立済みセッション数
    pub active_sessions: usize,
}

/// `GET /api/health` のレスポンス
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthDto {
    pub status: String,
}
