//! エンティティ定義

use super::value_object::{ConnectionId, Preferences, StableId, Timestamp};

/// ライブな接続1本
///
/// Broker が排他的に所有し、トランスポートが閉じた瞬間に破棄されます。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    pub id: ConnectionId,
    pub stable_id: StableId,
    pub connected_at: Timestamp,
}

impl Connection {
    pub fn new(id: ConnectionId, stable_id: StableId, connected_at: Timestamp) -> Self {
        Self {
            id,
            stable_id,
            connected_at,
        }
    }
}

/// 待機プールのエントリ
///
/// 接続 ID は全パーティションを通じて高々1つのエントリにしか現れません。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaitingEntry {
    pub connection_id: ConnectionId,
    pub preferences: Preferences,
    pub enqueued_at: Timestamp,
}

impl WaitingEntry {
    pub fn new(
        connection_id: ConnectionId,
        preferences: Preferences,
        enqueued_at: Timestamp,
    ) -> Self {
        Self {
            connection_id,
            preferences,
            enqueued_at,
        }
    }
}

/// 確立済みペアの片側から見たセッションリンク
///
/// セッションは無向ペアで、双方向のリンクを2本張って表現します。
/// どちらの側からでもパートナーを O(1) で引けます。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub partner: ConnectionId,
    pub established_at: Timestamp,
}

impl Session {
    pub fn new(partner: ConnectionId, established_at: Timestamp) -> Self {
        Self {
            partner,
            established_at,
        }
    }
}

/// 通報レコード（追記専用の監査証跡、変更・削除されない）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub reporter: StableId,
    pub target: StableId,
    pub reason: String,
    pub details: String,
    pub reported_at: Timestamp,
}

impl Report {
    pub fn new(
        reporter: StableId,
        target: StableId,
        reason: String,
        details: String,
        reported_at: Timestamp,
    ) -> Self {
        Self {
            reporter,
            target,
            reason,
            details,
            reported_at,
        }
    }
}

/// BAN レコード（安定識別子をキーとし、期限なし）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BanRecord {
    pub reason: String,
    pub banned_at: Timestamp,
}

impl BanRecord {
    pub fn new(reason: String, banned_at: Timestamp) -> Self {
        Self { reason, banned_at }
    }
}
