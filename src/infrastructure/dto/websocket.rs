//! WebSocket メッセージの DTO
//!
//! クライアントとの間で交わす JSON メッセージの形。`type` フィールドで
//! タグ付けし、フィールド名は camelCase に揃えます。シグナリングと
//! 画面共有のペイロードは不透明な JSON としてそのまま運びます（中身は
//! 一切パースしない）。

use serde::{Deserialize, Serialize};

/// クライアントから受信するメッセージ
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ClientMessage {
    /// マッチング検索の開始
    FindMatch {
        chat_type: String,
        #[serde(default)]
        preferences: PreferencesDto,
    },
    /// 現在のセッションからの離脱（接続は維持）
    LeaveChat,
    /// WebRTC シグナリング（SDP / ICE candidate）の転送依頼
    Signal {
        to: String,
        signal: serde_json::Value,
    },
    /// 画面共有制御イベントの転送依頼
    ScreenShare {
        to: String,
        stream: serde_json::Value,
    },
    /// チャット本文または添付ファイルの転送依頼
    Message {
        to: String,
        #[serde(default)]
        text: Option<String>,
        #[serde(default)]
        file: Option<FileBlobDto>,
    },
    /// 相手クライアントの通報
    ReportUser {
        target_id: String,
        reason: String,
        #[serde(default)]
        details: String,
    },
}

/// サーバーから送信するメッセージ
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ServerMessage {
    /// 接続受付の通知（割り当てた接続 ID を返す）
    Connected { connection_id: String },
    /// マッチ成立の通知（両メンバーに送信）
    MatchFound { partner_id: String },
    /// シグナリングの配送（送信元でタグ付け）
    Signal {
        from: String,
        signal: serde_json::Value,
    },
    /// 画面共有制御イベントの配送
    ScreenShare {
        from: String,
        stream: serde_json::Value,
    },
    /// チャット本文または添付ファイルの配送
    Message {
        from: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        text: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        file: Option<FileBlobDto>,
        timestamp: i64,
    },
    /// セッション解消の通知
    PartnerLeft { partner_id: String },
    /// BAN 通知（この後サーバー側から切断される）
    Banned { reason: String },
}

/// マッチング希望条件の DTO
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferencesDto {
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub interests: Vec<String>,
}

/// 添付ファイルの DTO（data はエンコード済み文字列のまま運ぶ）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileBlobDto {
    pub name: String,
    pub data: String,
}
