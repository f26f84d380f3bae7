//! InMemory Moderation Repository 実装
//!
//! ドメイン層が定義する ModerationRepository trait の具体的な実装。
//! 通報ログ（追記専用の Vec）と BAN マップを保持します。
//!
//! ## 技術的負債
//!
//! 本来この Repository はプロセス外の永続ストア（元実装では SQLite）の
//! アダプタです。インメモリ実装ではプロセス再起動で通報・BAN が消える
//! ため、DBMS 実装時にこのモジュールを差し替えます。trait の境界は
//! その前提で切ってあります。

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{BanRecord, ModerationRepository, Report, RepositoryError, StableId, Timestamp};

/// インメモリ Moderation Repository 実装
pub struct InMemoryModerationRepository {
    /// 追記専用の通報ログ
    reports: Arc<Mutex<Vec<Report>>>,
    /// 安定識別子ごとの BAN レコード
    bans: Arc<Mutex<HashMap<StableId, BanRecord>>>,
}

impl InMemoryModerationRepository {
    /// 新しい InMemoryModerationRepository を作成
    pub fn new() -> Self {
        Self {
            reports: Arc::new(Mutex::new(Vec::new())),
            bans: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

impl Default for InMemoryModerationRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ModerationRepository for InMemoryModerationRepository {
    async fn append_report(&self, report: Report) -> Result<(), RepositoryError> {
        let mut reports = self.reports.lock().await;
        reports.push(report);
        Ok(())
    }

    async fn count_reports(&self, target: &StableId) -> Result<usize, RepositoryError> {
        let reports = self.reports.lock().await;
        Ok(reports.iter().filter(|r| r.target == *target).count())
    }

    async fn get_ban(&self, stable_id: &StableId) -> Result<Option<BanRecord>, RepositoryError> {
        let bans = self.bans.lock().await;
        Ok(bans.get(stable_id).cloned())
    }

    async fn set_ban(
        &self,
        stable_id: &StableId,
        reason: &str,
        now: Timestamp,
    ) -> Result<(), RepositoryError> {
        let mut bans = self.bans.lock().await;
        // 既に BAN 済みなら最初のレコードを保持する（期限なし・単調）
        bans.entry(stable_id.clone())
            .or_insert_with(|| BanRecord::new(reason.to_string(), now));
        Ok(())
    }
}
