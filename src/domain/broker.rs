//! ブローカー状態機械
//!
//! 接続レジストリ、チャット種別ごとの FIFO 待機プール、マッチャー、
//! セッションテーブルをまとめた純粋な同期ロジックです。副作用を持たない
//! ため単体テストが容易で、並行性は Infrastructure 層の
//! `Arc<Mutex<Broker>>`（単一の直列化ポイント）が担います。
//! `start_search` はエンキュー・走査・確定を1回の `&mut self` 呼び出しで
//! 行うため、ロック1回分がそのままアトミックなマッチ確定になります。

use std::collections::HashMap;

use super::entity::{Connection, Session, WaitingEntry};
use super::error::BrokerError;
use super::value_object::{ChatType, ConnectionId, Preferences, StableId, Timestamp};

/// `start_search` の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchOutcome {
    /// 互換な相手が見つかり、セッションが確立された
    Matched { partner: ConnectionId },
    /// 相手が見つからず、待機プールに登録された
    Queued,
}

/// 切断クリーンアップの結果（冪等: 2回目以降はすべて空）
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DisconnectCleanup {
    /// レジストリから接続が削除されたか
    pub removed: bool,
    /// 待機プールから削除されたか
    pub was_searching: bool,
    /// セッションが解消された場合、残された側の接続 ID
    pub partner: Option<ConnectionId>,
}

/// ペアリング・シグナリングブローカーの全インメモリ状態
#[derive(Debug, Default)]
pub struct Broker {
    /// 接続レジストリ（connection_id -> Connection）
    connections: HashMap<ConnectionId, Connection>,
    /// チャット種別ごとの待機プール（挿入順 = 到着順を保持）
    waiting: HashMap<ChatType, Vec<WaitingEntry>>,
    /// セッションテーブル（双方向リンク、両方向にエントリを持つ）
    sessions: HashMap<ConnectionId, Session>,
}

impl Broker {
    pub fn new() -> Self {
        Self::default()
    }

    /// 接続を登録
    pub fn register(&mut self, connection: Connection) -> Result<(), BrokerError> {
        if self.connections.contains_key(&connection.id) {
            return Err(BrokerError::DuplicateConnection(
                connection.id.as_str().to_string(),
            ));
        }
        self.connections.insert(connection.id.clone(), connection);
        Ok(())
    }

    /// 接続を抹消し、待機プール・セッションテーブルを連鎖的に掃除する
    ///
    /// 冪等です。graceful な leave を経ない切断でも必ず呼ばれます。
    pub fn unregister(&mut self, id: &ConnectionId) -> DisconnectCleanup {
        let removed = self.connections.remove(id).is_some();
        let was_searching = self.cancel_search(id);
        let partner = self.end_session(id);
        DisconnectCleanup {
            removed,
            was_searching,
            partner,
        }
    }

    /// 検索を開始し、その場でマッチを試みる
    ///
    /// 同種別パーティションを到着順（最古優先）に走査し、最初に互換な
    /// 相手が見つかったら両者を1ステップでプールから外してセッションを
    /// 確立します。見つからなければ待機エントリとして登録します。
    pub fn start_search(
        &mut self,
        id: &ConnectionId,
        preferences: Preferences,
        now: Timestamp,
    ) -> Result<MatchOutcome, BrokerError> {
        if !self.connections.contains_key(id) {
            return Err(BrokerError::NotRegistered(id.as_str().to_string()));
        }
        if self.sessions.contains_key(id) {
            return Err(BrokerError::AlreadyMatched(id.as_str().to_string()));
        }
        if self.is_searching(id) {
            return Err(BrokerError::AlreadySearching(id.as_str().to_string()));
        }

        let queue = self.waiting.entry(preferences.chat_type()).or_default();
        let position = queue.iter().position(|entry| {
            entry.connection_id != *id && entry.preferences.is_compatible_with(&preferences)
        });

        match position {
            Some(position) => {
                let entry = queue.remove(position);
                let partner = entry.connection_id;
                self.link(id.clone(), partner.clone(), now);
                Ok(MatchOutcome::Matched { partner })
            }
            None => {
                queue.push(WaitingEntry::new(id.clone(), preferences, now));
                Ok(MatchOutcome::Queued)
            }
        }
    }

    /// 待機プールから外す（全パーティション対象）
    ///
    /// マッチが先に確定していた場合は何も起きず false を返します。
    pub fn cancel_search(&mut self, id: &ConnectionId) -> bool {
        let mut removed = false;
        for queue in self.waiting.values_mut() {
            let before = queue.len();
            queue.retain(|entry| entry.connection_id != *id);
            removed |= queue.len() != before;
        }
        removed
    }

    /// 検索中かどうか
    pub fn is_searching(&self, id: &ConnectionId) -> bool {
        self.waiting
            .values()
            .any(|queue| queue.iter().any(|entry| entry.connection_id == *id))
    }

    /// セッション中のパートナーを引く
    pub fn partner_of(&self, id: &ConnectionId) -> Option<ConnectionId> {
        self.sessions.get(id).map(|session| session.partner.clone())
    }

    /// セッションを解消し、残された側の接続 ID を返す
    pub fn end_session(&mut self, id: &ConnectionId) -> Option<ConnectionId> {
        let session = self.sessions.remove(id)?;
        self.sessions.remove(&session.partner);
        Some(session.partner)
    }

    /// 接続の安定識別子を引く
    pub fn stable_id_of(&self, id: &ConnectionId) -> Option<StableId> {
        self.connections
            .get(id)
            .map(|connection| connection.stable_id.clone())
    }

    /// 待機プールに残った同士を到着順にペアリングする（低頻度バックストップ用）
    ///
    /// 到着時マッチで拾えなかった組み合わせ（例: 後から互換な2人が
    /// 並んだケースは到着時に拾えるので通常は空振り）を掃き出します。
    pub fn sweep_matches(&mut self, now: Timestamp) -> Vec<(ConnectionId, ConnectionId)> {
        let mut pairs = Vec::new();
        let chat_types: Vec<ChatType> = self.waiting.keys().copied().collect();
        for chat_type in chat_types {
            let mut queue = match self.waiting.get_mut(&chat_type) {
                Some(queue) => std::mem::take(queue),
                None => continue,
            };
            let mut index = 0;
            while index < queue.len() {
                let candidate = (index + 1..queue.len()).find(|&other| {
                    queue[index]
                        .preferences
                        .is_compatible_with(&queue[other].preferences)
                });
                match candidate {
                    Some(other) => {
                        let second = queue.remove(other);
                        let first = queue.remove(index);
                        self.link(
                            first.connection_id.clone(),
                            second.connection_id.clone(),
                            now,
                        );
                        pairs.push((first.connection_id, second.connection_id));
                    }
                    None => index += 1,
                }
            }
            if let Some(slot) = self.waiting.get_mut(&chat_type) {
                *slot = queue;
            }
        }
        pairs
    }

    /// 指定種別の待機数
    pub fn waiting_count(&self, chat_type: ChatType) -> usize {
        self.waiting
            .get(&chat_type)
            .map(|queue| queue.len())
            .unwrap_or(0)
    }

    /// アクティブなセッション数（ペア数）
    pub fn session_count(&self) -> usize {
        self.sessions.len() / 2
    }

    /// 接続数
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// 双方向のセッションリンクを張る
    fn link(&mut self, a: ConnectionId, b: ConnectionId, now: Timestamp) {
        self.sessions
            .insert(a.clone(), Session::new(b.clone(), now));
        self.sessions.insert(b, Session::new(a, now));
    }

    /// テスト用: 到着時マッチを通さずに待機エントリを積む
    #[cfg(test)]
    fn enqueue_unchecked(&mut self, id: &ConnectionId, preferences: Preferences, now: Timestamp) {
        self.waiting
            .entry(preferences.chat_type())
            .or_default()
            .push(WaitingEntry::new(id.clone(), preferences, now));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_object::{InterestTags, Language};

    fn conn_id(value: &str) -> ConnectionId {
        ConnectionId::new(value.to_string()).unwrap()
    }

    fn register(broker: &mut Broker, id: &str) -> ConnectionId {
        let connection_id = conn_id(id);
        broker
            .register(Connection::new(
                connection_id.clone(),
                StableId::new(format!("10.0.0.{}", id.len())).unwrap(),
                Timestamp::new(1000),
            ))
            .unwrap();
        connection_id
    }

    fn prefs(chat_type: ChatType, language: Option<&str>, interests: &[&str]) -> Preferences {
        let language = language.map(|l| Language::new(l.to_string()).unwrap());
        let interests =
            InterestTags::new(interests.iter().map(|s| s.to_string()).collect()).unwrap();
        Preferences::new(chat_type, language, interests)
    }

    fn ts(millis: i64) -> Timestamp {
        Timestamp::new(millis)
    }

    #[test]
    fn test_register_rejects_duplicate_connection() {
        // テスト項目: 同じ接続 ID の二重登録が拒否される
        // given (前提条件):
        let mut broker = Broker::new();
        let alice = register(&mut broker, "alice");

        // when (操作):
        let result = broker.register(Connection::new(
            alice.clone(),
            StableId::new("10.0.0.9".to_string()).unwrap(),
            ts(2000),
        ));

        // then (期待する結果):
        assert_eq!(
            result,
            Err(BrokerError::DuplicateConnection("alice".to_string()))
        );
    }

    #[test]
    fn test_start_search_queues_when_pool_is_empty() {
        // テスト項目: プールが空なら待機エントリとして登録される
        // given (前提条件):
        let mut broker = Broker::new();
        let alice = register(&mut broker, "alice");

        // when (操作):
        let outcome = broker
            .start_search(&alice, prefs(ChatType::Video, None, &[]), ts(1))
            .unwrap();

        // then (期待する結果):
        assert_eq!(outcome, MatchOutcome::Queued);
        assert_eq!(broker.waiting_count(ChatType::Video), 1);
        assert!(broker.is_searching(&alice));
    }

    #[test]
    fn test_match_removes_both_from_pool_and_creates_session() {
        // テスト項目: マッチ成立時に両者がプールから消え、セッションが張られる
        // given (前提条件):
        let mut broker = Broker::new();
        let alice = register(&mut broker, "alice");
        let bob = register(&mut broker, "bob");
        broker
            .start_search(&alice, prefs(ChatType::Video, Some("en"), &["music"]), ts(1))
            .unwrap();

        // when (操作):
        let outcome = broker
            .start_search(
                &bob,
                prefs(ChatType::Video, Some("en"), &["music", "sports"]),
                ts(2),
            )
            .unwrap();

        // then (期待する結果):
        assert_eq!(
            outcome,
            MatchOutcome::Matched {
                partner: alice.clone()
            }
        );
        assert_eq!(broker.waiting_count(ChatType::Video), 0);
        assert_eq!(broker.partner_of(&alice), Some(bob.clone()));
        assert_eq!(broker.partner_of(&bob), Some(alice.clone()));
        assert_eq!(broker.session_count(), 1);
    }

    #[test]
    fn test_fifo_fairness_oldest_waiter_wins() {
        // テスト項目: 互換な待機者が複数いる場合、最古の待機者が選ばれる
        // given (前提条件):
        let mut broker = Broker::new();
        let w1 = register(&mut broker, "w1");
        let w2 = register(&mut broker, "w2");
        let arrival = register(&mut broker, "arrival");
        broker
            .start_search(&w1, prefs(ChatType::Text, None, &[]), ts(1))
            .unwrap();
        broker
            .start_search(&w2, prefs(ChatType::Text, None, &[]), ts(2))
            .unwrap();

        // when (操作):
        let outcome = broker
            .start_search(&arrival, prefs(ChatType::Text, None, &[]), ts(3))
            .unwrap();

        // then (期待する結果): 先にエンキューされた w1 とペアになる
        assert_eq!(
            outcome,
            MatchOutcome::Matched {
                partner: w1.clone()
            }
        );
        assert!(broker.is_searching(&w2));
        assert!(!broker.is_searching(&w1));
    }

    #[test]
    fn test_incompatible_waiter_is_skipped() {
        // テスト項目: 非互換な最古の待機者はスキップされ、次の互換な相手とマッチする
        // given (前提条件):
        let mut broker = Broker::new();
        let french = register(&mut broker, "french");
        let english = register(&mut broker, "english");
        let arrival = register(&mut broker, "arrival");
        broker
            .start_search(&french, prefs(ChatType::Video, Some("fr"), &[]), ts(1))
            .unwrap();
        broker
            .start_search(&english, prefs(ChatType::Video, Some("en"), &[]), ts(2))
            .unwrap();

        // when (操作):
        let outcome = broker
            .start_search(&arrival, prefs(ChatType::Video, Some("en"), &[]), ts(3))
            .unwrap();

        // then (期待する結果):
        assert_eq!(outcome, MatchOutcome::Matched { partner: english });
        assert!(broker.is_searching(&french));
    }

    #[test]
    fn test_partitions_are_isolated_by_chat_type() {
        // テスト項目: video の待機者と text の検索者はマッチしない
        // given (前提条件):
        let mut broker = Broker::new();
        let video = register(&mut broker, "video");
        let text = register(&mut broker, "text");
        broker
            .start_search(&video, prefs(ChatType::Video, None, &[]), ts(1))
            .unwrap();

        // when (操作):
        let outcome = broker
            .start_search(&text, prefs(ChatType::Text, None, &[]), ts(2))
            .unwrap();

        // then (期待する結果):
        assert_eq!(outcome, MatchOutcome::Queued);
        assert_eq!(broker.waiting_count(ChatType::Video), 1);
        assert_eq!(broker.waiting_count(ChatType::Text), 1);
    }

    #[test]
    fn test_start_search_rejected_while_searching() {
        // テスト項目: 検索中の再検索が拒否される
        // given (前提条件):
        let mut broker = Broker::new();
        let alice = register(&mut broker, "alice");
        broker
            .start_search(&alice, prefs(ChatType::Video, None, &[]), ts(1))
            .unwrap();

        // when (操作):
        let result = broker.start_search(&alice, prefs(ChatType::Video, None, &[]), ts(2));

        // then (期待する結果):
        assert_eq!(
            result,
            Err(BrokerError::AlreadySearching("alice".to_string()))
        );
        // 待機エントリは1つのまま
        assert_eq!(broker.waiting_count(ChatType::Video), 1);
    }

    #[test]
    fn test_start_search_rejected_while_matched() {
        // テスト項目: マッチ済みクライアントの検索が拒否される
        // given (前提条件):
        let mut broker = Broker::new();
        let alice = register(&mut broker, "alice");
        let bob = register(&mut broker, "bob");
        broker
            .start_search(&alice, prefs(ChatType::Video, None, &[]), ts(1))
            .unwrap();
        broker
            .start_search(&bob, prefs(ChatType::Video, None, &[]), ts(2))
            .unwrap();

        // when (操作):
        let result = broker.start_search(&alice, prefs(ChatType::Video, None, &[]), ts(3));

        // then (期待する結果):
        assert_eq!(result, Err(BrokerError::AlreadyMatched("alice".to_string())));
    }

    #[test]
    fn test_start_search_rejected_when_not_registered() {
        // テスト項目: 未登録の接続からの検索が拒否される
        // given (前提条件):
        let mut broker = Broker::new();
        let ghost = conn_id("ghost");

        // when (操作):
        let result = broker.start_search(&ghost, prefs(ChatType::Video, None, &[]), ts(1));

        // then (期待する結果):
        assert_eq!(result, Err(BrokerError::NotRegistered("ghost".to_string())));
    }

    #[test]
    fn test_at_most_one_session_per_connection() {
        // テスト項目: 消費済みの待機エントリが二重にマッチされない
        // given (前提条件):
        let mut broker = Broker::new();
        let waiter = register(&mut broker, "waiter");
        let first = register(&mut broker, "first");
        let second = register(&mut broker, "second");
        broker
            .start_search(&waiter, prefs(ChatType::Video, None, &[]), ts(1))
            .unwrap();
        broker
            .start_search(&first, prefs(ChatType::Video, None, &[]), ts(2))
            .unwrap();

        // when (操作): waiter は既に first に消費されている
        let outcome = broker
            .start_search(&second, prefs(ChatType::Video, None, &[]), ts(3))
            .unwrap();

        // then (期待する結果):
        assert_eq!(outcome, MatchOutcome::Queued);
        assert_eq!(broker.partner_of(&waiter), Some(first));
        assert_eq!(broker.session_count(), 1);
    }

    #[test]
    fn test_cancel_search_is_noop_after_match_committed() {
        // テスト項目: マッチ確定後の cancel_search が no-op になる
        // given (前提条件):
        let mut broker = Broker::new();
        let alice = register(&mut broker, "alice");
        let bob = register(&mut broker, "bob");
        broker
            .start_search(&alice, prefs(ChatType::Video, None, &[]), ts(1))
            .unwrap();
        broker
            .start_search(&bob, prefs(ChatType::Video, None, &[]), ts(2))
            .unwrap();

        // when (操作):
        let removed = broker.cancel_search(&alice);

        // then (期待する結果): 状態は "searching" を過ぎているので何も起きない
        assert!(!removed);
        assert_eq!(broker.partner_of(&alice), Some(bob));
    }

    #[test]
    fn test_end_session_clears_both_directions() {
        // テスト項目: セッション解消で双方向のリンクが消える
        // given (前提条件):
        let mut broker = Broker::new();
        let alice = register(&mut broker, "alice");
        let bob = register(&mut broker, "bob");
        broker
            .start_search(&alice, prefs(ChatType::Video, None, &[]), ts(1))
            .unwrap();
        broker
            .start_search(&bob, prefs(ChatType::Video, None, &[]), ts(2))
            .unwrap();

        // when (操作):
        let partner = broker.end_session(&bob);

        // then (期待する結果):
        assert_eq!(partner, Some(alice.clone()));
        assert_eq!(broker.partner_of(&alice), None);
        assert_eq!(broker.partner_of(&bob), None);
        assert_eq!(broker.session_count(), 0);
    }

    #[test]
    fn test_unregister_is_idempotent() {
        // テスト項目: 同じ接続の二重切断が1回の切断と同じ状態を残す
        // given (前提条件):
        let mut broker = Broker::new();
        let alice = register(&mut broker, "alice");
        let bob = register(&mut broker, "bob");
        broker
            .start_search(&alice, prefs(ChatType::Video, None, &[]), ts(1))
            .unwrap();
        broker
            .start_search(&bob, prefs(ChatType::Video, None, &[]), ts(2))
            .unwrap();

        // when (操作):
        let first = broker.unregister(&alice);
        let second = broker.unregister(&alice);

        // then (期待する結果): 1回目でクリーンアップ、2回目はすべて空
        assert!(first.removed);
        assert_eq!(first.partner, Some(bob.clone()));
        assert_eq!(second, DisconnectCleanup::default());
        assert_eq!(broker.session_count(), 0);
        assert_eq!(broker.connection_count(), 1);
        assert_eq!(broker.partner_of(&bob), None);
    }

    #[test]
    fn test_unregister_removes_waiting_entry() {
        // テスト項目: 検索中の接続の切断で待機エントリも消える
        // given (前提条件):
        let mut broker = Broker::new();
        let alice = register(&mut broker, "alice");
        broker
            .start_search(&alice, prefs(ChatType::Text, None, &[]), ts(1))
            .unwrap();

        // when (操作):
        let cleanup = broker.unregister(&alice);

        // then (期待する結果):
        assert!(cleanup.removed);
        assert!(cleanup.was_searching);
        assert_eq!(cleanup.partner, None);
        assert_eq!(broker.waiting_count(ChatType::Text), 0);
    }

    #[test]
    fn test_sweep_is_noop_on_pairwise_incompatible_pool() {
        // テスト項目: 互換ペアのないプールで sweep が何もしない
        // 到着時マッチがある限りプールは互いに非互換な待機者だけになるため、
        // バックストップの sweep は通常この状態に対して走る
        // given (前提条件):
        let mut broker = Broker::new();
        let en = register(&mut broker, "en-user");
        let fr = register(&mut broker, "fr-user");
        let de = register(&mut broker, "de-user");
        broker
            .start_search(&en, prefs(ChatType::Video, Some("en"), &[]), ts(1))
            .unwrap();
        broker
            .start_search(&fr, prefs(ChatType::Video, Some("fr"), &[]), ts(2))
            .unwrap();
        broker
            .start_search(&de, prefs(ChatType::Video, Some("de"), &[]), ts(3))
            .unwrap();

        // when (操作):
        let pairs = broker.sweep_matches(ts(10));

        // then (期待する結果): 全員がプールに残る
        assert!(pairs.is_empty());
        assert_eq!(broker.waiting_count(ChatType::Video), 3);
        assert_eq!(broker.session_count(), 0);
    }

    #[test]
    fn test_sweep_pairs_compatible_waiters_oldest_first() {
        // テスト項目: sweep が互換な待機者を到着順にペアリングする
        // given (前提条件): 到着時マッチを通さず待機エントリを直接構成する
        let mut broker = Broker::new();
        let w1 = register(&mut broker, "w1");
        let w2 = register(&mut broker, "w2");
        let w3 = register(&mut broker, "w3");
        broker.enqueue_unchecked(&w1, prefs(ChatType::Text, None, &[]), ts(1));
        broker.enqueue_unchecked(&w2, prefs(ChatType::Text, None, &[]), ts(2));
        broker.enqueue_unchecked(&w3, prefs(ChatType::Text, None, &[]), ts(3));

        // when (操作):
        let pairs = broker.sweep_matches(ts(10));

        // then (期待する結果): 最古の w1 が w2 とペアになり、w3 が残る
        assert_eq!(pairs, vec![(w1.clone(), w2.clone())]);
        assert_eq!(broker.partner_of(&w1), Some(w2));
        assert!(broker.is_searching(&w3));
        assert_eq!(broker.waiting_count(ChatType::Text), 1);
    }
}
