//! UseCase: ブローカー統計の取得

use std::sync::Arc;

use crate::domain::{BrokerRepository, ChatType};

/// ブローカーの現在の負荷スナップショット
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrokerStats {
    pub waiting_video: usize,
    pub waiting_text: usize,
    pub active_sessions: usize,
}

/// 統計取得のユースケース
pub struct GetStatsUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn BrokerRepository>,
}

impl GetStatsUseCase {
    /// 新しい GetStatsUseCase を作成
    pub fn new(repository: Arc<dyn BrokerRepository>) -> Self {
        Self { repository }
    }

    /// 統計を取得
    pub async fn execute(&self) -> BrokerStats {
        BrokerStats {
            waiting_video: self.repository.waiting_count(ChatType::Video).await,
            waiting_text: self.repository.waiting_count(ChatType::Text).await,
            active_sessions: self.repository.session_count().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        Broker, Connection, ConnectionId, InterestTags, Preferences, StableId, Timestamp,
    };
    use crate::infrastructure::repository::InMemoryBrokerRepository;
    use tokio::sync::Mutex;

    #[tokio::test]
    async fn test_stats_reflect_waiting_and_sessions() {
        // テスト項目: 待機数とセッション数が正しく集計される
        // given (前提条件): テキスト待機1人とビデオの成立ペア1組
        let repository = Arc::new(InMemoryBrokerRepository::new(Arc::new(Mutex::new(
            Broker::new(),
        ))));
        let usecase = GetStatsUseCase::new(repository.clone());
        for (id, stable) in [("a", "1"), ("b", "2"), ("c", "3")] {
            repository
                .register_connection(Connection::new(
                    ConnectionId::new(id.to_string()).unwrap(),
                    StableId::new(format!("192.0.2.{}", stable)).unwrap(),
                    Timestamp::new(1000),
                ))
                .await
                .unwrap();
        }
        let video = Preferences::new(ChatType::Video, None, InterestTags::none());
        let text = Preferences::new(ChatType::Text, None, InterestTags::none());
        repository
            .start_search(
                &ConnectionId::new("a".to_string()).unwrap(),
                video.clone(),
                Timestamp::new(1),
            )
            .await
            .unwrap();
        repository
            .start_search(
                &ConnectionId::new("b".to_string()).unwrap(),
                video,
                Timestamp::new(2),
            )
            .await
            .unwrap();
        repository
            .start_search(
                &ConnectionId::new("c".to_string()).unwrap(),
                text,
                Timestamp::new(3),
            )
            .await
            .unwrap();

        // when (操作):
        let stats = usecase.execute().await;

        // then (期待する結果):
        assert_eq!(
            stats,
            BrokerStats {
                waiting_video: 0,
                waiting_text: 1,
                active_sessions: 1,
            }
        );
    }
}
