//! ドメイン層
//!
//! ブローカーの純粋なビジネスロジック（値オブジェクト、エンティティ、
//! マッチング状態機械）と、Infrastructure 層が実装するインターフェース
//! （Repository / MessagePusher / ProfanityFilter）を定義します。

pub mod broker;
pub mod entity;
pub mod error;
pub mod filter;
pub mod message_pusher;
pub mod repository;
pub mod value_object;

pub use broker::{Broker, DisconnectCleanup, MatchOutcome};
pub use entity::{BanRecord, Connection, Report, Session, WaitingEntry};
pub use error::{BrokerError, MessagePushError, RepositoryError, ValidationError};
pub use filter::ProfanityFilter;
pub use message_pusher::{MessagePusher, PusherChannel};
pub use repository::{BrokerRepository, ModerationRepository};
pub use value_object::{
    ChatType, ConnectionId, ConnectionIdFactory, FileBlob, InterestTags, Language, MessageContent,
    Preferences, StableId, Timestamp,
};
