//! インメモリ Repository 実装

pub mod broker;
pub mod moderation;

pub use broker::InMemoryBrokerRepository;
pub use moderation::InMemoryModerationRepository;
