//! Infrastructure 層
//!
//! ドメイン層が定義する trait の具体的な実装（インメモリ Repository、
//! WebSocket MessagePusher、ワードリストの ProfanityFilter）と、
//! プロトコル境界の DTO を提供します。

pub mod dto;
pub mod message_pusher;
pub mod profanity;
pub mod repository;
