//! UseCase 層
//!
//! Broadcast Hub とクライアント接続のライフサイクルを実装するレイヤー。
//! UI 層から呼び出され、Domain 層の値を扱います。

pub mod client;
pub mod error;
pub mod hub;

pub use client::{ClientState, Connection, DEFAULT_DRAIN_TIMEOUT, DEFAULT_OUTBOUND_BUFFER};
pub use error::{ClientError, HubError};
pub use hub::{BackpressurePolicy, Hub, HubConfig, HubHandle, Member, MemberInfo};
