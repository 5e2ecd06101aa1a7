//! Domain entities decoded from GitHub payloads.
//!
//! Entities are immutable snapshots. They are shared behind `Arc` so one
//! decoded object can be handed to many listeners, and re-decoding the same id
//! produces a fresh, independent snapshot.

pub mod ids;
pub mod installation;
pub mod issue;
pub mod repository;
pub mod timestamp;
pub mod user;

pub use ids::{AppId, CommentId, DeliveryId, InstallationId, IssueId, RepositoryId, UserId};
pub use installation::Installation;
pub use issue::{Comment, Issue, IssueState, LockReason};
pub use repository::Repository;
pub use timestamp::Timestamp;
pub use user::{Application, User};
