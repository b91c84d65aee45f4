pub mod dispatch;
pub mod feed;
pub mod message;
pub mod phone;
pub mod policy;
pub mod scheduler;
pub mod sweep;

pub use dispatch::{DispatchOutcome, Dispatcher, EmailProvider, SmsProvider};
pub use feed::{build_feed, AlertDigest, AlertKind};
pub use message::compose_expiry_digest;
pub use phone::normalize;
pub use policy::{resolve_policy, ChannelPolicy};
pub use scheduler::{ExpiryScheduler, SchedulerHandle};
pub use sweep::{ExpirySweep, InventorySource, SweepSummary, UserSource};
