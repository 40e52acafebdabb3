//! Web Push notifications for NewsPulse.

pub mod crypto;
pub mod dispatcher;
pub mod registry;
pub mod transport;
pub mod types;

pub use dispatcher::PushDispatcher;
pub use registry::PushSubscriptionRepository;
pub use transport::{PushTransport, TransportError, WebPushTransport};
pub use types::{PushKeys, PushPayload, PushSubscription};
