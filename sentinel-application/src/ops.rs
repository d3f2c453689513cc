pub mod notification_hub;
pub mod subscriber_channel;

pub use notification_hub::*;
pub use subscriber_channel::*;
