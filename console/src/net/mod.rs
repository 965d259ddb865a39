//! Status link between the console and the processing backend.
//!
//! DESIGN
//! ======
//! [`channel::StatusChannel`] is the seam: front ends hold a boxed channel and
//! only read the connectivity flag and the last event. [`mock`] paces the
//! pure [`synthetic::SyntheticFeed`] on a timer; [`ws`] is the real WebSocket
//! client with reconnect.

pub mod channel;
pub mod mock;
pub mod synthetic;
pub mod ws;

pub use channel::{ChannelError, StatusChannel};
pub use mock::MockStatusChannel;
pub use synthetic::SyntheticFeed;
pub use ws::WsStatusChannel;
