//! A crate to answer contactless reader commands on behalf of an emulated card.
//!
//! ## Usage
//! ```rust
//! use std::sync::Arc;
//!
//! use hce::apdu::Handler;
//! use hce::{Responder, Session};
//!
//! let session = Arc::new(Session::new());
//! let responder = Responder::new(Arc::clone(&session));
//!
//! session.start(Some(vec![0xDE, 0xAD]), Some("04:A2:B3:C4".to_string()));
//!
//! assert_eq!(
//!     vec![0x04, 0xA2, 0xB3, 0xC4, 0x90, 0x00],
//!     responder.handle(&[0xFF, 0xCA, 0x00, 0x00, 0x00]),
//! );
//! ```

mod logging;

pub mod apdu;
pub mod codec;
pub mod event;
pub mod manager;
pub mod responder;
pub mod session;

pub use event::{LifecycleEvent, StopReason};
pub use manager::{Manager, Platform};
pub use responder::Responder;
pub use session::{EmulationState, Session};
