//! # offerflow
//!
//! An embeddable client for server-driven offer flows: fetches a sequence of
//! promotional screens, renders each one from its declarative JSON
//! description into a toolkit-agnostic visual tree, and advances the flow as
//! the user accepts, declines, or dismisses offers.
//!
//! ## Features
//! - Closed node vocabulary (text, links, images, buttons, step indicators)
//!   with silent fallbacks for unknown types and style tokens
//! - Region-based screen composition with compact and wide layout variants
//!   and inline or popup presentation
//! - A flow state machine that serializes network steps, guards against
//!   double-taps, and funnels every failure through one error callback
//! - Transport and host surfaces behind traits, so embedding and testing
//!   need no live toolkit or network
//!
//! ## Example
//! ```ignore
//! use offerflow::{FlowConfig, FlowController, HttpTransport, Placement};
//!
//! let transport = HttpTransport::new("https://offers.example.com", None)?;
//! let controller = FlowController::new(FlowConfig::default(), transport, my_surface);
//! controller.set_on_error(|message| eprintln!("offer flow: {message}"));
//! controller.initiate_view(
//!     "0bf6f068-6bf5-49f1-a6bc-822eee7d4db3",
//!     Placement::OrderConfirmation,
//!     [("first_name".to_string(), "John".to_string())].into(),
//! );
//! // ... later, when the hosting view goes away:
//! controller.detach();
//! ```

pub mod error;
pub mod flow;
pub mod host;
pub mod node;
pub mod offer;
pub mod render;
pub mod style;
pub mod theme;
pub mod transport;
pub mod wire;

// --- Core types ---
pub use error::{FlowError, FlowResult};
pub use flow::{FlowConfig, FlowController, FlowState};
pub use host::HostSurface;
pub use node::{DigitProgress, OfferNode};
pub use offer::OfferScreen;
pub use render::{compose, Action, Composition, DispatchRule, StyleContext, Visual};
pub use style::{Color, Emphasis};
pub use theme::{FlowTheme, ViewportClass};
pub use transport::{HttpTransport, Reply, Transport};
pub use wire::{Placement, RenderMode, ServerDirective};
