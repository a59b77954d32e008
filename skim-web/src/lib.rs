//! Page acquisition and traversal.
//!
//! - Page provider trait and the fantoccini-backed implementation (`provider`)
//! - Settling lazily loaded pages before a snapshot (`settle`)
//! - Next-page decisions: URL mutation, numbered links, scrolling (`pagination`)
//! - The page-by-page field session (`session`) and the per-topic card
//!   session (`card_session`)
//! - CSV output of finished tables (`output`)

pub mod card_session;
pub mod output;
pub mod pagination;
pub mod provider;
pub mod session;
pub mod settle;

pub use card_session::{CardSession, TopicOutcome};
pub use pagination::{PaginationController, PaginationMode};
pub use provider::{BrowserProvider, ClickMode, PageProvider, ProviderError};
pub use session::{FieldSession, PageState, SessionReport};
