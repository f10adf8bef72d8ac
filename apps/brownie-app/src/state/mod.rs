//! # State Module
//!
//! Application state for the `brownie` binary.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌──────────────────┐   ┌──────────────────────────────────────────┐   │
//! │  │    AppConfig     │   │                 Ledger                   │   │
//! │  │                  │   │                                          │   │
//! │  │  [store]         │   │  Arc<dyn RecordStore>  (Database or      │   │
//! │  │  [session]  ─────┼──►│                         MemoryStore)     │   │
//! │  │  [display]       │   │  RwLock<Session + Book snapshot>         │   │
//! │  └──────────────────┘   └──────────────────────────────────────────┘   │
//! │                                                                         │
//! │  THREAD SAFETY:                                                        │
//! │  • AppConfig: read-only after loading                                  │
//! │  • Ledger: mutations hold the write lock until the store answers       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod ledger;
mod session;

pub use config::{
    default_config_path, AppConfig, ConfigError, DisplayConfig, SessionConfig, StoreConfig,
    CONFIG_FILE_NAME,
};
pub use ledger::{Book, CustomerHistory, Ledger, Report};
pub use session::Session;
