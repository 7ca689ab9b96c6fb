//! sorter-core: statement data model, engine configuration, sensitive account
//! registry and shared date / filename helpers.

pub mod bank;
pub mod config;
pub mod dates;
pub mod naming;
pub mod registry;
pub mod statement;

pub use bank::Bank;
pub use config::{BankKeywordProfile, EngineConfig, FilenameRule, LandmarkSettings, NameThresholds};
pub use registry::{NameMatch, SensitiveAccount, SensitiveAccountRegistry};
pub use statement::{MatchBasis, MatchStatus, ResolvedAccount, StatementInfo};
