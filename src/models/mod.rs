pub mod curator;
pub mod oracle;
pub mod points;
pub mod token;
pub mod vault;
pub mod warning;

// Re-export commonly used types
pub use curator::{Curator, CuratorSocials};
pub use oracle::{OracleVault, PriceFeed, PriceSource, TokenRef, Vendor};
pub use points::{EntityKind, Point, PointEntry, PointsMap, PointsMapping};
pub use token::{Token, TokenMetadata};
pub use vault::Vault;
pub use warning::{WarningPart, WarningTarget};
