pub mod source;
pub mod cache;
pub mod blacklist;
pub mod classifier;

pub use source::{TokenInfoSource, RpcTokenInfoSource};
pub use cache::ResultCache;
pub use blacklist::Blacklist;
pub use classifier::SlpClassifier;
