//! Approval reply classification.

mod keyword;

pub use keyword::KeywordApprovalParser;
