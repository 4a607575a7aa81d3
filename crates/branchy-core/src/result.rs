use crate::error::BranchyError;

pub type BranchyResult<T> = Result<T, BranchyError>;
