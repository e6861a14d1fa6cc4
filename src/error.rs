use crate::common::CommonParametersError;
use crate::database::MomentError;
use crate::object::MomentObjectError;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    #[error(transparent)]
    Moment(#[from] MomentError),

    #[error(transparent)]
    MomentObject(#[from] MomentObjectError),

    #[error(transparent)]
    CommonParameters(#[from] CommonParametersError),

    #[error("Object has order {available}, at least {required} is needed")]
    InsufficientOrder { required: usize, available: usize },
}
