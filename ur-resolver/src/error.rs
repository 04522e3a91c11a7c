use alloy_primitives::Address;
use alloy_primitives::Bytes;
use alloy_sol_types::SolError;
use thiserror::Error;
use ur_messages::abi;
use ur_messages::abi::HttpErrorItem;
use ur_messages::types::hex_pretty;
use ur_messages::types::MessageError;
use ur_messages::types::OffchainLookup;

pub type Result<T> = std::result::Result<T, ResolveError>;

/// Every way a top-level request can end without a result.
///
/// `OffchainLookup` is a suspension, not a failure: the caller is expected to
/// serve the request it carries and resume through the named callback.
#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("malformed name: {0}")]
    MalformedName(String),

    #[error("no resolver found")]
    ResolverNotFound,

    #[error("resolver {0} is not a contract")]
    ResolverNotContract(Address),

    #[error("resolver {0} cannot answer for descendants of its name")]
    ResolverWildcardNotSupported(Address),

    #[error("resolver error: {}", hex_pretty(.0))]
    ResolverError(Bytes),

    #[error("off-chain lookup required: {0}")]
    OffchainLookup(Box<OffchainLookup>),

    #[error("gateway failure: {0:?}")]
    HttpError(Vec<HttpErrorItem>),

    #[error("malformed off-chain payload: {0}")]
    MalformedResponse(#[from] MessageError),
}

impl From<alloy_sol_types::Error> for ResolveError {
    fn from(error: alloy_sol_types::Error) -> Self {
        ResolveError::MalformedResponse(MessageError::Abi(error))
    }
}

impl ResolveError {
    /// The suspension carried by this error, if it is one.
    pub fn offchain_lookup(&self) -> Option<&OffchainLookup> {
        match self {
            ResolveError::OffchainLookup(lookup) => Some(lookup),
            _ => None,
        }
    }

    /// Revert data a contract boundary would emit for this error.
    pub fn revert_data(&self) -> Bytes {
        let data = match self {
            ResolveError::MalformedName(_) => abi::MalformedName {}.abi_encode(),
            ResolveError::ResolverNotFound => abi::ResolverNotFound {}.abi_encode(),
            ResolveError::ResolverNotContract(_) => abi::ResolverNotContract {}.abi_encode(),
            ResolveError::ResolverWildcardNotSupported(_) => {
                abi::ResolverWildcardNotSupported {}.abi_encode()
            },
            ResolveError::ResolverError(data) => {
                abi::ResolverError {
                    returnData: data.clone(),
                }
                .abi_encode()
            },
            ResolveError::OffchainLookup(lookup) => return lookup.revert_data(),
            ResolveError::HttpError(errors) => {
                abi::HttpError {
                    errors: errors.clone(),
                }
                .abi_encode()
            },
            ResolveError::MalformedResponse(_) => abi::MalformedResponse {}.abi_encode(),
        };
        data.into()
    }
}

#[cfg(test)]
mod tests {
    use alloy_primitives::bytes;

    use super::*;

    #[test]
    fn test_resolver_error_wraps_payload_verbatim() {
        let error = ResolveError::ResolverError(bytes!("deadbeef"));
        let data = error.revert_data();

        let decoded = abi::ResolverError::abi_decode(&data, true).unwrap();
        assert_eq!(decoded.returnData, bytes!("deadbeef"));
    }

    #[test]
    fn test_unit_errors_are_bare_selectors() {
        assert_eq!(
            ResolveError::ResolverNotFound
                .revert_data()
                .as_ref(),
            abi::ResolverNotFound::SELECTOR.as_slice()
        );
        assert_eq!(
            ResolveError::ResolverNotContract(Address::ZERO)
                .revert_data()
                .len(),
            4
        );
    }
}
