//! Codec of the aggregated batch gateway call.
use alloy_primitives::Bytes;
use alloy_sol_types::SolCall;
use alloy_sol_types::SolValue;

use super::GatewayRequest;
use super::GatewayResponse;
use super::MessageError;
use crate::abi::IBatchGateway;

/// Encodes the outbound `query((address,string[],bytes)[])` call.
pub fn encode_query(requests: &[GatewayRequest]) -> Bytes {
    IBatchGateway::queryCall {
        queries: requests
            .iter()
            .cloned()
            .map(Into::into)
            .collect(),
    }
    .abi_encode()
    .into()
}

/// Decodes the outbound call back into its requests.
pub fn decode_query(data: &[u8]) -> Result<Vec<GatewayRequest>, MessageError> {
    let call = IBatchGateway::queryCall::abi_decode(data, true)?;
    Ok(call
        .queries
        .into_iter()
        .map(Into::into)
        .collect())
}

/// Encodes a batch reply, `(bool[] failures, bytes[] responses)`.
pub fn encode_response(responses: &[GatewayResponse]) -> Bytes {
    let failures: Vec<bool> = responses
        .iter()
        .map(|r| r.failed)
        .collect();
    let data: Vec<Bytes> = responses
        .iter()
        .map(|r| r.data.clone())
        .collect();
    (failures, data)
        .abi_encode_params()
        .into()
}

/// Splits a batch reply into per-request items, keeping index order.
pub fn decode_response(data: &[u8]) -> Result<Vec<GatewayResponse>, MessageError> {
    let (failures, responses) = <(Vec<bool>, Vec<Bytes>)>::abi_decode_params(data, true)?;
    if failures.len() != responses.len() {
        return Err(MessageError::ResponseLengthMismatch {
            failures: failures.len(),
            responses: responses.len(),
        });
    }

    Ok(failures
        .into_iter()
        .zip(responses)
        .map(|(failed, data)| GatewayResponse { failed, data })
        .collect())
}

#[cfg(test)]
mod tests {
    use alloy_primitives::address;
    use alloy_primitives::bytes;

    use super::*;

    #[test]
    fn test_query_keeps_request_order() {
        let requests = vec![
            GatewayRequest {
                sender: address!("4a679253410272dd5232b3ff7cf5dbb88f295319"),
                urls: vec!["https://example.com/".to_string()],
                data: bytes!("59d1d43c"),
            },
            GatewayRequest {
                sender: address!("a85233c63b9ee964add6f2cffe00fd84eb32338f"),
                urls: vec!["https://a.example/".to_string(), "https://b.example/".to_string()],
                data: bytes!("3b3b57de"),
            },
        ];

        let call = encode_query(&requests);
        assert_eq!(&call[..4], IBatchGateway::queryCall::SELECTOR.as_slice());
        assert_eq!(decode_query(&call).unwrap(), requests);
    }

    #[test]
    fn test_response_demultiplexing() {
        let reply = encode_response(&[
            GatewayResponse {
                failed: false,
                data: bytes!("01"),
            },
            GatewayResponse {
                failed: true,
                data: Bytes::new(),
            },
        ]);

        let items = decode_response(&reply).unwrap();
        assert_eq!(items.len(), 2);
        assert!(!items[0].failed);
        assert_eq!(items[0].data, bytes!("01"));
        assert!(items[1].failed);
        assert!(items[1].data.is_empty());
    }

    #[test]
    fn test_response_length_mismatch() {
        let reply = (vec![false, false], vec![Bytes::new()]).abi_encode_params();
        assert!(matches!(
            decode_response(&reply),
            Err(MessageError::ResponseLengthMismatch {
                failures: 2,
                responses: 1
            })
        ));
    }
}
