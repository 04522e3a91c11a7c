//! Batch gateway adapter: many resolver lookups out in one request, one
//! response per lookup back.
use ur_messages::abi::CallbackData;
use ur_messages::types::gateway::decode_response;
use ur_messages::types::http_error_items;
use ur_messages::types::GatewayRequest;
use ur_messages::types::GatewayResponse;
use ur_messages::types::MessageError;

use crate::dispatch::Step;
use crate::error::ResolveError;
use crate::error::Result;

/// Turns a suspended batch into continuation items, one per step, and the
/// gateway requests of its pending steps in the same order.
pub(crate) fn aggregate(steps: Vec<Step>) -> (Vec<CallbackData>, Vec<GatewayRequest>) {
    let mut calls = Vec::with_capacity(steps.len());
    let mut requests = Vec::new();
    for step in steps {
        match step {
            Step::Done { call, .. } => calls.push(CallbackData::on_chain(call)),
            Step::Failed(error) => calls.push(CallbackData::failed(error)),
            Step::Pending(lookup) => {
                calls.push(CallbackData::offchain(lookup.callback_function, lookup.extra_data));
                requests.push(GatewayRequest {
                    sender: lookup.sender,
                    urls: lookup.urls,
                    data: lookup.call_data,
                });
            },
        }
    }
    (calls, requests)
}

/// Pairs every off-chain item of a continuation with its gateway response.
///
/// Settled and on-chain items get `None`. A gateway that failed with `HttpError` on any
/// item fails the whole resumption.
pub(crate) fn demultiplex<'a>(
    calls: &'a [CallbackData],
    response: &[u8],
) -> Result<Vec<(&'a CallbackData, Option<GatewayResponse>)>> {
    let responses = decode_response(response)?;
    let pending = calls
        .iter()
        .filter(|call| call.is_pending())
        .count();
    if responses.len() != pending {
        return Err(MessageError::PendingMismatch {
            pending,
            responses: responses.len(),
        }
        .into());
    }

    if let Some(errors) = responses
        .iter()
        .filter(|response| response.failed)
        .find_map(|response| http_error_items(&response.data))
    {
        return Err(ResolveError::HttpError(errors));
    }

    let mut responses = responses.into_iter();
    Ok(calls
        .iter()
        .map(|call| {
            let response = if call.is_pending() {
                responses.next()
            } else {
                None
            };
            (call, response)
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use alloy_primitives::address;
    use alloy_primitives::bytes;
    use alloy_primitives::Bytes;
    use alloy_sol_types::SolError;
    use ur_messages::abi;
    use ur_messages::abi::CallResult;
    use ur_messages::types::gateway::encode_response;
    use ur_messages::types::OffchainLookup;
    use ur_messages::Selector;

    use super::*;

    const CALLBACK: Selector = Selector::new([0xb4, 0xa8, 0x58, 0x01]);

    fn responses(items: &[(bool, Bytes)]) -> Bytes {
        let items: Vec<_> = items
            .iter()
            .map(|(failed, data)| GatewayResponse {
                failed: *failed,
                data: data.clone(),
            })
            .collect();
        encode_response(&items)
    }

    #[test]
    fn test_aggregate_keeps_order() {
        let resolver = address!("4a679253410272dd5232b3ff7cf5dbb88f295319");
        let steps = vec![
            Step::Pending(OffchainLookup {
                sender: resolver,
                urls: vec!["https://example.com/".to_string()],
                call_data: bytes!("59d1d43c"),
                callback_function: CALLBACK,
                extra_data: bytes!("aa"),
            }),
            Step::Done {
                call: bytes!("9061b923"),
                result: CallResult::ok(bytes!("01")),
            },
            Step::Failed(bytes!("dead")),
        ];

        let (calls, requests) = aggregate(steps);
        assert_eq!(
            calls,
            vec![
                CallbackData::offchain(CALLBACK, bytes!("aa")),
                CallbackData::on_chain(bytes!("9061b923")),
                CallbackData::failed(bytes!("dead")),
            ]
        );
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].sender, resolver);
        assert_eq!(requests[0].data, bytes!("59d1d43c"));
    }

    #[test]
    fn test_demultiplex_skips_on_chain_items() {
        let calls = vec![
            CallbackData::on_chain(bytes!("12345678")),
            CallbackData::failed(bytes!("dead")),
            CallbackData::offchain(CALLBACK, bytes!("aa")),
        ];
        let paired = demultiplex(&calls, &responses(&[(false, bytes!("01"))])).unwrap();

        assert!(paired[0].1.is_none());
        assert!(paired[1].1.is_none());
        assert_eq!(paired[2].1.as_ref().map(|r| r.data.clone()), Some(bytes!("01")));
    }

    #[test]
    fn test_demultiplex_count_mismatch() {
        let calls = vec![CallbackData::offchain(CALLBACK, Bytes::new())];
        let result = demultiplex(&calls, &responses(&[]));
        assert!(matches!(
            result,
            Err(ResolveError::MalformedResponse(MessageError::PendingMismatch {
                pending: 1,
                responses: 0
            }))
        ));
    }

    #[test]
    fn test_http_error_aborts() {
        let http = abi::HttpError {
            errors: vec![abi::HttpErrorItem {
                status: 404,
                message: "Not Found".to_string(),
            }],
        }
        .abi_encode();
        let calls = vec![
            CallbackData::offchain(CALLBACK, Bytes::new()),
            CallbackData::offchain(CALLBACK, Bytes::new()),
        ];

        let result = demultiplex(&calls, &responses(&[(false, bytes!("01")), (true, http.into())]));
        assert!(matches!(result, Err(ResolveError::HttpError(errors)) if errors[0].status == 404));

        // Other failures stay with their item.
        let paired = demultiplex(&calls, &responses(&[(true, bytes!("dead")), (false, Bytes::new())])).unwrap();
        assert!(paired[0].1.as_ref().is_some_and(|r| r.failed));
    }
}
