use metrics::counter;

/// Top-level entry point kinds, used as the `kind` label.
#[derive(Copy, Clone, Debug)]
pub(crate) enum RequestKind {
    Resolve,
    ResolveBatch,
    Reverse,
    ResolveSingleCallback,
    ResolveCallback,
    ReverseCallback,
}

impl RequestKind {
    fn as_str(self) -> &'static str {
        match self {
            RequestKind::Resolve => "resolve",
            RequestKind::ResolveBatch => "resolve_batch",
            RequestKind::Reverse => "reverse",
            RequestKind::ResolveSingleCallback => "resolve_single_callback",
            RequestKind::ResolveCallback => "resolve_callback",
            RequestKind::ReverseCallback => "reverse_callback",
        }
    }
}

pub(crate) fn request(kind: RequestKind) {
    counter!("ur_requests_total", "kind" => kind.as_str()).increment(1);
}

pub(crate) fn offchain_lookup() {
    counter!("ur_offchain_lookups_total").increment(1);
}

pub(crate) fn resolver_error() {
    counter!("ur_resolver_errors_total").increment(1);
}
