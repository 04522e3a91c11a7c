//! Solidity interfaces spoken by the resolver core.
//!
//! The resolver-side interfaces follow ENSIP-1/10/11, the suspension follows
//! EIP-3668 and the aggregated gateway call follows the batch gateway
//! convention used by universal resolvers.
use alloy_sol_types::sol;

sol! {
    #![sol(all_derives)]

    interface IERC165 {
        function supportsInterface(bytes4 interfaceID) external view returns (bool);
    }

    interface IExtendedResolver {
        function resolve(bytes memory name, bytes memory data) external view returns (bytes memory);
    }

    interface IMulticallable {
        function multicall(bytes[] calldata data) external returns (bytes[] memory results);
    }

    interface IAddrResolver {
        function addr(bytes32 node) external view returns (address);
    }

    interface IAddressResolver {
        function addr(bytes32 node, uint256 coinType) external view returns (bytes memory);
    }

    interface INameResolver {
        function name(bytes32 node) external view returns (string memory);
    }

    interface ITextResolver {
        function text(bytes32 node, string calldata key) external view returns (string memory);
    }

    /// One item of an aggregated gateway call.
    struct GatewayQuery {
        address sender;
        string[] urls;
        bytes data;
    }

    interface IBatchGateway {
        function query(GatewayQuery[] memory queries) external view returns (bool[] memory failures, bytes[] memory responses);
    }

    /// Status reported by a gateway that could not serve a request.
    struct HttpErrorItem {
        uint16 status;
        string message;
    }

    /// Per-item bookkeeping of a suspended batch.
    struct CallbackData {
        bytes4 callbackFunction;
        bytes data;
    }

    /// Outcome of one sub-query of a batch.
    struct CallResult {
        bool success;
        bytes returnData;
    }

    error OffchainLookup(address sender, string[] urls, bytes callData, bytes4 callbackFunction, bytes extraData);
    error HttpError(HttpErrorItem[] errors);
    error ResolverError(bytes returnData);
    error ResolverNotFound();
    error ResolverNotContract();
    error ResolverWildcardNotSupported();
    error MalformedName();
    error MalformedResponse();

    interface IUniversalResolver {
        function resolveSingleCallback(bytes calldata response, bytes calldata extraData) external view returns (bytes memory, address);
        function resolveCallback(bytes calldata response, bytes calldata extraData) external view returns (CallResult[] memory, address);
        function reverseCallback(bytes calldata response, bytes calldata extraData) external view returns (string memory, bytes memory, address, address);
    }
}

/// ENSIP-10 interface id, the XOR of the `IExtendedResolver` selectors.
pub const EXTENDED_RESOLVER_INTERFACE_ID: [u8; 4] = [0x90, 0x61, 0xb9, 0x23];

impl CallResult {
    pub fn ok(data: impl Into<alloy_primitives::Bytes>) -> Self {
        Self {
            success: true,
            returnData: data.into(),
        }
    }

    pub fn failed(data: impl Into<alloy_primitives::Bytes>) -> Self {
        Self {
            success: false,
            returnData: data.into(),
        }
    }
}
