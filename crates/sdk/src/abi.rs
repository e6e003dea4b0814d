//! Contract bindings.

pub mod dca {
    alloy::sol! {
        /// Gelato DCA contract.
        ///
        /// `submitAndExec` accepts a one-time `(privateKey, witness)` pair
        /// appended after its declared arguments, see
        /// [`crate::client::DcaClient::tx_data`].
        #[sol(rpc, all_derives)]
        contract GelatoDca {
            struct SubmitOrder {
                address inToken;
                address outToken;
                uint256 amountPerTrade;
                uint256 numTrades;
                uint256 minSlippage;
                uint256 maxSlippage;
                uint256 delay;
                address platformWallet;
                uint256 platformFeeBps;
            }

            struct ExecOrder {
                address user;
                address inToken;
                address outToken;
                uint256 amountPerTrade;
                uint256 nTradesLeft;
                uint256 minSlippage;
                uint256 maxSlippage;
                uint256 delay;
                uint256 lastExecutionTime;
                address platformWallet;
                uint256 platformFeeBps;
            }

            event LogTaskSubmitted(uint256 indexed id, ExecOrder order, bool isSubmitAndExec);
            event LogTaskCancelled(uint256 indexed id, ExecOrder order);

            function submitAndExec(
                SubmitOrder memory _order,
                uint8 _protocol,
                uint256 _minReturnOrRate,
                address[] calldata _tradePath
            ) external payable returns (uint256 id);

            function cancel(ExecOrder calldata _order, uint256 _id) external;
        }
    }
}

pub mod erc20 {
    alloy::sol! {
        #[sol(rpc)]
        interface Erc20 {
            function name() external view returns (string memory);
            function symbol() external view returns (string memory);
            function decimals() external view returns (uint8);
            function allowance(address owner, address spender) external view returns (uint256);
        }

        /// Legacy tokens (MKR, SAI, ...) returning `bytes32` metadata.
        #[sol(rpc)]
        interface Erc20Bytes32 {
            function name() external view returns (bytes32);
            function symbol() external view returns (bytes32);
        }
    }
}

pub mod uniswap {
    alloy::sol! {
        #[sol(rpc)]
        interface UniswapV2Pair {
            function getReserves() external view returns (uint112 reserve0, uint112 reserve1, uint32 blockTimestampLast);
        }
    }
}
