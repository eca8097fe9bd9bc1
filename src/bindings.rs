//! Solidity ABI bindings for the ERC-20 metadata reads used by manual
//! token lookup.

use alloy::sol;

sol!(
    #[sol(all_derives = true, rpc)]
    #[derive(serde::Serialize, serde::Deserialize)]
    interface IERC20 {
        function symbol() external view returns (string);
        function name() external view returns (string);
        function decimals() external view returns (uint8);
        function balanceOf(address owner) external view returns (uint256);
    }
);
