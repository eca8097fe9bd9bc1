//! Static registry of supported chains: internal chain ids, balance-index
//! identifiers and aliases, native-token sentinels, and per-chain native
//! currency metadata. All lookups are pure.

use std::collections::HashMap;
use std::sync::OnceLock;

use alloy::primitives::{Address, address};

/// One supported chain and its identifiers.
///
/// `external_id` is the canonical balance-index identifier; `aliases`
/// always contains the canonical id itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainDescriptor {
    pub chain_id: u64,
    pub external_id: &'static str,
    pub aliases: &'static [&'static str],
    pub name: &'static str,
    pub native_symbol: &'static str,
    pub native_name: &'static str,
    pub default_rpc_url: &'static str,
}

/// Decimals of every supported chain's native asset.
pub const NATIVE_DECIMALS: u8 = 18;

pub const SUPPORTED_CHAINS: &[ChainDescriptor] = &[
    ChainDescriptor {
        chain_id: 1,
        external_id: "eth",
        aliases: &["eth", "ethereum"],
        name: "Ethereum",
        native_symbol: "ETH",
        native_name: "Ethereum",
        default_rpc_url: "https://ethereum.publicnode.com",
    },
    ChainDescriptor {
        chain_id: 8453,
        external_id: "base",
        aliases: &["base"],
        name: "Base",
        native_symbol: "ETH",
        native_name: "Ethereum",
        default_rpc_url: "https://developer-access-mainnet.base.org",
    },
    ChainDescriptor {
        chain_id: 137,
        external_id: "matic",
        aliases: &["matic", "polygon"],
        name: "Polygon",
        native_symbol: "POL",
        native_name: "POL",
        default_rpc_url: "https://polygon-public.nodies.app",
    },
    ChainDescriptor {
        chain_id: 42161,
        external_id: "arb",
        aliases: &["arb", "arbitrum"],
        name: "Arbitrum One",
        native_symbol: "ETH",
        native_name: "Ethereum",
        default_rpc_url: "https://arbitrum.meowrpc.com",
    },
    ChainDescriptor {
        chain_id: 10,
        external_id: "op",
        aliases: &["op", "optimism"],
        name: "OP Mainnet",
        native_symbol: "ETH",
        native_name: "Ethereum",
        default_rpc_url: "https://optimism.publicnode.com",
    },
    ChainDescriptor {
        chain_id: 56,
        external_id: "bsc",
        aliases: &["bsc", "bnb"],
        name: "BNB Smart Chain",
        native_symbol: "BNB",
        native_name: "BNB",
        default_rpc_url: "https://bsc.meowrpc.com",
    },
    ChainDescriptor {
        chain_id: 146,
        external_id: "sonic",
        aliases: &["sonic"],
        name: "Sonic",
        native_symbol: "S",
        native_name: "Sonic",
        default_rpc_url: "https://rpc.soniclabs.com",
    },
    ChainDescriptor {
        chain_id: 534352,
        external_id: "scrl",
        aliases: &["scrl", "scroll"],
        name: "Scroll",
        native_symbol: "ETH",
        native_name: "Ethereum",
        default_rpc_url: "https://rpc.scroll.io",
    },
    ChainDescriptor {
        chain_id: 100,
        external_id: "xdai",
        aliases: &["xdai", "gnosis"],
        name: "Gnosis",
        native_symbol: "xDAI",
        native_name: "xDAI",
        default_rpc_url: "https://gnosis-rpc.publicnode.com",
    },
    ChainDescriptor {
        chain_id: 43114,
        external_id: "avax",
        aliases: &["avax", "avalanche"],
        name: "Avalanche",
        native_symbol: "AVAX",
        native_name: "Avalanche",
        default_rpc_url: "https://avalanche-c-chain-rpc.publicnode.com",
    },
    ChainDescriptor {
        chain_id: 33139,
        external_id: "ape",
        aliases: &["ape", "apechain"],
        name: "ApeChain",
        native_symbol: "APE",
        native_name: "ApeCoin",
        default_rpc_url: "https://apechain.drpc.org",
    },
    ChainDescriptor {
        chain_id: 1329,
        external_id: "sei",
        aliases: &["sei"],
        name: "Sei",
        native_symbol: "SEI",
        native_name: "Sei",
        default_rpc_url: "https://sei.drpc.org",
    },
    ChainDescriptor {
        chain_id: 480,
        external_id: "world",
        aliases: &["world", "worldchain"],
        name: "World Chain",
        native_symbol: "ETH",
        native_name: "Ethereum",
        default_rpc_url: "https://worldchain.drpc.org",
    },
    ChainDescriptor {
        chain_id: 130,
        external_id: "unichain",
        aliases: &["unichain", "uni"],
        name: "Unichain",
        native_symbol: "ETH",
        native_name: "Ethereum",
        default_rpc_url: "https://0xrpc.io/uni",
    },
    ChainDescriptor {
        chain_id: 9745,
        external_id: "plasma",
        aliases: &["plasma"],
        name: "Plasma",
        native_symbol: "PLAS",
        native_name: "Plasma",
        default_rpc_url: "https://rpc.plasma.to",
    },
    ChainDescriptor {
        chain_id: 143,
        external_id: "monad",
        aliases: &["monad"],
        name: "Monad",
        native_symbol: "MON",
        native_name: "Monad",
        default_rpc_url: "https://rpc-mainnet.monadinfra.com/rpc",
    },
    ChainDescriptor {
        chain_id: 999,
        external_id: "hyperevm",
        aliases: &["hyperevm", "hyperliquid"],
        name: "HyperEVM",
        native_symbol: "HYPE",
        native_name: "HYPE",
        default_rpc_url: "https://rpc.hypurrscan.io",
    },
    ChainDescriptor {
        chain_id: 747474,
        external_id: "katana",
        aliases: &["katana"],
        name: "Katana",
        native_symbol: "ETH",
        native_name: "Ethereum",
        default_rpc_url: "https://rpc-katana.t.conduit.xyz",
    },
];

/// Addresses the balance index uses to represent a chain's native asset.
const NATIVE_SENTINELS: [Address; 2] = [
    Address::ZERO,
    address!("0xeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeee"),
];

/// Polygon reports its native asset through a precompile address.
const POLYGON_NATIVE_SENTINEL: Address = address!("0x0000000000000000000000000000000000001010");
const POLYGON_CHAIN_ID: u64 = 137;

fn normalize(identifier: &str) -> String {
    identifier.trim().to_ascii_lowercase()
}

fn by_external_identifier() -> &'static HashMap<String, u64> {
    static MAP: OnceLock<HashMap<String, u64>> = OnceLock::new();
    MAP.get_or_init(|| {
        let mut map = HashMap::new();
        for descriptor in SUPPORTED_CHAINS {
            map.insert(normalize(descriptor.external_id), descriptor.chain_id);
            for alias in descriptor.aliases {
                map.insert(normalize(alias), descriptor.chain_id);
            }
        }
        map
    })
}

fn by_chain_id() -> &'static HashMap<u64, &'static ChainDescriptor> {
    static MAP: OnceLock<HashMap<u64, &'static ChainDescriptor>> = OnceLock::new();
    MAP.get_or_init(|| {
        SUPPORTED_CHAINS
            .iter()
            .map(|descriptor| (descriptor.chain_id, descriptor))
            .collect()
    })
}

/// Maps a balance-index chain identifier (or alias) to an internal chain id.
/// Lookup is case- and whitespace-insensitive.
pub fn resolve_internal_id(external_id_or_alias: &str) -> Option<u64> {
    let normalized = normalize(external_id_or_alias);
    if normalized.is_empty() {
        return None;
    }
    by_external_identifier().get(&normalized).copied()
}

/// Maps an internal chain id to its canonical balance-index identifier.
pub fn resolve_external_id(chain_id: u64) -> Option<&'static str> {
    by_chain_id()
        .get(&chain_id)
        .map(|descriptor| descriptor.external_id)
}

pub fn is_supported(chain_id: u64) -> bool {
    by_chain_id().contains_key(&chain_id)
}

pub fn descriptor(chain_id: u64) -> Option<&'static ChainDescriptor> {
    by_chain_id().get(&chain_id).copied()
}

pub fn chain_name(chain_id: u64) -> String {
    descriptor(chain_id).map_or_else(|| format!("Chain {chain_id}"), |d| d.name.to_string())
}

/// Canonical balance-index identifiers for every supported chain, used to
/// scope token-list queries.
pub fn supported_external_ids() -> Vec<String> {
    SUPPORTED_CHAINS
        .iter()
        .map(|descriptor| descriptor.external_id.to_string())
        .collect()
}

/// Whether `address` is a sentinel for the native asset of `chain_id`.
pub fn is_native_sentinel(chain_id: u64, address: Address) -> bool {
    if NATIVE_SENTINELS.contains(&address) {
        return true;
    }
    chain_id == POLYGON_CHAIN_ID && address == POLYGON_NATIVE_SENTINEL
}
