use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ProviderName {
    Covalent,
    Alchemy,
    Moralis,
    Mobula,
    Codex,
}

pub struct ProviderMeta {
    pub display_name: &'static str,
    pub color: &'static str,
    pub env_key: &'static str,
}

impl ProviderName {
    pub const ALL: [ProviderName; 5] = [
        ProviderName::Covalent,
        ProviderName::Alchemy,
        ProviderName::Moralis,
        ProviderName::Mobula,
        ProviderName::Codex,
    ];

    pub fn meta(&self) -> ProviderMeta {
        match self {
            ProviderName::Covalent => ProviderMeta {
                display_name: "Covalent (GoldRush)",
                color: "#FF4C3B",
                env_key: "COVALENT_API_KEY",
            },
            ProviderName::Alchemy => ProviderMeta {
                display_name: "Alchemy",
                color: "#5B8DEF",
                env_key: "ALCHEMY_API_KEY",
            },
            ProviderName::Moralis => ProviderMeta {
                display_name: "Moralis",
                color: "#57C5B6",
                env_key: "MORALIS_API_KEY",
            },
            ProviderName::Mobula => ProviderMeta {
                display_name: "Mobula",
                color: "#E5A93D",
                env_key: "MOBULA_API_KEY",
            },
            ProviderName::Codex => ProviderMeta {
                display_name: "Codex",
                color: "#A78BFA",
                env_key: "CODEX_API_KEY",
            },
        }
    }
}

impl fmt::Display for ProviderName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderName::Covalent => write!(f, "covalent"),
            ProviderName::Alchemy => write!(f, "alchemy"),
            ProviderName::Moralis => write!(f, "moralis"),
            ProviderName::Mobula => write!(f, "mobula"),
            ProviderName::Codex => write!(f, "codex"),
        }
    }
}

/// Per-provider identifiers for one supported chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chain {
    pub id: &'static str,
    pub name: &'static str,
    pub covalent_id: u64,
    pub alchemy_subdomain: &'static str,
    pub moralis_chain: &'static str,
    pub mobula_chain: &'static str,
    pub codex_network_id: u64,
}

pub const DEFAULT_CHAIN: &str = "eth-mainnet";

pub const SUPPORTED_CHAINS: [Chain; 7] = [
    Chain {
        id: "eth-mainnet",
        name: "Ethereum",
        covalent_id: 1,
        alchemy_subdomain: "eth-mainnet",
        moralis_chain: "eth",
        mobula_chain: "ethereum",
        codex_network_id: 1,
    },
    Chain {
        id: "polygon-mainnet",
        name: "Polygon",
        covalent_id: 137,
        alchemy_subdomain: "polygon-mainnet",
        moralis_chain: "polygon",
        mobula_chain: "polygon",
        codex_network_id: 137,
    },
    Chain {
        id: "bsc-mainnet",
        name: "BNB Chain (BSC)",
        covalent_id: 56,
        alchemy_subdomain: "bnb-mainnet",
        moralis_chain: "bsc",
        mobula_chain: "bsc",
        codex_network_id: 56,
    },
    Chain {
        id: "arbitrum-mainnet",
        name: "Arbitrum",
        covalent_id: 42161,
        alchemy_subdomain: "arb-mainnet",
        moralis_chain: "arbitrum",
        mobula_chain: "arbitrum",
        codex_network_id: 42161,
    },
    Chain {
        id: "optimism-mainnet",
        name: "Optimism",
        covalent_id: 10,
        alchemy_subdomain: "opt-mainnet",
        moralis_chain: "optimism",
        mobula_chain: "optimism",
        codex_network_id: 10,
    },
    Chain {
        id: "base-mainnet",
        name: "Base",
        covalent_id: 8453,
        alchemy_subdomain: "base-mainnet",
        moralis_chain: "base",
        mobula_chain: "base",
        codex_network_id: 8453,
    },
    Chain {
        id: "avalanche-mainnet",
        name: "Avalanche",
        covalent_id: 43114,
        alchemy_subdomain: "avax-mainnet",
        moralis_chain: "avalanche",
        mobula_chain: "avalanche",
        codex_network_id: 43114,
    },
];

impl Chain {
    pub fn find(id: &str) -> Option<&'static Chain> {
        SUPPORTED_CHAINS.iter().find(|chain| chain.id == id)
    }
}

/// One asset held or priced for a wallet, normalized across providers.
///
/// Every field is optional because providers disagree on coverage. The raw
/// balance is kept as a string to avoid precision loss on 256-bit amounts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TokenRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decimals: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub balance: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub balance_usd: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_usd: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_24h_change: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contract_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_spam: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_transfer_date: Option<String>,
}
