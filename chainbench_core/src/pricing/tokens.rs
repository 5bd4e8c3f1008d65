use super::dto::{PricingToken, TokenCategory};
use crate::providers::dto::Chain;

use TokenCategory::{BlueChip, Defi, LongTail, Stablecoin};

type ProbeEntry = (&'static str, &'static str, &'static str, TokenCategory);

const ETHEREUM: &[ProbeEntry] = &[
    ("0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2", "WETH", "Wrapped Ether", BlueChip),
    ("0x2260FAC5E5542a773Aa44fBCfeDf7C193bc2C599", "WBTC", "Wrapped BTC", BlueChip),
    ("0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48", "USDC", "USD Coin", Stablecoin),
    ("0xdAC17F958D2ee523a2206206994597C13D831ec7", "USDT", "Tether USD", Stablecoin),
    ("0x6B175474E89094C44Da98b954EedeAC495271d0F", "DAI", "Dai Stablecoin", Stablecoin),
    ("0x1f9840a85d5aF5bf1D1762F925BDADdC4201F984", "UNI", "Uniswap", Defi),
    ("0x7Fc66500c84A76Ad7e9c93437bFc5Ac33E2DDaE9", "AAVE", "Aave", Defi),
    ("0x514910771AF9Ca656af840dff83E8264EcF986CA", "LINK", "Chainlink", Defi),
    ("0x5A98FcBEA516Cf06857215779Fd812CA3beF1B32", "LDO", "Lido DAO", Defi),
    ("0x6982508145454Ce325dDbE47a25d4ec3d2311933", "PEPE", "Pepe", LongTail),
    ("0x95aD61b0a150d79219dCF64E1E6Cc01f0B64C4cE", "SHIB", "Shiba Inu", LongTail),
];

const POLYGON: &[ProbeEntry] = &[
    ("0x0d500B1d8E8eF31E21C99d1Db9A6444d3ADf1270", "WMATIC", "Wrapped Matic", BlueChip),
    ("0x7ceB23fD6bC0adD59E62ac25578270cFf1b9f619", "WETH", "Wrapped Ether", BlueChip),
    ("0x1BFD67037B42Cf73acF2047067bd4F2C47D9BfD6", "WBTC", "Wrapped BTC", BlueChip),
    ("0x3c499c542cEF5E3811e1192ce70d8cC03d5c3359", "USDC", "USD Coin", Stablecoin),
    ("0xc2132D05D31c914a87C6611C10748AEb04B58e8F", "USDT", "Tether USD", Stablecoin),
    ("0x8f3Cf7ad23Cd3CaDbD9735AFf958023239c6A063", "DAI", "Dai Stablecoin", Stablecoin),
    ("0xD6DF932A45C0f255f85145f286eA0b292B21C90B", "AAVE", "Aave", Defi),
    ("0x53E0bca35eC356BD5ddDFebbD1Fc0fD03FaBad39", "LINK", "Chainlink", Defi),
    ("0xB5C064F955D8e7F38fE0460C556a72987494eE17", "QUICK", "QuickSwap", LongTail),
];

const BSC: &[ProbeEntry] = &[
    ("0xbb4CdB9CBd36B01bD1cBaEBF2De08d9173bc095c", "WBNB", "Wrapped BNB", BlueChip),
    ("0x2170Ed0880ac9A755fd29B2688956BD959F933F8", "ETH", "Binance-Peg Ether", BlueChip),
    ("0x7130d2A12B9BCbFAe4f2634d864A1Ee1Ce3Ead9c", "BTCB", "Binance-Peg BTCB", BlueChip),
    ("0x55d398326f99059fF775485246999027B3197955", "USDT", "Binance-Peg USDT", Stablecoin),
    ("0x8AC76a51cc950d9822D68b83fE1Ad97B32Cd580d", "USDC", "Binance-Peg USDC", Stablecoin),
    ("0x0E09FaBB73Bd3Ade0a17ECC321fD13a19e81cE82", "CAKE", "PancakeSwap", Defi),
    ("0xcF6BB5389c92Bdda8a3747Ddb454cB7a64626C63", "XVS", "Venus", Defi),
    ("0xc748673057861a797275CD8A068AbB95A902e8de", "BabyDoge", "Baby Doge Coin", LongTail),
];

const ARBITRUM: &[ProbeEntry] = &[
    ("0x82aF49447D8a07e3bd95BD0d56f35241523fBab1", "WETH", "Wrapped Ether", BlueChip),
    ("0x2f2a2543B76A4166549F7aaB2e75Bef0aefC5B0f", "WBTC", "Wrapped BTC", BlueChip),
    ("0xaf88d065e77c8cC2239327C5EDb3A432268e5831", "USDC", "USD Coin", Stablecoin),
    ("0xFd086bC7CD5C481DCC9C85ebE478A1C0b69FCbb9", "USDT", "Tether USD", Stablecoin),
    ("0x912CE59144191C1204E64559FE8253a0e49E6548", "ARB", "Arbitrum", Defi),
    ("0xfc5A1A6EB076a2C7aD06eD22C90d7E710E35ad0a", "GMX", "GMX", Defi),
    ("0x539bdE0d7Dbd336b79148AA742883198BBF60342", "MAGIC", "Magic", LongTail),
];

const OPTIMISM: &[ProbeEntry] = &[
    ("0x4200000000000000000000000000000000000006", "WETH", "Wrapped Ether", BlueChip),
    ("0x0b2C639c533813f4Aa9D7837CAf62653d097Ff85", "USDC", "USD Coin", Stablecoin),
    ("0x94b008aA00579c1307B0EF2c499aD98a8ce58e58", "USDT", "Tether USD", Stablecoin),
    ("0xDA10009cBd5D07dd0CeCc66161FC93D7c9000da1", "DAI", "Dai Stablecoin", Stablecoin),
    ("0x4200000000000000000000000000000000000042", "OP", "Optimism", Defi),
    ("0x8700dAec35aF8Ff88c16BdF0418774CB3D7599B4", "SNX", "Synthetix", Defi),
    ("0x9560e827aF36c94D2Ac33a39bCE1Fe78631088Db", "VELO", "Velodrome", LongTail),
];

const BASE: &[ProbeEntry] = &[
    ("0x4200000000000000000000000000000000000006", "WETH", "Wrapped Ether", BlueChip),
    ("0xcbB7C0000aB88B473b1f5aFd9ef808440eed33Bf", "cbBTC", "Coinbase Wrapped BTC", BlueChip),
    ("0x833589fCD6eDb6E08f4c7C32D4f71b54bdA02913", "USDC", "USD Coin", Stablecoin),
    ("0x50c5725949A6F0c72E6C4a641F24049A917DB0Cb", "DAI", "Dai Stablecoin", Stablecoin),
    ("0x940181a94A35A4569E4529A3CDfB74e38FD98631", "AERO", "Aerodrome", Defi),
    ("0x4ed4E862860beD51a9570b96d89aF5E1B0Efefed", "DEGEN", "Degen", LongTail),
    ("0x532f27101965dd16442E59d40670FaF5eBB142E4", "BRETT", "Brett", LongTail),
];

const AVALANCHE: &[ProbeEntry] = &[
    ("0xB31f66AA3C1e785363F0875A1B74E27b85FD66c7", "WAVAX", "Wrapped AVAX", BlueChip),
    ("0x49D5c2BdFfac6CE2BFdB6640F4F80f226bc10bAB", "WETH.e", "Wrapped Ether", BlueChip),
    ("0xB97EF9Ef8734C71904D8002F8b6Bc66Dd9c48a6E", "USDC", "USD Coin", Stablecoin),
    ("0x9702230A8Ea53601f5cD2dc00fDBc13d4dF4A8c7", "USDt", "Tether USD", Stablecoin),
    ("0x6e84a6216eA6dACC71eE8E6b0a5B7322EEbC0fDd", "JOE", "Trader Joe", Defi),
    ("0x420FcA0121DC28039145009570975747295f2329", "COQ", "Coq Inu", LongTail),
];

fn entries_for(chain_id: &str) -> &'static [ProbeEntry] {
    match chain_id {
        "polygon-mainnet" => POLYGON,
        "bsc-mainnet" => BSC,
        "arbitrum-mainnet" => ARBITRUM,
        "optimism-mainnet" => OPTIMISM,
        "base-mainnet" => BASE,
        "avalanche-mainnet" => AVALANCHE,
        _ => ETHEREUM,
    }
}

/// The fixed pricing probe set for a chain.
pub fn pricing_tokens_for_chain(chain: &Chain) -> Vec<PricingToken> {
    entries_for(chain.id)
        .iter()
        .map(|(address, symbol, name, category)| PricingToken {
            address: address.to_string(),
            symbol: symbol.to_string(),
            name: name.to_string(),
            category: *category,
            chain_id: chain.id.to_string(),
        })
        .collect()
}
