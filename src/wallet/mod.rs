mod core;
mod create_endpoint;
mod list_endpoint;
mod view_endpoint;

pub use core::{
    NewWallet, Wallet, WalletId, WalletName, WalletWithHistory, create_wallet,
    create_wallet_table, get_wallet, get_wallet_with_history, get_wallets_for_user,
};
pub(crate) use core::select_wallets_for_user;
pub use create_endpoint::create_wallet_endpoint;
pub use list_endpoint::list_wallets_endpoint;
pub use view_endpoint::get_wallet_endpoint;
