//! The imprest (petty cash) fund: a revolving card balance, fund requests
//! moving through draft, open, proses, and close, and the bookkeeping that
//! keeps the card saldo and generated transactions in step.

pub mod card;
pub mod core;
mod endpoints;
pub mod lifecycle;

pub use card::{
    ImprestFundCard, NewCard, adjust_saldo, create_card, create_card_table, get_card, list_cards,
    set_card_active, update_card,
};
pub use core::{
    FundStatus, ImprestFund, ImprestItem, NewImprestItem, create_imprest_fund_table,
    create_imprest_item_table, get_fund, list_funds, list_items,
};
pub use endpoints::{
    create_card_endpoint, create_fund_endpoint, deactivate_card_endpoint, delete_fund_endpoint,
    get_cards_endpoint, get_fund_endpoint, get_funds_endpoint, top_up_endpoint,
    update_card_endpoint, update_fund_endpoint,
};
pub use lifecycle::{FundDetail, FundPayload, create_fund, delete_fund, top_up, update_fund};
