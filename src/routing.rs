//! Application router configuration.

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::{
    AppState,
    attachment::{
        delete_attachment_endpoint, download_attachment_endpoint, list_attachments_endpoint,
        upload_attachment_endpoint,
    },
    budget::{
        budget_template_endpoint, delete_budget_endpoint, get_budget_endpoint,
        get_budgets_endpoint, get_remaining_endpoint, import_budgets_endpoint,
        save_allocations_endpoint, upsert_budget_endpoint,
    },
    cash::{
        create_cash_entry_endpoint, create_karyawan_endpoint, get_karyawan_cash_endpoint,
        get_karyawan_endpoint,
    },
    endpoints,
    gl_account::{
        create_gl_account_endpoint, deactivate_gl_account_endpoint, get_gl_accounts_endpoint,
        update_gl_account_endpoint,
    },
    imprest_fund::{
        create_card_endpoint, create_fund_endpoint, deactivate_card_endpoint,
        delete_fund_endpoint, get_cards_endpoint, get_fund_endpoint, get_funds_endpoint,
        top_up_endpoint, update_card_endpoint, update_fund_endpoint,
    },
    regional::{
        create_regional_endpoint, deactivate_regional_endpoint, get_regionals_endpoint,
        update_regional_endpoint,
    },
    transaction::{
        create_transaction_endpoint, delete_transaction_endpoint, get_transaction_endpoint,
        get_transactions_endpoint, update_transaction_endpoint,
    },
    vendor::{
        create_vendor_endpoint, deactivate_vendor_endpoint, get_vendors_endpoint,
        update_vendor_endpoint,
    },
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(
            endpoints::GL_ACCOUNTS,
            get(get_gl_accounts_endpoint).post(create_gl_account_endpoint),
        )
        .route(
            endpoints::GL_ACCOUNT,
            put(update_gl_account_endpoint).delete(deactivate_gl_account_endpoint),
        )
        .route(
            endpoints::REGIONALS,
            get(get_regionals_endpoint).post(create_regional_endpoint),
        )
        .route(
            endpoints::REGIONAL,
            put(update_regional_endpoint).delete(deactivate_regional_endpoint),
        )
        .route(
            endpoints::VENDORS,
            get(get_vendors_endpoint).post(create_vendor_endpoint),
        )
        .route(
            endpoints::VENDOR,
            put(update_vendor_endpoint).delete(deactivate_vendor_endpoint),
        )
        .route(
            endpoints::BUDGETS,
            get(get_budgets_endpoint).post(upsert_budget_endpoint),
        )
        .route(endpoints::BUDGET_IMPORT, post(import_budgets_endpoint))
        .route(endpoints::BUDGET_TEMPLATE, get(budget_template_endpoint))
        .route(
            endpoints::BUDGET,
            get(get_budget_endpoint).delete(delete_budget_endpoint),
        )
        .route(endpoints::BUDGET_ALLOCATIONS, put(save_allocations_endpoint))
        .route(endpoints::REMAINING, get(get_remaining_endpoint))
        .route(
            endpoints::TRANSACTIONS,
            get(get_transactions_endpoint).post(create_transaction_endpoint),
        )
        .route(
            endpoints::TRANSACTION,
            get(get_transaction_endpoint)
                .put(update_transaction_endpoint)
                .delete(delete_transaction_endpoint),
        )
        .route(
            endpoints::TRANSACTION_ATTACHMENTS,
            get(list_attachments_endpoint).post(upload_attachment_endpoint),
        )
        .route(
            endpoints::TRANSACTION_ATTACHMENT,
            get(download_attachment_endpoint).delete(delete_attachment_endpoint),
        )
        .route(
            endpoints::CARDS,
            get(get_cards_endpoint).post(create_card_endpoint),
        )
        .route(
            endpoints::CARD,
            put(update_card_endpoint).delete(deactivate_card_endpoint),
        )
        .route(endpoints::CARD_TOP_UP, post(top_up_endpoint))
        .route(
            endpoints::IMPREST_FUNDS,
            get(get_funds_endpoint).post(create_fund_endpoint),
        )
        .route(
            endpoints::IMPREST_FUND,
            get(get_fund_endpoint)
                .put(update_fund_endpoint)
                .delete(delete_fund_endpoint),
        )
        .route(
            endpoints::KARYAWAN,
            get(get_karyawan_endpoint).post(create_karyawan_endpoint),
        )
        .route(endpoints::KARYAWAN_CASH, get(get_karyawan_cash_endpoint))
        .route(endpoints::CASH, post(create_cash_entry_endpoint))
        .with_state(state)
}
