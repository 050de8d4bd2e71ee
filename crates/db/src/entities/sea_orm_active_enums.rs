//! String-backed enums stored in the ledger tables.
//!
//! Each mirrors a `finnit-core` type; the conversions are lossless.

use finnit_core::debt::DebtKind as CoreDebtKind;
use finnit_core::ledger::{
    FlowDirection as CoreFlowDirection, TransactionSource as CoreTransactionSource,
    TransactionType as CoreTransactionType,
};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Kind of money account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum AccountType {
    #[sea_orm(string_value = "cash")]
    Cash,
    #[sea_orm(string_value = "debit")]
    Debit,
    #[sea_orm(string_value = "credit")]
    Credit,
    #[sea_orm(string_value = "savings")]
    Savings,
    #[sea_orm(string_value = "ewallet")]
    Ewallet,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    #[sea_orm(string_value = "income")]
    Income,
    #[sea_orm(string_value = "expense")]
    Expense,
    #[sea_orm(string_value = "transfer")]
    Transfer,
    #[sea_orm(string_value = "adjustment")]
    Adjustment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum FlowDirection {
    #[sea_orm(string_value = "inflow")]
    Inflow,
    #[sea_orm(string_value = "outflow")]
    Outflow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum TransactionSource {
    #[sea_orm(string_value = "manual")]
    Manual,
    #[sea_orm(string_value = "imported")]
    Imported,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum DebtKind {
    #[sea_orm(string_value = "card")]
    Card,
    #[sea_orm(string_value = "loan")]
    Loan,
    #[sea_orm(string_value = "mortgage")]
    Mortgage,
    #[sea_orm(string_value = "paylater")]
    Paylater,
    #[sea_orm(string_value = "other")]
    Other,
}

impl From<TransactionType> for CoreTransactionType {
    fn from(value: TransactionType) -> Self {
        match value {
            TransactionType::Income => Self::Income,
            TransactionType::Expense => Self::Expense,
            TransactionType::Transfer => Self::Transfer,
            TransactionType::Adjustment => Self::Adjustment,
        }
    }
}

impl From<CoreTransactionType> for TransactionType {
    fn from(value: CoreTransactionType) -> Self {
        match value {
            CoreTransactionType::Income => Self::Income,
            CoreTransactionType::Expense => Self::Expense,
            CoreTransactionType::Transfer => Self::Transfer,
            CoreTransactionType::Adjustment => Self::Adjustment,
        }
    }
}

impl From<FlowDirection> for CoreFlowDirection {
    fn from(value: FlowDirection) -> Self {
        match value {
            FlowDirection::Inflow => Self::Inflow,
            FlowDirection::Outflow => Self::Outflow,
        }
    }
}

impl From<CoreFlowDirection> for FlowDirection {
    fn from(value: CoreFlowDirection) -> Self {
        match value {
            CoreFlowDirection::Inflow => Self::Inflow,
            CoreFlowDirection::Outflow => Self::Outflow,
        }
    }
}

impl From<TransactionSource> for CoreTransactionSource {
    fn from(value: TransactionSource) -> Self {
        match value {
            TransactionSource::Manual => Self::Manual,
            TransactionSource::Imported => Self::Imported,
        }
    }
}

impl From<CoreTransactionSource> for TransactionSource {
    fn from(value: CoreTransactionSource) -> Self {
        match value {
            CoreTransactionSource::Manual => Self::Manual,
            CoreTransactionSource::Imported => Self::Imported,
        }
    }
}

impl From<DebtKind> for CoreDebtKind {
    fn from(value: DebtKind) -> Self {
        match value {
            DebtKind::Card => Self::Card,
            DebtKind::Loan => Self::Loan,
            DebtKind::Mortgage => Self::Mortgage,
            DebtKind::Paylater => Self::Paylater,
            DebtKind::Other => Self::Other,
        }
    }
}

impl From<CoreDebtKind> for DebtKind {
    fn from(value: CoreDebtKind) -> Self {
        match value {
            CoreDebtKind::Card => Self::Card,
            CoreDebtKind::Loan => Self::Loan,
            CoreDebtKind::Mortgage => Self::Mortgage,
            CoreDebtKind::Paylater => Self::Paylater,
            CoreDebtKind::Other => Self::Other,
        }
    }
}
