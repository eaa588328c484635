//! Monthly settlement aggregation and the admin-maintained payment ledger.
//!
//! The aggregation is split in two so the computation can be tested without
//! store mutation: [`ensure_settlement_rows`] idempotently materializes
//! zero-default ledger rows for a month, and [`compute_ledger`] is a pure
//! read that joins expenses, meals, guest meals, duty records, and the
//! settlement rows into one per-member ledger. The GET endpoint runs ensure
//! then compute, which preserves the observable materialize-on-first-view
//! behavior.
//!
//! Two compatibility rules are load-bearing here and must not be "cleaned
//! up": member matching runs over all three historical key forms (internal
//! id, member code, display name), and guest meals are unioned from both the
//! dedicated store and guest-flagged meal rows. Dropping either silently
//! loses old records.
//!
//! The admin breakdown includes pending expenses while the approved-only
//! total excludes them. Admins want visibility into unconfirmed items;
//! member-facing views show only confirmed money movement.

use crate::{
    core::{expense, market, meal, member},
    entities::{MonthlySummary, monthly_summary},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{DbErr, Set, SqlErr, prelude::*};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Settlement status: nothing confirmed yet.
pub const PAYMENT_PENDING: &str = "pending";
/// Settlement status: part of the dues confirmed received.
pub const PAYMENT_PARTIAL: &str = "partial";
/// Settlement status: fully settled for the month.
pub const PAYMENT_CLEAR: &str = "clear";

/// A member's settlement state for one month, as shown in ledgers and
/// invoices. Synthesized with zero defaults when no row exists yet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Settlement {
    /// `"pending"`, `"partial"`, or `"clear"`
    pub payment_status: String,
    /// Amount the admin records as paid
    pub amount_paid: f64,
    /// Amount the member claims to have submitted
    pub submitted_amount: f64,
    /// Amount the admin confirms receiving
    pub received_amount: f64,
    /// Deposit balance snapshot for the month
    pub deposit_balance: f64,
    /// Date of the deposit movement, if any
    pub deposit_date: Option<String>,
    /// Free-text admin note
    pub note: String,
}

impl Default for Settlement {
    fn default() -> Self {
        Self {
            payment_status: PAYMENT_PENDING.to_string(),
            amount_paid: 0.0,
            submitted_amount: 0.0,
            received_amount: 0.0,
            deposit_balance: 0.0,
            deposit_date: None,
            note: String::new(),
        }
    }
}

impl From<monthly_summary::Model> for Settlement {
    fn from(row: monthly_summary::Model) -> Self {
        Self {
            payment_status: row.payment_status,
            amount_paid: row.amount_paid,
            submitted_amount: row.submitted_amount,
            received_amount: row.received_amount,
            deposit_balance: row.deposit_balance,
            deposit_date: row.deposit_date,
            note: row.note,
        }
    }
}

/// One member's line in the monthly ledger.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemberLedger {
    /// Internal member id
    pub member_id: i64,
    /// External member code
    pub member_code: String,
    /// Display name
    pub name: String,
    /// Reference deposit value from the member record
    pub deposit: f64,
    /// Per-category expense sums; every category present, zero-filled.
    /// Includes pending expenses (admin visibility rule).
    pub expense_breakdown: BTreeMap<String, f64>,
    /// Sum of the breakdown: pending-inclusive, rejected-exclusive
    pub expense_total: f64,
    /// Approved-only sum, the figure member-facing views show
    pub approved_expense_total: f64,
    /// Regular (lunch/dinner) meal count
    pub meal_count: u64,
    /// Guest meal count, unioned across both guest stores
    pub guest_meal_count: u64,
    /// Approved market duties this month
    pub duty_count: u64,
    /// Settlement state (zero defaults if not yet materialized)
    pub settlement: Settlement,
}

/// The full monthly ledger returned to admins.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthLedger {
    /// Month key, `YYYY-MM`
    pub month: String,
    /// Deduplicated names of members with duty records this month
    pub duty_member_names: Vec<String>,
    /// One entry per current member
    pub entries: Vec<MemberLedger>,
}

/// Idempotently materializes zero-default settlement rows for every given
/// member in `month`. Existing rows are untouched. A duplicate-key race with
/// a concurrent caller is swallowed: the unique `(month, member_id)` index
/// rejects the second insert and the read path tolerates that.
pub async fn ensure_settlement_rows(
    db: &DatabaseConnection,
    month: &str,
    member_ids: &[i64],
) -> Result<usize> {
    let existing: Vec<i64> = MonthlySummary::find()
        .filter(monthly_summary::Column::Month.eq(month))
        .all(db)
        .await?
        .into_iter()
        .map(|row| row.member_id)
        .collect();

    let now = Utc::now();
    let missing: Vec<monthly_summary::ActiveModel> = member_ids
        .iter()
        .filter(|id| !existing.contains(*id))
        .map(|&member_id| monthly_summary::ActiveModel {
            month: Set(month.to_string()),
            member_id: Set(member_id),
            payment_status: Set(PAYMENT_PENDING.to_string()),
            amount_paid: Set(0.0),
            submitted_amount: Set(0.0),
            received_amount: Set(0.0),
            deposit_balance: Set(0.0),
            deposit_date: Set(None),
            note: Set(String::new()),
            updated_at: Set(now),
            ..Default::default()
        })
        .collect();

    if missing.is_empty() {
        return Ok(0);
    }
    let inserted = missing.len();

    let insert = MonthlySummary::insert_many(missing).on_conflict(
        OnConflict::columns([
            monthly_summary::Column::Month,
            monthly_summary::Column::MemberId,
        ])
        .do_nothing()
        .to_owned(),
    );
    match insert.exec(db).await {
        Ok(_) | Err(DbErr::RecordNotInserted) => Ok(inserted),
        Err(e) => Err(e.into()),
    }
}

/// Pure read: builds the per-member ledger for `month`. No side effects;
/// members without a materialized settlement row get zero defaults in the
/// output. Malformed month keys prefix-match nothing and produce an
/// all-zeros ledger rather than an error.
pub async fn compute_ledger(db: &DatabaseConnection, month: &str) -> Result<MonthLedger> {
    let members = member::list_current_members(db).await?;
    let expenses = expense::list_month_expenses(db, month).await?;
    let meals = meal::list_month_meals(db, month).await?;
    let guest_meals = meal::list_month_guest_meals(db, month).await?;
    let duties = market::list_month_duties(db, month).await?;

    let settlements: BTreeMap<i64, monthly_summary::Model> = MonthlySummary::find()
        .filter(monthly_summary::Column::Month.eq(month))
        .all(db)
        .await?
        .into_iter()
        .map(|row| (row.member_id, row))
        .collect();

    let mut duty_member_names: Vec<String> = Vec::new();
    for duty in &duties {
        if !duty_member_names.contains(&duty.member_name) {
            duty_member_names.push(duty.member_name.clone());
        }
    }

    let mut entries = Vec::with_capacity(members.len());
    for m in &members {
        let mut breakdown: BTreeMap<String, f64> = expense::Category::ALL
            .iter()
            .map(|c| (c.as_str().to_string(), 0.0))
            .collect();
        let mut expense_total = 0.0;
        let mut approved_expense_total = 0.0;

        for e in expenses.iter().filter(|e| member::member_matches(m, &e.paid_by)) {
            // Unknown historical category strings fold into "others" so no
            // money silently disappears from the breakdown
            let category = expense::Category::parse(&e.category)
                .unwrap_or(expense::Category::Others)
                .as_str();
            if let Some(slot) = breakdown.get_mut(category) {
                *slot += e.amount;
            }
            expense_total += e.amount;
            if e.status == expense::STATUS_APPROVED {
                approved_expense_total += e.amount;
            }
        }

        let meal_count = meals
            .iter()
            .filter(|row| member::member_matches(m, &row.member_key))
            .count() as u64;
        let guest_meal_count = guest_meals
            .iter()
            .filter(|row| member::member_matches(m, &row.member_key))
            .count() as u64;
        let duty_count = duties
            .iter()
            .filter(|d| d.member_id == m.id && d.status == market::STATUS_APPROVED)
            .count() as u64;

        let settlement = settlements
            .get(&m.id)
            .cloned()
            .map_or_else(Settlement::default, Settlement::from);

        entries.push(MemberLedger {
            member_id: m.id,
            member_code: m.member_code.clone(),
            name: m.name.clone(),
            deposit: m.deposit,
            expense_breakdown: breakdown,
            expense_total,
            approved_expense_total,
            meal_count,
            guest_meal_count,
            duty_count,
            settlement,
        });
    }

    Ok(MonthLedger {
        month: month.to_string(),
        duty_member_names,
        entries,
    })
}

/// Admin-entered settlement payload. Every financial field is replaced on
/// upsert; omitted fields fall back to zero/empty rather than merging with
/// the stored row.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SettlementInput {
    /// `"pending"`, `"partial"`, or `"clear"`; empty means pending
    #[serde(default)]
    pub payment_status: String,
    /// Amount the admin records as paid
    #[serde(default)]
    pub amount_paid: f64,
    /// Amount the member claims to have submitted
    #[serde(default)]
    pub submitted_amount: f64,
    /// Amount the admin confirms receiving
    #[serde(default)]
    pub received_amount: f64,
    /// Deposit balance snapshot
    #[serde(default)]
    pub deposit_balance: f64,
    /// Deposit movement date, if any
    #[serde(default)]
    pub deposit_date: Option<String>,
    /// Free-text note
    #[serde(default)]
    pub note: String,
}

/// Upserts one member's settlement row for `month`, fully replacing every
/// financial field. Never derived from expense/meal data: payment
/// confirmation (cash, bank transfer) is a human decision.
pub async fn upsert_settlement(
    db: &DatabaseConnection,
    month: &str,
    member_id: i64,
    input: SettlementInput,
) -> Result<monthly_summary::Model> {
    let status = if input.payment_status.is_empty() {
        PAYMENT_PENDING.to_string()
    } else {
        input.payment_status
    };
    if status != PAYMENT_PENDING && status != PAYMENT_PARTIAL && status != PAYMENT_CLEAR {
        return Err(Error::Validation {
            message: format!("Unknown payment status: {status}"),
        });
    }

    member::get_member_by_id(db, member_id)
        .await?
        .ok_or_else(|| Error::NotFound {
            what: format!("Member {member_id}"),
        })?;

    let now = Utc::now();
    let existing = MonthlySummary::find()
        .filter(monthly_summary::Column::Month.eq(month))
        .filter(monthly_summary::Column::MemberId.eq(member_id))
        .one(db)
        .await?;

    let is_update = existing.is_some();
    let mut active_model: monthly_summary::ActiveModel = match existing {
        Some(row) => row.into(),
        None => monthly_summary::ActiveModel {
            month: Set(month.to_string()),
            member_id: Set(member_id),
            ..Default::default()
        },
    };

    // Full replacement, no merge
    active_model.payment_status = Set(status);
    active_model.amount_paid = Set(input.amount_paid);
    active_model.submitted_amount = Set(input.submitted_amount);
    active_model.received_amount = Set(input.received_amount);
    active_model.deposit_balance = Set(input.deposit_balance);
    active_model.deposit_date = Set(input.deposit_date);
    active_model.note = Set(input.note);
    active_model.updated_at = Set(now);

    let saved = if is_update {
        active_model.update(db).await?
    } else {
        insert_settlement_row(db, month, member_id, active_model).await?
    };
    Ok(saved)
}

/// Inserts a fresh settlement row. A unique-index violation here means a
/// concurrent writer created the row between the caller's existence check
/// and this insert; that surfaces as a conflict, not a store failure.
async fn insert_settlement_row(
    db: &DatabaseConnection,
    month: &str,
    member_id: i64,
    active_model: monthly_summary::ActiveModel,
) -> Result<monthly_summary::Model> {
    match active_model.insert(db).await {
        Ok(row) => Ok(row),
        Err(e) => match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => Err(Error::Conflict {
                message: format!("Settlement row already exists for {month}, member {member_id}"),
            }),
            _ => Err(e.into()),
        },
    }
}

/// Admin-paid expenses for the month (non-rejected, `paid_by == "admin"`)
/// plus the deduplicated duty member list.
#[derive(Debug, Clone, Serialize)]
pub struct AdminExpenses {
    /// Month key, `YYYY-MM`
    pub month: String,
    /// Non-rejected expenses the admin paid for directly
    pub expenses: Vec<crate::entities::expense::Model>,
    /// Total of those expenses
    pub total: f64,
    /// Deduplicated names of members with duty records this month
    pub duty_member_names: Vec<String>,
}

/// Assembles the admin-paid expense view for a month.
pub async fn admin_expenses(db: &DatabaseConnection, month: &str) -> Result<AdminExpenses> {
    let expenses: Vec<_> = expense::list_month_expenses(db, month)
        .await?
        .into_iter()
        .filter(|e| e.paid_by == expense::PAID_BY_ADMIN)
        .collect();
    let total = expenses.iter().map(|e| e.amount).sum();

    let duties = market::list_month_duties(db, month).await?;
    let mut duty_member_names: Vec<String> = Vec::new();
    for duty in &duties {
        if !duty_member_names.contains(&duty.member_name) {
            duty_member_names.push(duty.member_name.clone());
        }
    }

    Ok(AdminExpenses {
        month: month.to_string(),
        expenses,
        total,
        duty_member_names,
    })
}

/// Everything needed to render one member's monthly invoice.
#[derive(Debug, Clone, Serialize)]
pub struct MemberInvoice {
    /// Month key, `YYYY-MM`
    pub month: String,
    /// The invoiced member
    pub member: crate::entities::member::Model,
    /// The member's non-rejected expenses this month
    pub expenses: Vec<crate::entities::expense::Model>,
    /// Approved-only expense total, the figure shown to the member
    pub approved_expense_total: f64,
    /// The member's regular meals this month
    pub meals: Vec<crate::entities::meal::Model>,
    /// The member's guest meals this month (both stores)
    pub guest_meals: Vec<meal::GuestMealRecord>,
    /// Settlement state (zero defaults if not yet materialized)
    pub settlement: Settlement,
    /// Dates of the member's approved duties this month
    pub duty_dates: Vec<String>,
}

/// Assembles a single-member invoice: expenses, meals, guest meals, the
/// settlement row, and duty dates, all matched with the three-form key rule.
pub async fn member_invoice(
    db: &DatabaseConnection,
    month: &str,
    member_id: i64,
) -> Result<MemberInvoice> {
    let m = member::get_member_by_id(db, member_id)
        .await?
        .ok_or_else(|| Error::NotFound {
            what: format!("Member {member_id}"),
        })?;

    let expenses: Vec<_> = expense::list_month_expenses(db, month)
        .await?
        .into_iter()
        .filter(|e| member::member_matches(&m, &e.paid_by))
        .collect();
    let approved_expense_total = expense::approved_total_for_member(db, month, &m).await?;
    let meals: Vec<_> = meal::list_month_meals(db, month)
        .await?
        .into_iter()
        .filter(|row| member::member_matches(&m, &row.member_key))
        .collect();
    let guest_meals: Vec<_> = meal::list_month_guest_meals(db, month)
        .await?
        .into_iter()
        .filter(|row| member::member_matches(&m, &row.member_key))
        .collect();

    let settlement = MonthlySummary::find()
        .filter(monthly_summary::Column::Month.eq(month))
        .filter(monthly_summary::Column::MemberId.eq(member_id))
        .one(db)
        .await?
        .map_or_else(Settlement::default, Settlement::from);

    let duty_dates: Vec<String> = market::list_month_duties(db, month)
        .await?
        .into_iter()
        .filter(|d| d.member_id == member_id && d.status == market::STATUS_APPROVED)
        .map(|d| d.date)
        .collect();

    Ok(MemberInvoice {
        month: month.to_string(),
        member: m,
        expenses,
        approved_expense_total,
        meals,
        guest_meals,
        settlement,
        duty_dates,
    })
}
