use crate::core::{FinancialYear, Transaction, TransactionKind, Warning};
use chrono::{DateTime, FixedOffset, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;
use std::collections::{BTreeMap, VecDeque};

/// Holding period (in days) that must be exceeded for the discount
const DISCOUNT_HOLDING_DAYS: Decimal = dec!(365);
/// Share of an eligible gain removed by the discount
const DISCOUNT_RATE: Decimal = dec!(0.5);

/// Units acquired by one transaction, consumed first-in first-out
#[derive(Debug, Clone)]
pub struct Lot {
    pub source_id: String,
    pub acquired: DateTime<FixedOffset>,
    pub remaining: Decimal,
    /// Consideration per unit
    pub unit_cost: Decimal,
    /// Fees per unit
    pub unit_fee: Decimal,
}

impl Lot {
    fn from_acquisition(tx: &Transaction) -> Self {
        Lot {
            source_id: tx.id.clone(),
            acquired: tx.datetime,
            remaining: tx.quantity,
            unit_cost: tx.consideration / tx.quantity,
            unit_fee: tx.fees / tx.quantity,
        }
    }

    fn is_exhausted(&self) -> bool {
        self.remaining <= Decimal::ZERO
    }
}

/// Slice of a lot consumed by a disposal
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchedLot {
    pub source_id: String,
    pub acquired: NaiveDate,
    pub quantity: Decimal,
    /// Cost base of this slice, fees included
    pub cost: Decimal,
    pub holding_days: i64,
}

/// Result of matching one disposal against the asset's lots
#[derive(Debug, Clone, Serialize)]
pub struct DisposalEvent {
    pub transaction_id: String,
    pub asset: String,
    pub disposed: DateTime<FixedOffset>,
    pub quantity: Decimal,
    /// Consideration less fees
    pub proceeds: Decimal,
    pub cost_base: Decimal,
    pub fees: Decimal,
    pub gross_gain: Decimal,
    /// Quantity-weighted holding period
    pub holding_days: Decimal,
    pub discount_eligible: bool,
    pub discount: Decimal,
    pub taxable_gain: Decimal,
    pub matched_lots: Vec<MatchedLot>,
    /// Quantity with no recorded acquisition (zero cost base)
    pub unmatched_quantity: Decimal,
    pub warnings: Vec<Warning>,
}

impl DisposalEvent {
    pub fn date(&self) -> NaiveDate {
        self.disposed.date_naive()
    }

    pub fn financial_year(&self) -> FinancialYear {
        FinancialYear::from_date(self.date())
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Per-asset totals
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AssetGains {
    pub disposals: usize,
    pub proceeds: Decimal,
    pub cost_base: Decimal,
    pub gross_gain: Decimal,
    pub discount: Decimal,
    pub taxable_gain: Decimal,
}

/// All disposal events with their totals
#[derive(Debug, Clone, Default, Serialize)]
pub struct CapitalGainsSummary {
    /// Sorted by disposal date
    pub events: Vec<DisposalEvent>,
    /// Sum of positive taxable gains
    pub total_gains: Decimal,
    /// Absolute sum of negative taxable gains
    pub total_losses: Decimal,
    pub total_discount_applied: Decimal,
    /// Signed sum of all taxable gains
    pub taxable_capital_gain: Decimal,
}

impl CapitalGainsSummary {
    pub fn from_events(mut events: Vec<DisposalEvent>) -> Self {
        events.sort_by_key(|e| e.disposed);

        let mut summary = CapitalGainsSummary::default();
        for e in &events {
            if e.taxable_gain > Decimal::ZERO {
                summary.total_gains += e.taxable_gain;
            } else {
                summary.total_losses += e.taxable_gain.abs();
            }
            summary.total_discount_applied += e.discount;
            summary.taxable_capital_gain += e.taxable_gain;
        }
        summary.events = events;
        summary
    }

    /// Only disposals inside `year`, with totals recomputed
    pub fn for_year(&self, year: FinancialYear) -> CapitalGainsSummary {
        let events = self
            .events
            .iter()
            .filter(|e| year.contains(e.date()))
            .cloned()
            .collect();
        CapitalGainsSummary::from_events(events)
    }

    pub fn by_asset(&self) -> BTreeMap<String, AssetGains> {
        let mut out: BTreeMap<String, AssetGains> = BTreeMap::new();
        for e in &self.events {
            let entry = out.entry(e.asset.clone()).or_default();
            entry.disposals += 1;
            entry.proceeds += e.proceeds;
            entry.cost_base += e.cost_base;
            entry.gross_gain += e.gross_gain;
            entry.discount += e.discount;
            entry.taxable_gain += e.taxable_gain;
        }
        out
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Warning> {
        self.events.iter().flat_map(|e| e.warnings.iter())
    }
}

/// Match disposals against acquisitions first-in first-out, per asset.
///
/// Input order does not matter: transactions are sorted by timestamp (with
/// acquisitions ahead of disposals at the same instant) and each asset's
/// stream is processed on its own. A disposal larger than the units held is
/// not an error; the shortfall gets a zero cost base and a warning.
pub fn compute_capital_gains(transactions: &[Transaction]) -> CapitalGainsSummary {
    let mut sorted: Vec<&Transaction> = transactions.iter().collect();
    sorted.sort_by_key(|tx| (tx.datetime, tx.kind == TransactionKind::Disposal));

    let mut by_asset: BTreeMap<&str, Vec<&Transaction>> = BTreeMap::new();
    for tx in sorted {
        by_asset.entry(tx.asset.as_str()).or_default().push(tx);
    }

    let mut events = Vec::new();
    for (asset, stream) in by_asset {
        log::debug!("Matching {} transactions for {}", stream.len(), asset);
        let mut lots: VecDeque<Lot> = VecDeque::new();
        for tx in stream {
            if tx.kind.is_acquisition_like() {
                let lot = Lot::from_acquisition(tx);
                log::debug!(
                    "Lot {} {}: qty={}, unit cost={}, unit fee={}",
                    asset,
                    lot.source_id,
                    lot.remaining,
                    lot.unit_cost,
                    lot.unit_fee
                );
                lots.push_back(lot);
            } else {
                events.push(match_disposal(tx, &mut lots));
            }
        }
    }

    CapitalGainsSummary::from_events(events)
}

fn match_disposal(tx: &Transaction, lots: &mut VecDeque<Lot>) -> DisposalEvent {
    let disposal_date = tx.date();
    let mut still_needed = tx.quantity;
    let mut cost_base = Decimal::ZERO;
    let mut weighted_days = Decimal::ZERO;
    let mut matched_lots = Vec::new();

    while still_needed > Decimal::ZERO {
        let Some(lot) = lots.front_mut() else {
            break;
        };
        if lot.is_exhausted() {
            lots.pop_front();
            continue;
        }

        let take = lot.remaining.min(still_needed);
        let cost = take * (lot.unit_cost + lot.unit_fee);
        let holding_days = (disposal_date - lot.acquired.date_naive()).num_days();

        cost_base += cost;
        weighted_days += take * Decimal::from(holding_days);
        matched_lots.push(MatchedLot {
            source_id: lot.source_id.clone(),
            acquired: lot.acquired.date_naive(),
            quantity: take,
            cost,
            holding_days,
        });
        log::debug!(
            "FIFO match {} {}: {} from lot {} at cost {} ({} days)",
            tx.asset,
            tx.id,
            take,
            lot.source_id,
            cost,
            holding_days
        );

        lot.remaining -= take;
        still_needed -= take;
        if lot.is_exhausted() {
            lots.pop_front();
        }
    }

    let mut warnings = Vec::new();
    let unmatched_quantity = still_needed.max(Decimal::ZERO);
    if unmatched_quantity > Decimal::ZERO {
        let warning = Warning::UnmatchedDisposal {
            transaction_id: tx.id.clone(),
            asset: tx.asset.clone(),
            date: disposal_date,
            required: tx.quantity,
            matched: tx.quantity - unmatched_quantity,
        };
        log::warn!("{}", warning);
        warnings.push(warning);
    }

    let proceeds = tx.consideration - tx.fees;
    let gross_gain = proceeds - cost_base;
    let holding_days = if tx.quantity.is_zero() {
        Decimal::ZERO
    } else {
        weighted_days / tx.quantity
    };
    let discount_eligible = holding_days > DISCOUNT_HOLDING_DAYS && gross_gain > Decimal::ZERO;
    let discount = if discount_eligible {
        gross_gain * DISCOUNT_RATE
    } else {
        Decimal::ZERO
    };

    DisposalEvent {
        transaction_id: tx.id.clone(),
        asset: tx.asset.clone(),
        disposed: tx.datetime,
        quantity: tx.quantity,
        proceeds,
        cost_base,
        fees: tx.fees,
        gross_gain,
        holding_days,
        discount_eligible,
        discount,
        taxable_gain: gross_gain - discount,
        matched_lots,
        unmatched_quantity,
        warnings,
    }
}
