use crate::config::TaxConfig;
use crate::core::parse::{parse_amount, parse_non_negative, parse_optional_amount, parse_percent};
use crate::core::{
    parse_transactions, FinancialYear, PropertyRecord, TaxError, TaxRecords, WorkFromHomeRecord,
};
use crate::tax::brackets::compute_tax;
use crate::tax::cgt::{compute_capital_gains, CapitalGainsSummary};
use crate::tax::depreciation::{compute_depreciation, DepreciableAsset};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;

/// Share of each property attributable to the profile
#[derive(Debug, Clone, Default)]
pub struct OwnershipMap {
    fractions: HashMap<String, Decimal>,
}

impl OwnershipMap {
    pub fn from_properties(properties: &[PropertyRecord]) -> Result<Self, TaxError> {
        let mut fractions = HashMap::new();
        for p in properties {
            let label = format!("property '{}'", p.id);
            let fraction = parse_percent(&label, "ownership_percent", p.ownership_percent.as_deref())?;
            if fraction.is_zero() {
                return Err(TaxError::parse(
                    &label,
                    "ownership_percent",
                    p.ownership_percent.clone().unwrap_or_default(),
                    "must be greater than 0",
                ));
            }
            fractions.insert(p.id.clone(), fraction);
        }
        Ok(OwnershipMap { fractions })
    }

    /// Fraction for `property_id`, or zero when the property is unknown
    pub fn fraction(&self, property_id: &str) -> Decimal {
        match self.fractions.get(property_id) {
            Some(f) => *f,
            None => {
                log::debug!("No property '{}'; its records contribute nothing", property_id);
                Decimal::ZERO
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IncomeBreakdown {
    pub general: Decimal,
    pub property: Decimal,
    pub capital_gains: Decimal,
}

impl IncomeBreakdown {
    pub fn total(&self) -> Decimal {
        self.general + self.property + self.capital_gains
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeductionBreakdown {
    pub property_expenses: Decimal,
    pub receipts: Decimal,
    pub work_from_home: Decimal,
    pub depreciation: Decimal,
}

impl DeductionBreakdown {
    pub fn total(&self) -> Decimal {
        self.property_expenses + self.receipts + self.work_from_home + self.depreciation
    }
}

/// Computed tax position for one profile and financial year
#[derive(Debug, Clone, Serialize)]
pub struct TaxPosition {
    pub financial_year: FinancialYear,
    pub income: IncomeBreakdown,
    pub total_income: Decimal,
    pub deductions: DeductionBreakdown,
    pub total_deductions: Decimal,
    pub deduction_count: usize,
    /// Never negative
    pub taxable_income: Decimal,
    pub tax_payable: Decimal,
    /// Disposals in `financial_year`
    pub capital_gains: CapitalGainsSummary,
}

/// Turn a profile's records into taxable income and tax payable for `year`.
///
/// Any malformed record aborts the calculation with an error naming it.
pub fn aggregate(
    records: &TaxRecords,
    config: &TaxConfig,
    year: FinancialYear,
) -> Result<TaxPosition, TaxError> {
    let ownership = OwnershipMap::from_properties(&records.properties)?;
    let mut deduction_count = 0;

    // Income
    let mut income = IncomeBreakdown::default();
    for r in &records.income {
        let label = format!("income '{}' ({})", r.id, r.date);
        income.general += parse_amount(&label, "amount", &r.amount)?;
    }
    for r in &records.property_income {
        let label = format!("property income '{}' ({})", r.id, r.date);
        let gross = parse_optional_amount(&label, "gross_rent", r.gross_rent.as_deref())?
            + parse_optional_amount(&label, "insurance_payout", r.insurance_payout.as_deref())?
            + parse_optional_amount(&label, "other_income", r.other_income.as_deref())?;
        income.property += gross * ownership.fraction(&r.property_id);
    }

    let transactions = parse_transactions(&records.transactions)?;
    let capital_gains = compute_capital_gains(&transactions).for_year(year);
    income.capital_gains = capital_gains.taxable_capital_gain;

    // Deductions
    let mut deductions = DeductionBreakdown::default();
    for r in &records.property_expenses {
        let label = format!("property expense '{}' ({})", r.id, r.date);
        let amount = parse_amount(&label, "amount", &r.amount)?;
        if r.capital_improvement {
            log::debug!("Skipping capital improvement {}", label);
            continue;
        }
        let fraction = ownership.fraction(&r.property_id);
        if !fraction.is_zero() {
            deductions.property_expenses += amount * fraction;
            deduction_count += 1;
        }
    }
    for r in &records.receipts {
        let label = format!("receipt '{}' ({})", r.id, r.date);
        deductions.receipts += parse_amount(&label, "amount", &r.amount)?;
        deduction_count += 1;
    }
    if let Some(wfh) = &records.work_from_home {
        deductions.work_from_home = work_from_home_deduction(wfh, config)?;
        deduction_count += 1;
    }
    for r in &records.depreciable_assets {
        let asset = DepreciableAsset::try_from(r)?;
        let amount = compute_depreciation(&asset, year.end_date())?;
        if amount > Decimal::ZERO {
            deductions.depreciation += amount;
            deduction_count += 1;
        }
    }

    let total_income = income.total();
    let total_deductions = deductions.total();
    let taxable_income = (total_income - total_deductions).max(Decimal::ZERO);
    let tax_payable = compute_tax(taxable_income, &config.brackets)?;

    log::info!(
        "{}: income {} less deductions {} ({} items) = taxable {}, tax {}",
        year,
        total_income,
        total_deductions,
        deduction_count,
        taxable_income,
        tax_payable
    );

    Ok(TaxPosition {
        financial_year: year,
        income,
        total_income,
        deductions,
        total_deductions,
        deduction_count,
        taxable_income,
        tax_payable,
        capital_gains,
    })
}

/// Fixed rate claims are hours times the configured rate; actual cost claims
/// add up the itemised running costs.
pub fn work_from_home_deduction(
    record: &WorkFromHomeRecord,
    config: &TaxConfig,
) -> Result<Decimal, TaxError> {
    const LABEL: &str = "work-from-home claim";
    match record {
        WorkFromHomeRecord::FixedRate { hours } => {
            let hours = parse_non_negative(LABEL, "hours", Some(hours))?;
            Ok(hours * config.wfh_hourly_rate)
        }
        WorkFromHomeRecord::ActualCost {
            electricity,
            gas,
            internet,
            phone,
            stationery,
            equipment_repairs,
            cleaning,
            other,
        } => {
            let items: [(&'static str, &Option<String>); 8] = [
                ("electricity", electricity),
                ("gas", gas),
                ("internet", internet),
                ("phone", phone),
                ("stationery", stationery),
                ("equipment_repairs", equipment_repairs),
                ("cleaning", cleaning),
                ("other", other),
            ];
            items
                .iter()
                .try_fold(Decimal::ZERO, |total, &(field, value)| -> Result<Decimal, TaxError> {
                    Ok(total + parse_non_negative(LABEL, field, value.as_deref())?)
                })
        }
    }
}
