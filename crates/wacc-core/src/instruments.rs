//! Capital instruments and the fixed-order map that keys every per-instrument
//! quantity (costs, weights, book and market amounts).
//!
//! The canonical order is
//! `[Equity, Preference, RedeemableDebt, IrredeemableDebt, BankLoan]`.
//! Anything that crosses the slice boundary is converted through
//! [`InstrumentMap::try_from_slice`] so that positional data cannot be
//! zipped against the wrong instrument.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Index, IndexMut};
use std::str::FromStr;

use crate::error::WaccError;
use crate::WaccResult;

/// The five sources of finance a company can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Instrument {
    Equity,
    Preference,
    RedeemableDebt,
    IrredeemableDebt,
    BankLoan,
}

impl Instrument {
    /// All instruments in canonical order.
    pub const ALL: [Instrument; 5] = [
        Instrument::Equity,
        Instrument::Preference,
        Instrument::RedeemableDebt,
        Instrument::IrredeemableDebt,
        Instrument::BankLoan,
    ];

    /// Position of the instrument in the canonical order (0-4).
    pub fn index(self) -> usize {
        match self {
            Instrument::Equity => 0,
            Instrument::Preference => 1,
            Instrument::RedeemableDebt => 2,
            Instrument::IrredeemableDebt => 3,
            Instrument::BankLoan => 4,
        }
    }

    pub fn from_index(index: usize) -> WaccResult<Instrument> {
        Instrument::ALL
            .get(index)
            .copied()
            .ok_or_else(|| WaccError::InvalidInput {
                field: "missing_index".into(),
                reason: format!("Instrument index must be 0-4, got {index}"),
            })
    }

    /// snake_case name, matching the serialized form.
    pub fn key(self) -> &'static str {
        match self {
            Instrument::Equity => "equity",
            Instrument::Preference => "preference",
            Instrument::RedeemableDebt => "redeemable_debt",
            Instrument::IrredeemableDebt => "irredeemable_debt",
            Instrument::BankLoan => "bank_loan",
        }
    }

    /// Human-readable label used in tables and reports.
    pub fn label(self) -> &'static str {
        match self {
            Instrument::Equity => "Equity",
            Instrument::Preference => "Preference",
            Instrument::RedeemableDebt => "Redeemable debt",
            Instrument::IrredeemableDebt => "Irredeemable debt",
            Instrument::BankLoan => "Bank loans",
        }
    }
}

impl fmt::Display for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Instrument {
    type Err = WaccError;

    /// Accepts snake_case or kebab-case names, or a canonical index.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        match normalized.as_str() {
            "equity" => Ok(Instrument::Equity),
            "preference" => Ok(Instrument::Preference),
            "redeemable_debt" => Ok(Instrument::RedeemableDebt),
            "irredeemable_debt" => Ok(Instrument::IrredeemableDebt),
            "bank_loan" | "bank_loans" => Ok(Instrument::BankLoan),
            other => match other.parse::<usize>() {
                Ok(idx) => Instrument::from_index(idx),
                Err(_) => Err(WaccError::InvalidInput {
                    field: "instrument".into(),
                    reason: format!("Unknown instrument '{s}'"),
                }),
            },
        }
    }
}

/// Exactly one value per [`Instrument`], serialized as an object keyed by
/// instrument name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstrumentMap<T> {
    pub equity: T,
    pub preference: T,
    pub redeemable_debt: T,
    pub irredeemable_debt: T,
    pub bank_loan: T,
}

impl<T> InstrumentMap<T> {
    /// Build a map by evaluating `f` once per instrument, in canonical order.
    pub fn from_fn(mut f: impl FnMut(Instrument) -> T) -> Self {
        InstrumentMap {
            equity: f(Instrument::Equity),
            preference: f(Instrument::Preference),
            redeemable_debt: f(Instrument::RedeemableDebt),
            irredeemable_debt: f(Instrument::IrredeemableDebt),
            bank_loan: f(Instrument::BankLoan),
        }
    }

    pub fn from_array(values: [T; 5]) -> Self {
        let [equity, preference, redeemable_debt, irredeemable_debt, bank_loan] = values;
        InstrumentMap {
            equity,
            preference,
            redeemable_debt,
            irredeemable_debt,
            bank_loan,
        }
    }

    pub fn get(&self, instrument: Instrument) -> &T {
        match instrument {
            Instrument::Equity => &self.equity,
            Instrument::Preference => &self.preference,
            Instrument::RedeemableDebt => &self.redeemable_debt,
            Instrument::IrredeemableDebt => &self.irredeemable_debt,
            Instrument::BankLoan => &self.bank_loan,
        }
    }

    pub fn get_mut(&mut self, instrument: Instrument) -> &mut T {
        match instrument {
            Instrument::Equity => &mut self.equity,
            Instrument::Preference => &mut self.preference,
            Instrument::RedeemableDebt => &mut self.redeemable_debt,
            Instrument::IrredeemableDebt => &mut self.irredeemable_debt,
            Instrument::BankLoan => &mut self.bank_loan,
        }
    }

    /// Iterate `(instrument, value)` pairs in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (Instrument, &T)> + '_ {
        Instrument::ALL.into_iter().map(move |i| (i, self.get(i)))
    }

    pub fn map<U>(&self, mut f: impl FnMut(Instrument, &T) -> U) -> InstrumentMap<U> {
        InstrumentMap::from_fn(|i| f(i, self.get(i)))
    }
}

impl<T: Clone> InstrumentMap<T> {
    /// Convert a positional slice in canonical order. The slice must hold
    /// exactly five values.
    pub fn try_from_slice(values: &[T]) -> WaccResult<Self> {
        if values.len() != Instrument::ALL.len() {
            return Err(WaccError::InvalidInput {
                field: "values".into(),
                reason: format!(
                    "Expected {} values (one per instrument), got {}",
                    Instrument::ALL.len(),
                    values.len()
                ),
            });
        }
        Ok(InstrumentMap::from_fn(|i| values[i.index()].clone()))
    }

    /// Values in canonical order.
    pub fn to_vec(&self) -> Vec<T> {
        self.iter().map(|(_, v)| v.clone()).collect()
    }
}

impl<T> Index<Instrument> for InstrumentMap<T> {
    type Output = T;

    fn index(&self, instrument: Instrument) -> &T {
        self.get(instrument)
    }
}

impl<T> IndexMut<Instrument> for InstrumentMap<T> {
    fn index_mut(&mut self, instrument: Instrument) -> &mut T {
        self.get_mut(instrument)
    }
}
