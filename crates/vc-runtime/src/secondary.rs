//! Secondary-market offers for seasoned positions.

use rand::Rng;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;
use vc_ai::strategy::secondary_bid_adjustment;
use vc_core::money::{format_usd, percent_of, scale, stake_value};
use vc_core::{CompanyId, ExitKind, ExitRecord, HolderId, Investment};
use vc_econ::secondary_offer_fraction;

use crate::error::SecondaryError;
use crate::report::{LogCategory, TurnReport};
use crate::state::GameState;

/// Positions must be held this many months before drawing bids.
pub const MIN_MONTHS_HELD: u32 = 12;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SecondaryOffer {
    pub company: CompanyId,
    pub company_name: String,
    pub buyer_name: String,
    pub buyer_firm: String,
    /// Cash offered for the whole stake.
    pub offer_amount: Decimal,
    /// Offer as a fraction of mark-to-market, in [0.70, 0.90].
    pub offer_fraction: f64,
    pub equity: f64,
    /// Mark-to-market value of the stake when the offer was made.
    pub stake_value: Decimal,
    pub turn: u32,
    /// Expiry passes remaining.
    pub expires_in: u32,
}

/// Open offers to the player.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SecondaryMarket {
    offers: Vec<SecondaryOffer>,
}

impl SecondaryMarket {
    pub fn offers(&self) -> &[SecondaryOffer] {
        &self.offers
    }

    pub fn len(&self) -> usize {
        self.offers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offers.is_empty()
    }

    pub fn has_offer_for(&self, company: CompanyId) -> bool {
        self.offers.iter().any(|o| o.company == company && o.expires_in > 0)
    }

    /// Decrement every offer once and drop those that reach zero.
    pub fn expire_pass(&mut self) -> Vec<SecondaryOffer> {
        for o in self.offers.iter_mut() {
            o.expires_in = o.expires_in.saturating_sub(1);
        }
        let (expired, live) = std::mem::take(&mut self.offers)
            .into_iter()
            .partition(|o| o.expires_in == 0);
        self.offers = live;
        expired
    }

    pub(crate) fn push(&mut self, offer: SecondaryOffer) {
        self.offers.push(offer);
    }

    pub(crate) fn take(&mut self, index: usize) -> Result<SecondaryOffer, SecondaryError> {
        match self.offers.get(index) {
            None => Err(SecondaryError::InvalidIndex(index)),
            Some(o) if o.expires_in == 0 => Err(SecondaryError::Expired),
            Some(_) => Ok(self.offers.remove(index)),
        }
    }

    pub(crate) fn remove_company(&mut self, company: CompanyId) {
        self.offers.retain(|o| o.company != company);
    }
}

/// Whether taking an offer looks sensible, with a one-line reason.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recommendation {
    Sell,
    Hold,
}

pub fn recommend(offer: &SecondaryOffer, inv: &Investment, current_valuation: Decimal) -> (Recommendation, &'static str) {
    let roi = percent_of(offer.offer_amount - inv.amount_invested, inv.amount_invested);
    if roi >= 200.0 {
        (Recommendation::Sell, "Strong return achieved (3x+). Consider taking profits.")
    } else if roi >= 100.0 {
        if inv.months_held >= 24 {
            (Recommendation::Sell, "Solid return after a long hold. Opportunity to redeploy capital.")
        } else {
            (Recommendation::Sell, "Good return (2x+). De-risking the portfolio makes sense.")
        }
    } else if roi < 0.0 {
        (Recommendation::Sell, "Opportunity to cut losses and redeploy capital.")
    } else if current_valuation < scale(inv.entry_valuation, 0.5) {
        (Recommendation::Sell, "Significant underperformance. Consider cutting losses.")
    } else if roi >= 50.0 {
        (Recommendation::Hold, "Moderate gains. Consider holding for higher returns.")
    } else {
        (Recommendation::Hold, "Company showing promise. Hold for potential upside.")
    }
}

impl GameState {
    /// Sell the whole stake behind offer `index` for the offered cash.
    pub fn accept_secondary_offer(&mut self, index: usize) -> Result<SecondaryOffer, SecondaryError> {
        let offer = self.secondary.take(index)?;
        let mut report = TurnReport::new(self.portfolio.turn);
        if let Some(inv) = self.portfolio.take(offer.company) {
            if let Some(company) = self.companies.get_mut(offer.company) {
                company.cap_table.remove_holder(HolderId::Player);
            }
            self.portfolio.cash += offer.offer_amount;
            self.portfolio.exits.push(ExitRecord {
                company: offer.company,
                company_name: offer.company_name.clone(),
                kind: ExitKind::SecondarySale,
                turn: self.portfolio.turn,
                invested: inv.amount_invested,
                proceeds: offer.offer_amount,
            });
            info!(
                company = %offer.company_name,
                buyer = %offer.buyer_firm,
                proceeds = %format_usd(offer.offer_amount),
                "secondary sale"
            );
            self.settle_orphaned_votes(offer.company, &mut report);
        }
        self.refresh_net_worths();
        self.gate.invalidate();
        Ok(offer)
    }

    pub fn decline_secondary_offer(&mut self, index: usize) -> Result<SecondaryOffer, SecondaryError> {
        let offer = self.secondary.take(index)?;
        info!(company = %offer.company_name, buyer = %offer.buyer_firm, "secondary offer declined");
        Ok(offer)
    }

    /// Age existing offers, then roll new bids on eligible positions.
    pub(crate) fn secondary_market_pass(&mut self, report: &mut TurnReport) {
        for expired in self.secondary.expire_pass() {
            report.push(
                LogCategory::Secondary,
                Some(&expired.company_name),
                format!("Secondary market offer for {} has expired", expired.company_name),
            );
        }
        if self.ai_funds.is_empty() {
            return;
        }
        let turn = self.portfolio.turn;
        for inv in self.portfolio.investments.iter() {
            if inv.months_held < MIN_MONTHS_HELD || self.secondary.has_offer_for(inv.company) {
                continue;
            }
            let Some(company) = self.companies.get(inv.company).filter(|c| c.is_active()) else {
                continue;
            };
            if company.valuation() <= Decimal::ZERO || self.rng.gen::<f64>() >= self.config.secondary_offer_chance {
                continue;
            }
            let buyer = &self.ai_funds[self.rng.gen_range(0..self.ai_funds.len())];
            let equity = company.cap_table.equity_of(HolderId::Player);
            let value = stake_value(equity, company.valuation());
            let fraction = secondary_offer_fraction(
                company.valuation(),
                inv.entry_valuation,
                secondary_bid_adjustment(buyer.config.strategy),
            );
            let offer = SecondaryOffer {
                company: inv.company,
                company_name: inv.company_name.clone(),
                buyer_name: buyer.config.name.clone(),
                buyer_firm: buyer.config.firm.clone(),
                offer_amount: scale(value, fraction),
                offer_fraction: fraction,
                equity,
                stake_value: value,
                turn,
                expires_in: self.config.secondary_offer_lifetime,
            };
            report.push(
                LogCategory::Secondary,
                Some(&offer.company_name),
                format!(
                    "{} ({}) offers {} for your {:.2}% of {}",
                    offer.buyer_name,
                    offer.buyer_firm,
                    format_usd(offer.offer_amount),
                    offer.equity,
                    offer.company_name
                ),
            );
            self.secondary.push(offer);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offer(expires_in: u32) -> SecondaryOffer {
        SecondaryOffer {
            company: CompanyId(0),
            company_name: "Ledgerly".into(),
            buyer_name: "CARL".into(),
            buyer_firm: "Sterling & Cooper".into(),
            offer_amount: Decimal::new(80_000, 0),
            offer_fraction: 0.8,
            equity: 5.0,
            stake_value: Decimal::new(100_000, 0),
            turn: 13,
            expires_in,
        }
    }

    #[test]
    fn offers_survive_exactly_their_lifetime() {
        let mut m = SecondaryMarket::default();
        m.push(offer(3));
        assert!(m.expire_pass().is_empty());
        assert!(m.expire_pass().is_empty());
        assert_eq!(m.expire_pass().len(), 1);
        assert!(m.is_empty());
    }

    #[test]
    fn take_checks_index_and_expiry() {
        let mut m = SecondaryMarket::default();
        m.push(offer(0));
        assert_eq!(m.take(3), Err(SecondaryError::InvalidIndex(3)));
        assert_eq!(m.take(0), Err(SecondaryError::Expired));
    }
}
