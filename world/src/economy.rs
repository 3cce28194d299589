//! Coin balance, score and the compounding price tracks.

use card_defence_core::{EconomyStatus, PurchaseError, PurchaseTrack};

/// Raw, unrounded cost of the next purchase on a single track.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct CostTrack {
    track: PurchaseTrack,
    cost: f64,
}

impl CostTrack {
    pub(crate) fn new(track: PurchaseTrack) -> Self {
        Self {
            track,
            cost: track.initial_cost(),
        }
    }

    /// Price charged for the next purchase, rounded half away from zero.
    pub(crate) fn price(&self) -> u32 {
        let rounded = self.cost.round();
        if rounded >= f64::from(u32::MAX) {
            u32::MAX
        } else {
            rounded as u32
        }
    }

    pub(crate) fn raw(&self) -> f64 {
        self.cost
    }

    fn grow(&mut self) {
        self.cost = self.track.next_cost(self.cost);
    }
}

/// Balances owned by the player during a session.
#[derive(Clone, Debug)]
pub(crate) struct Ledger {
    coins: u32,
    score: u32,
    tower: CostTrack,
    upgrade: CostTrack,
    power_up: CostTrack,
}

impl Ledger {
    pub(crate) fn new() -> Self {
        Self {
            coins: 0,
            score: 0,
            tower: CostTrack::new(PurchaseTrack::Tower),
            upgrade: CostTrack::new(PurchaseTrack::Upgrade),
            power_up: CostTrack::new(PurchaseTrack::PowerUp),
        }
    }

    pub(crate) fn track(&self, track: PurchaseTrack) -> &CostTrack {
        match track {
            PurchaseTrack::Tower => &self.tower,
            PurchaseTrack::Upgrade => &self.upgrade,
            PurchaseTrack::PowerUp => &self.power_up,
        }
    }

    fn track_mut(&mut self, track: PurchaseTrack) -> &mut CostTrack {
        match track {
            PurchaseTrack::Tower => &mut self.tower,
            PurchaseTrack::Upgrade => &mut self.upgrade,
            PurchaseTrack::PowerUp => &mut self.power_up,
        }
    }

    /// Pays out a single enemy hit.
    pub(crate) fn reward_hit(&mut self) {
        self.coins = self.coins.saturating_add(1);
        self.score = self.score.saturating_add(1);
    }

    /// Deducts the rounded price and compounds the track, returning the price paid.
    pub(crate) fn charge(&mut self, track: PurchaseTrack) -> Result<u32, PurchaseError> {
        let price = self.track(track).price();
        if self.coins < price {
            return Err(PurchaseError::InsufficientCoins {
                price,
                balance: self.coins,
            });
        }

        self.coins -= price;
        self.track_mut(track).grow();
        Ok(price)
    }

    pub(crate) fn status(&self) -> EconomyStatus {
        EconomyStatus {
            coins: self.coins,
            score: self.score,
            tower_price: self.tower.price(),
            upgrade_price: self.upgrade.price(),
            power_up_price: self.power_up.price(),
        }
    }
}
