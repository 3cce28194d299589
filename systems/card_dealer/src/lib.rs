#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Resolves purchase requests into concrete cards.
//!
//! The action printed on a card is decided once, when the purchase is
//! requested. Upgrade purchases flip a fair coin between aim and speed.

use card_defence_core::{CardAction, Command, PurchaseTrack};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const UPGRADE_ACTIONS: [CardAction; 2] = [CardAction::Aim, CardAction::Speed];

/// Configuration parameters required to construct the card dealer.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    rng_seed: u64,
}

impl Config {
    /// Creates a new configuration using the provided seed.
    #[must_use]
    pub const fn new(rng_seed: u64) -> Self {
        Self { rng_seed }
    }
}

/// Seeded dealer that turns purchase requests into `PurchaseCard` commands.
#[derive(Debug)]
pub struct CardDealer {
    rng: ChaCha8Rng,
}

impl CardDealer {
    /// Creates a new dealer using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
        }
    }

    /// Picks the action printed on the next card sold by `track`.
    ///
    /// The draw happens whether or not the world later accepts the purchase.
    pub fn deal(&mut self, track: PurchaseTrack) -> CardAction {
        match track {
            PurchaseTrack::Tower => CardAction::Tower,
            PurchaseTrack::Upgrade => UPGRADE_ACTIONS[self.rng.gen_range(0..UPGRADE_ACTIONS.len())],
            PurchaseTrack::PowerUp => CardAction::Erase,
        }
    }

    /// Emits one `PurchaseCard` command per requested track, in order.
    pub fn handle(&mut self, requests: &[PurchaseTrack], out: &mut Vec<Command>) {
        for &track in requests {
            let action = self.deal(track);
            out.push(Command::PurchaseCard { track, action });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_tracks_deal_fixed_actions() {
        let mut dealer = CardDealer::new(Config::new(1));
        assert_eq!(dealer.deal(PurchaseTrack::Tower), CardAction::Tower);
        assert_eq!(dealer.deal(PurchaseTrack::PowerUp), CardAction::Erase);
    }

    #[test]
    fn upgrades_produce_both_kinds() {
        let mut dealer = CardDealer::new(Config::new(42));
        let actions: Vec<_> = (0..64).map(|_| dealer.deal(PurchaseTrack::Upgrade)).collect();
        assert!(actions.contains(&CardAction::Aim));
        assert!(actions.contains(&CardAction::Speed));
        assert!(actions
            .iter()
            .all(|action| PurchaseTrack::Upgrade.offers(*action)));
    }

    #[test]
    fn handle_preserves_request_order() {
        let mut dealer = CardDealer::new(Config::new(9));
        let mut out = Vec::new();
        dealer.handle(&[PurchaseTrack::PowerUp, PurchaseTrack::Tower], &mut out);
        assert_eq!(
            out,
            vec![
                Command::PurchaseCard {
                    track: PurchaseTrack::PowerUp,
                    action: CardAction::Erase,
                },
                Command::PurchaseCard {
                    track: PurchaseTrack::Tower,
                    action: CardAction::Tower,
                },
            ]
        );
    }

    #[test]
    fn same_seed_deals_same_sequence() {
        let draw = |seed| {
            let mut dealer = CardDealer::new(Config::new(seed));
            (0..16)
                .map(|_| dealer.deal(PurchaseTrack::Upgrade))
                .collect::<Vec<_>>()
        };
        assert_eq!(draw(77), draw(77));
    }
}
