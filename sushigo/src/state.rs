use std::collections::BTreeMap;

use tracing::warn;

use crate::Card;

/// Every hand this client will hold over one round, as hands rotate between
/// players.
///
/// One slot per seat position relative to this client. A slot stays `None`
/// until the server first deals us that physical hand; from then on it holds
/// the progressively depleted copy we track as cards are played from it.
/// `None` therefore means "not yet seen", which is distinct from a hand that
/// has been fully played down to an empty `Vec`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HandRotation {
    pub(crate) slots: Vec<Option<Vec<Card>>>,
    pub(crate) cursor: usize,
}

impl HandRotation {
    /// A `player_count` of 0 (not yet announced) degrades to a single slot.
    pub fn new(player_count: usize) -> Self {
        Self {
            slots: vec![None; player_count.max(1)],
            cursor: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn slot(&self, index: usize) -> Option<&[Card]> {
        self.slots.get(index)?.as_deref()
    }

    /// The hand currently in play.
    pub fn current(&self) -> Option<&[Card]> {
        self.slot(self.cursor)
    }

    /// The hand that will rotate to us next turn, if the server has already
    /// shown it to us this round.
    pub fn next_hand(&self) -> Option<&[Card]> {
        self.slot(self.cursor + 1)
    }

    /// Populates the slot at the cursor the first time that hand is seen.
    /// Later observations of the same slot leave the tracked (depleted)
    /// copy alone.
    pub fn observe(&mut self, cards: &[Card]) {
        if let Some(slot @ None) = self.slots.get_mut(self.cursor) {
            *slot = Some(cards.to_vec());
        }
    }

    /// Removes one occurrence of `card` from the slot at the cursor.
    /// Returns false if the slot is unknown or does not hold the card.
    pub fn remove_from_current(&mut self, card: Card) -> bool {
        if let Some(Some(hand)) = self.slots.get_mut(self.cursor) {
            if let Some(position) = hand.iter().position(|&c| c == card) {
                hand.remove(position);
                return true;
            }
        }
        false
    }

    /// Puts `card` back into the slot at the cursor (a chopstick play
    /// returns the Chopsticks card to the hand that passes on).
    pub fn return_to_current(&mut self, card: Card) {
        if let Some(Some(hand)) = self.slots.get_mut(self.cursor) {
            hand.push(card);
        }
    }

    pub fn advance(&mut self) {
        self.cursor += 1;
    }
}

/// Everything we know about the current game.
///
/// Round-scoped fields (tableaux, rotation, turn counter) are reset by
/// [`on_round_start`](GameSession::on_round_start); the whole record is
/// discarded when a match ends.
#[derive(Clone, Debug)]
pub struct GameSession {
    pub game_id: String,
    pub player_id: u32,
    /// Opaque credential for reconnecting to this game after a disconnect.
    pub rejoin_token: String,
    /// Our own display name, used to find ourselves in reveal maps.
    pub player_name: String,
    /// Set from GAME_START; 0 until then.
    pub player_count: usize,
    /// Current round, 1 through 3.
    pub round: u8,
    /// Turn within the current round, starting at 1.
    pub turn: u32,
    /// The hand we are holding right now, updated on every HAND message.
    pub hand: Vec<Card>,
    /// Cards we have played in front of us this round.
    pub tableau: Vec<Card>,
    /// Every player's tableau this round, keyed by name. Keys are added
    /// lazily on first reveal and never removed mid-round.
    pub all_tableaux: BTreeMap<String, Vec<Card>>,
    pub rotation: HandRotation,
    /// The card we played most recently (None before the first play).
    pub last_card_played: Option<Card>,
    /// What every player revealed last turn.
    pub last_reveals: BTreeMap<String, Vec<Card>>,
}

impl GameSession {
    pub fn new(
        game_id: String,
        player_id: u32,
        rejoin_token: String,
        player_name: String,
    ) -> Self {
        Self {
            game_id,
            player_id,
            rejoin_token,
            player_name,
            player_count: 0,
            round: 1,
            turn: 1,
            hand: Vec::new(),
            tableau: Vec::new(),
            all_tableaux: BTreeMap::new(),
            rotation: HandRotation::new(0),
            last_card_played: None,
            last_reveals: BTreeMap::new(),
        }
    }

    /// GAME_START: the player count is now known, size the rotation buffer.
    pub fn on_game_start(&mut self, player_count: usize) {
        self.player_count = player_count;
        self.rotation = HandRotation::new(player_count);
    }

    /// ROUND_START: reset every round-scoped field.
    pub fn on_round_start(&mut self, round: u8) {
        self.round = round;
        self.turn = 1;
        self.tableau.clear();
        self.all_tableaux.clear();
        self.last_card_played = None;
        self.last_reveals.clear();
        self.rotation = HandRotation::new(self.player_count);
    }

    /// HAND: record the dealt hand into the rotation slot at the cursor and
    /// make it the working hand.
    pub fn observe_hand(&mut self, cards: Vec<Card>) {
        self.rotation.observe(&cards);
        self.hand = cards;
    }

    /// Updates state to reflect that we just played `card`: it joins our
    /// tableau and leaves the tracked rotation slot. A card absent from the
    /// slot indicates reveal/observation drift and is a logged no-op there.
    pub fn record_play(&mut self, card: Card) {
        self.last_card_played = Some(card);
        self.tableau.push(card);
        if !self.rotation.remove_from_current(card) {
            warn!(card = %card, slot = self.rotation.cursor(), "Played card not in tracked hand slot");
        }
    }

    /// PLAYED: everyone's reveal for this turn. Appends each player's cards
    /// (two for a chopstick play) to their tableau, re-synchronizes our own
    /// tableau under our name, and advances the turn and the rotation cursor.
    pub fn record_reveal(&mut self, reveals: BTreeMap<String, Vec<Card>>) {
        for (player, cards) in &reveals {
            self.all_tableaux
                .entry(player.clone())
                .or_default()
                .extend(cards.iter().copied());
        }
        if let Some(own) = self.all_tableaux.get(&self.player_name) {
            self.tableau = own.clone();
        }
        self.last_reveals = reveals;
        self.turn += 1;
        self.rotation.advance();
    }

    // ── Derived facts ────────────────────────────────────────────────────

    /// How many of a card type are in our tableau this round.
    pub fn count(&self, card: Card) -> usize {
        self.tableau.iter().filter(|&&c| c == card).count()
    }

    /// True if Chopsticks are available in our tableau.
    pub fn has_chopsticks(&self) -> bool {
        self.tableau.contains(&Card::Chopsticks)
    }

    /// True if we have a Wasabi not yet paired with a Nigiri. Each Wasabi
    /// pairs with the next Nigiri played after it.
    pub fn has_unused_wasabi(&self) -> bool {
        let nigiri = self.tableau.iter().filter(|c| c.is_nigiri()).count();
        self.count(Card::Wasabi) > nigiri
    }

    /// Puddings collected this round.
    pub fn puddings(&self) -> usize {
        self.count(Card::Pudding)
    }

    pub fn next_hand(&self) -> Option<&[Card]> {
        self.rotation.next_hand()
    }

    /// Total turns in a round for the known player count; 0 if unknown.
    pub fn total_turns(&self) -> u32 {
        match self.player_count {
            2 => 10,
            3 => 9,
            4 => 8,
            5 => 7,
            _ => 0,
        }
    }

    /// Turns remaining in this round. Negative when the player count is
    /// not known yet.
    pub fn turns_left(&self) -> i32 {
        self.total_turns() as i32 - self.turn as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card;

    fn session(player_count: usize) -> GameSession {
        let mut session = GameSession::new(
            String::from("test"),
            0,
            String::new(),
            String::from("Alice"),
        );
        session.on_game_start(player_count);
        session
    }

    fn reveal(entries: &[(&str, &[Card])]) -> BTreeMap<String, Vec<Card>> {
        entries
            .iter()
            .map(|(name, cards)| (String::from(*name), cards.to_vec()))
            .collect()
    }

    #[test]
    fn round_start_resets_everything() {
        let mut session = session(3);
        session.observe_hand(vec![card!("Tempura"), card!("Sashimi")]);
        session.record_play(card!("Tempura"));
        session.record_reveal(reveal(&[
            ("Alice", &[card!("Tempura")]),
            ("Bob", &[card!("Sashimi")]),
        ]));

        session.on_round_start(2);
        assert_eq!(session.round, 2);
        assert_eq!(session.turn, 1);
        assert!(session.tableau.is_empty());
        assert!(session.all_tableaux.is_empty());
        assert_eq!(session.last_card_played, None);
        assert!(session.last_reveals.is_empty());
        assert_eq!(session.rotation.len(), 3);
        assert_eq!(session.rotation.cursor(), 0);
        for slot in 0..3 {
            assert_eq!(session.rotation.slot(slot), None);
        }
    }

    #[test]
    fn unknown_player_count_degrades_to_one_slot() {
        let mut session = session(0);
        session.on_round_start(1);
        assert_eq!(session.rotation.len(), 1);
        // Must not panic when a hand arrives anyway
        session.observe_hand(vec![card!("Pudding")]);
        session.record_play(card!("Pudding"));
        assert_eq!(session.rotation.slot(0), Some(&[][..]));
    }

    #[test]
    fn record_play_drains_only_the_current_slot() {
        let mut session = session(3);
        session.on_round_start(1);
        session.observe_hand(vec![
            card!("Tempura"),
            card!("Sashimi"),
            card!("Salmon Nigiri"),
        ]);
        session.record_play(card!("Sashimi"));

        assert_eq!(session.last_card_played, Some(card!("Sashimi")));
        assert_eq!(session.tableau, vec![card!("Sashimi")]);
        assert_eq!(
            session.rotation.slot(0),
            Some(&[card!("Tempura"), card!("Salmon Nigiri")][..])
        );
        assert_eq!(session.rotation.slot(1), None);
        assert_eq!(session.rotation.slot(2), None);
    }

    #[test]
    fn record_play_of_untracked_card_is_a_no_op_on_the_slot() {
        let mut session = session(3);
        session.on_round_start(1);
        session.observe_hand(vec![card!("Tempura")]);
        session.record_play(card!("Pudding"));
        // Tableau still reflects the play; the slot is untouched
        assert_eq!(session.tableau, vec![card!("Pudding")]);
        assert_eq!(session.rotation.slot(0), Some(&[card!("Tempura")][..]));
    }

    #[test]
    fn reveal_is_additive_and_advances_the_turn() {
        let mut session = session(3);
        session.on_round_start(1);
        session.record_reveal(reveal(&[
            ("Alice", &[card!("Tempura")]),
            ("Bob", &[card!("Sashimi")]),
        ]));

        assert_eq!(
            session.all_tableaux.get("Alice"),
            Some(&vec![card!("Tempura")])
        );
        assert_eq!(
            session.all_tableaux.get("Bob"),
            Some(&vec![card!("Sashimi")])
        );
        assert_eq!(session.turn, 2);
        assert_eq!(session.rotation.cursor(), 1);
    }

    #[test]
    fn two_card_reveal_appends_both_in_order() {
        let mut session = session(2);
        session.on_round_start(1);
        session.record_reveal(reveal(&[(
            "Alice",
            &[card!("Squid Nigiri"), card!("Tempura")],
        )]));
        assert_eq!(
            session.all_tableaux.get("Alice"),
            Some(&vec![card!("Squid Nigiri"), card!("Tempura")])
        );
    }

    #[test]
    fn own_reveal_resynchronizes_own_tableau() {
        let mut session = session(2);
        session.on_round_start(1);
        // Simulate drift: we recorded nothing locally, but the server says
        // Alice (us) played a Dumpling.
        session.record_reveal(reveal(&[("Alice", &[card!("Dumpling")])]));
        assert_eq!(session.tableau, vec![card!("Dumpling")]);
    }

    #[test]
    fn next_hand_is_unknown_until_observed() {
        let mut session = session(3);
        session.on_round_start(1);
        session.observe_hand(vec![card!("Tempura")]);
        assert_eq!(session.next_hand(), None);

        session.record_play(card!("Tempura"));
        session.record_reveal(reveal(&[("Alice", &[card!("Tempura")])]));
        session.observe_hand(vec![card!("Wasabi"), card!("Dumpling")]);
        assert_eq!(session.rotation.slot(1), Some(&[card!("Wasabi"), card!("Dumpling")][..]));
        assert_eq!(session.next_hand(), None);
    }

    #[test]
    fn observe_does_not_overwrite_a_depleted_slot() {
        let mut session = session(3);
        session.on_round_start(1);
        session.observe_hand(vec![card!("Tempura"), card!("Pudding")]);
        session.record_play(card!("Tempura"));
        // A second observation at the same cursor must not restore the
        // played card.
        session.observe_hand(vec![card!("Tempura"), card!("Pudding")]);
        assert_eq!(session.rotation.slot(0), Some(&[card!("Pudding")][..]));
    }

    #[test]
    fn unused_wasabi_tracks_nigiri_pairing() {
        let mut session = session(2);
        session.on_round_start(1);
        assert!(!session.has_unused_wasabi());
        session.tableau.push(card!("Wasabi"));
        assert!(session.has_unused_wasabi());
        session.tableau.push(card!("Egg Nigiri"));
        assert!(!session.has_unused_wasabi());
        session.tableau.push(card!("Wasabi"));
        session.tableau.push(card!("Wasabi"));
        session.tableau.push(card!("Squid Nigiri"));
        assert!(session.has_unused_wasabi());
    }

    #[test]
    fn total_turns_table() {
        for (count, total) in [(2, 10), (3, 9), (4, 8), (5, 7), (0, 0), (7, 0)] {
            let mut session = session(count);
            session.on_round_start(1);
            assert_eq!(session.total_turns(), total);
        }
    }
}
