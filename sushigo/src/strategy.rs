use tracing::debug;

use crate::{Card, ClientCommand, GameSession, MAKI_ROLLS, NIGIRI};

/// A single named rule of the priority ladder. Returns the index of the
/// card to play if the rule applies to this hand and state.
type Rule = fn(&[Card], &GameSession) -> Option<usize>;

/// The single-play priority ladder, evaluated top to bottom; the first rule
/// that matches decides the turn.
static SINGLE_PLAY_RULES: [(&str, Rule); 8] = [
    ("combo-completion", combo_completion),
    ("grab-chopsticks", grab_chopsticks),
    ("pudding-race", pudding_race),
    ("bank-wasabi", bank_wasabi),
    ("dumpling-chain", dumpling_chain),
    ("best-nigiri", best_nigiri),
    ("start-a-set", start_a_set),
    ("best-maki", best_maki),
];

/// Selects one card to play this turn. Falls back to index 0 when no rule
/// matches.
pub fn choose_single_play(hand: &[Card], state: &GameSession) -> usize {
    for (name, rule) in &SINGLE_PLAY_RULES {
        if let Some(index) = rule(hand, state) {
            debug!(rule = name, card = %hand[index], "Chose single-card play");
            return index;
        }
    }
    debug!("No rule matched, playing first card");
    0
}

fn index_of(hand: &[Card], card: Card) -> Option<usize> {
    hand.iter().position(|&c| c == card)
}

fn count_in(hand: &[Card], card: Card) -> usize {
    hand.iter().filter(|&&c| c == card).count()
}

/// A card that immediately scores value on the current tableau, by point
/// value: Sashimi triple (10) > Squid on Wasabi (9) > Salmon on Wasabi (6)
/// > Tempura pair (5) > Egg on Wasabi (3).
fn combo_completion(hand: &[Card], state: &GameSession) -> Option<usize> {
    let wasabi_waiting = state.has_unused_wasabi();
    if state.count(Card::Sashimi) % 3 == 2 {
        if let Some(index) = index_of(hand, Card::Sashimi) {
            return Some(index);
        }
    }
    if wasabi_waiting {
        if let Some(index) = index_of(hand, Card::SquidNigiri) {
            return Some(index);
        }
        if let Some(index) = index_of(hand, Card::SalmonNigiri) {
            return Some(index);
        }
    }
    if state.count(Card::Tempura) % 2 == 1 {
        if let Some(index) = index_of(hand, Card::Tempura) {
            return Some(index);
        }
    }
    if wasabi_waiting {
        if let Some(index) = index_of(hand, Card::EggNigiri) {
            return Some(index);
        }
    }
    None
}

/// Pick up Chopsticks when the hand coming to us next turn has a two-card
/// combo we could cash in with them.
fn grab_chopsticks(hand: &[Card], state: &GameSession) -> Option<usize> {
    let index = index_of(hand, Card::Chopsticks)?;
    if state.has_chopsticks() {
        return None;
    }
    chopsticks_worth_grabbing(state).then_some(index)
}

/// Take a Pudding when we are behind on puddings but can still catch up
/// this round, or when we are at (or below) the table minimum.
fn pudding_race(hand: &[Card], state: &GameSession) -> Option<usize> {
    let index = index_of(hand, Card::Pudding)?;
    let pudding_counts: Vec<usize> = state
        .all_tableaux
        .values()
        .map(|tableau| tableau.iter().filter(|&&c| c == Card::Pudding).count())
        .collect();
    let (Some(&max), Some(&min)) = (pudding_counts.iter().max(), pudding_counts.iter().min())
    else {
        return None;
    };
    let mine = state.puddings();
    let turns_left = state.turns_left();
    let can_catch_up = mine < max && mine as i32 + turns_left > max as i32;
    let at_the_bottom = mine <= min;
    (can_catch_up || at_the_bottom).then_some(index)
}

/// Bank a Wasabi ahead of a nigiri-heavy hand.
fn bank_wasabi(hand: &[Card], _state: &GameSession) -> Option<usize> {
    let index = index_of(hand, Card::Wasabi)?;
    let nigiri_in_hand = hand.iter().filter(|c| c.is_nigiri()).count();
    (nigiri_in_hand >= 2).then_some(index)
}

/// Dumplings keep positive marginal value up to the fifth.
fn dumpling_chain(hand: &[Card], state: &GameSession) -> Option<usize> {
    let index = index_of(hand, Card::Dumpling)?;
    (state.count(Card::Dumpling) < 5).then_some(index)
}

fn best_nigiri(hand: &[Card], _state: &GameSession) -> Option<usize> {
    NIGIRI.iter().find_map(|&nigiri| index_of(hand, nigiri))
}

/// Push toward a future Sashimi triple or Tempura pair, preferring a set
/// that is already started.
fn start_a_set(hand: &[Card], state: &GameSession) -> Option<usize> {
    if state.count(Card::Sashimi) == 1 {
        if let Some(index) = index_of(hand, Card::Sashimi) {
            return Some(index);
        }
    }
    if state.count(Card::Tempura) == 1 {
        if let Some(index) = index_of(hand, Card::Tempura) {
            return Some(index);
        }
    }
    index_of(hand, Card::Sashimi)
}

fn best_maki(hand: &[Card], _state: &GameSession) -> Option<usize> {
    MAKI_ROLLS.iter().find_map(|&maki| index_of(hand, maki))
}

/// The best two-card play for this turn, or `None` to fall back to a single
/// play. Only meaningful when Chopsticks are already on our tableau.
///
/// Whenever Wasabi is one of the pair it is returned first: play order
/// decides what is on the tableau when the nigiri lands, so the Wasabi must
/// be down before the Nigiri for the multiplier to apply.
pub fn choose_chopstick_play(hand: &[Card], state: &GameSession) -> Option<(usize, usize)> {
    if !state.has_chopsticks() {
        return None;
    }
    if state.count(Card::Sashimi) % 3 == 1 {
        if let Some(pair) = pair_of(hand, Card::Sashimi) {
            return Some(pair);
        }
    }
    if let Some(pair) = wasabi_then(hand, Card::SquidNigiri) {
        return Some(pair);
    }
    if let Some(pair) = wasabi_then(hand, Card::SalmonNigiri) {
        return Some(pair);
    }
    if state.count(Card::Tempura) % 2 == 1 {
        if let Some(pair) = pair_of(hand, Card::Tempura) {
            return Some(pair);
        }
    }
    wasabi_then(hand, Card::EggNigiri)
}

fn pair_of(hand: &[Card], card: Card) -> Option<(usize, usize)> {
    let mut first = None;
    for (index, &c) in hand.iter().enumerate() {
        if c == card {
            match first {
                None => first = Some(index),
                Some(first) => return Some((first, index)),
            }
        }
    }
    None
}

fn wasabi_then(hand: &[Card], nigiri: Card) -> Option<(usize, usize)> {
    let wasabi = index_of(hand, Card::Wasabi)?;
    let nigiri = index_of(hand, nigiri)?;
    Some((wasabi, nigiri))
}

/// True iff the next known hand makes Chopsticks worth holding: Wasabi
/// together with any Nigiri, or two Sashimi, or two Tempura. False while
/// the next hand has not been revealed to us yet.
pub fn chopsticks_worth_grabbing(state: &GameSession) -> bool {
    let Some(next) = state.next_hand() else {
        return false;
    };
    let wasabi_nigiri =
        next.contains(&Card::Wasabi) && next.iter().any(|c| c.is_nigiri());
    wasabi_nigiri || count_in(next, Card::Sashimi) >= 2 || count_in(next, Card::Tempura) >= 2
}

/// Decides the move for the hand currently held, records it in the session,
/// and returns the command to send. `None` when the hand is empty.
///
/// Chopsticks are tried first when available; a two-card play records both
/// cards and returns the Chopsticks card from the tableau to the hand that
/// passes on.
pub fn decide_turn(state: &mut GameSession) -> Option<ClientCommand> {
    if state.hand.is_empty() {
        return None;
    }
    let hand = state.hand.clone();

    if state.has_chopsticks() {
        if let Some((first, second)) = choose_chopstick_play(&hand, state) {
            debug!(first = %hand[first], second = %hand[second], "Chose chopstick play");
            state.record_play(hand[first]);
            state.record_play(hand[second]);
            if let Some(position) = state.tableau.iter().position(|&c| c == Card::Chopsticks) {
                state.tableau.remove(position);
                state.rotation.return_to_current(Card::Chopsticks);
            }
            return Some(ClientCommand::Chopsticks { first, second });
        }
    }

    let index = choose_single_play(&hand, state);
    state.record_play(hand[index]);
    Some(ClientCommand::Play { index })
}
