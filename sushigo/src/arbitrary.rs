use quickcheck::{Arbitrary, Gen};

use crate::Card;

static DECK: [Card; 12] = [
    Card::Tempura,
    Card::Sashimi,
    Card::Dumpling,
    Card::MakiRoll1,
    Card::MakiRoll2,
    Card::MakiRoll3,
    Card::EggNigiri,
    Card::SalmonNigiri,
    Card::SquidNigiri,
    Card::Wasabi,
    Card::Pudding,
    Card::Chopsticks,
];

impl Arbitrary for Card {
    fn arbitrary(g: &mut Gen) -> Self {
        *g.choose(&DECK).unwrap()
    }
}
