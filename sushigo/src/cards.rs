use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// One card from the fixed Sushi Go deck.
///
/// The serialized form is the exact case-sensitive name used on the wire,
/// including embedded spaces (e.g. `Salmon Nigiri`, `Maki Roll (2)`).
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Card {
    #[serde(rename = "Tempura")]
    Tempura,
    #[serde(rename = "Sashimi")]
    Sashimi,
    #[serde(rename = "Dumpling")]
    Dumpling,
    #[serde(rename = "Maki Roll (1)")]
    MakiRoll1,
    #[serde(rename = "Maki Roll (2)")]
    MakiRoll2,
    #[serde(rename = "Maki Roll (3)")]
    MakiRoll3,
    #[serde(rename = "Egg Nigiri")]
    EggNigiri,
    #[serde(rename = "Salmon Nigiri")]
    SalmonNigiri,
    #[serde(rename = "Squid Nigiri")]
    SquidNigiri,
    #[serde(rename = "Wasabi")]
    Wasabi,
    #[serde(rename = "Pudding")]
    Pudding,
    #[serde(rename = "Chopsticks")]
    Chopsticks,
}

/// The three nigiri variants, best first. Useful for priority scans.
pub static NIGIRI: [Card; 3] = [Card::SquidNigiri, Card::SalmonNigiri, Card::EggNigiri];

/// The three maki roll variants, most symbols first.
pub static MAKI_ROLLS: [Card; 3] = [Card::MakiRoll3, Card::MakiRoll2, Card::MakiRoll1];

impl Card {
    /// The name of this card on the wire.
    pub fn wire_name(&self) -> &'static str {
        match self {
            Card::Tempura => "Tempura",
            Card::Sashimi => "Sashimi",
            Card::Dumpling => "Dumpling",
            Card::MakiRoll1 => "Maki Roll (1)",
            Card::MakiRoll2 => "Maki Roll (2)",
            Card::MakiRoll3 => "Maki Roll (3)",
            Card::EggNigiri => "Egg Nigiri",
            Card::SalmonNigiri => "Salmon Nigiri",
            Card::SquidNigiri => "Squid Nigiri",
            Card::Wasabi => "Wasabi",
            Card::Pudding => "Pudding",
            Card::Chopsticks => "Chopsticks",
        }
    }

    pub fn is_nigiri(&self) -> bool {
        matches!(
            self,
            Card::EggNigiri | Card::SalmonNigiri | Card::SquidNigiri
        )
    }

    /// Number of maki symbols on the card (0 for non-maki cards).
    pub fn maki_symbols(&self) -> u8 {
        match self {
            Card::MakiRoll1 => 1,
            Card::MakiRoll2 => 2,
            Card::MakiRoll3 => 3,
            _ => 0,
        }
    }
}

impl std::fmt::Display for Card {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.wire_name())
    }
}

/// The error type for the [`FromStr`] instance of [`Card`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnknownCard(pub String);

impl std::error::Error for UnknownCard {}

impl std::fmt::Display for UnknownCard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Not a card in the Sushi Go deck: '{}'", self.0)
    }
}

impl FromStr for Card {
    type Err = UnknownCard;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "Tempura" => Card::Tempura,
            "Sashimi" => Card::Sashimi,
            "Dumpling" => Card::Dumpling,
            "Maki Roll (1)" => Card::MakiRoll1,
            "Maki Roll (2)" => Card::MakiRoll2,
            "Maki Roll (3)" => Card::MakiRoll3,
            "Egg Nigiri" => Card::EggNigiri,
            "Salmon Nigiri" => Card::SalmonNigiri,
            "Squid Nigiri" => Card::SquidNigiri,
            "Wasabi" => Card::Wasabi,
            "Pudding" => Card::Pudding,
            "Chopsticks" => Card::Chopsticks,
            _ => return Err(UnknownCard(String::from(s))),
        })
    }
}

/// Shorthand for creating a card from its wire name.
///
/// This macro is just calling the [`FromStr`] instance of [`Card`].
/// ```
/// # use sushigo::{card, Card};
/// assert_eq!(card!("Salmon Nigiri"), Card::SalmonNigiri);
/// ```
#[macro_export]
macro_rules! card {
    ($name:literal) => {
        <$crate::Card as std::str::FromStr>::from_str($name)
            .expect("Invalid card name given to card! macro")
    };
}
// The import is for using the macro in other modules, see https://stackoverflow.com/a/31749071/1726797
#[allow(unused_imports)]
pub(crate) use card;
