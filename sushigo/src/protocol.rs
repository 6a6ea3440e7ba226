use std::collections::BTreeMap;
use std::str::FromStr;

use crate::Card;

/// A message from the server, decoded from one wire line.
///
/// Decoding is total: a malformed or unrecognized line becomes
/// [`ServerEvent::Unhandled`], never an error. The orchestrator ignores
/// those and keeps reading.
#[derive(Clone, Debug, PartialEq)]
pub enum ServerEvent {
    /// `WELCOME <gameId> <playerId> [<rejoinToken>]`
    Welcome {
        game_id: String,
        player_id: u32,
        rejoin_token: String,
    },
    /// `ERROR <text>`
    Error { message: String },
    /// `OK`
    Ok,
    /// `WAITING`
    Waiting,
    /// `GAME_START <playerCount>`
    GameStart { player_count: usize },
    /// `ROUND_START <roundNumber>`
    RoundStart { round: u8 },
    /// `HAND <idx0>:<card> <idx1>:<card> ...` — card names may contain spaces.
    Hand { cards: Vec<Card> },
    /// `PLAYED <name>:<card>[,<card>]; <name>:<card>; ...` — two cards for a
    /// chopstick play.
    Played { reveals: BTreeMap<String, Vec<Card>> },
    /// `ROUND_END <roundNumber> <scoresJson>`
    RoundEnd {
        round: u8,
        scores: BTreeMap<String, i64>,
    },
    /// `GAME_END <scoresJson> <winnersJson>`
    GameEnd {
        scores: BTreeMap<String, i64>,
        winners: Vec<String>,
    },
    /// `TOURNAMENT_WELCOME <tid> <count>/<max> [<rejoinToken>]`
    TournamentWelcome {
        tournament_id: String,
        joined: u32,
        capacity: u32,
        rejoin_token: String,
    },
    /// `TOURNAMENT_JOINED <text>` — another player entered the tournament.
    TournamentJoined { text: String },
    /// `TOURNAMENT_MATCH <tid> <matchToken|BYE> <round> [<opponent>]`
    TournamentMatch {
        tournament_id: String,
        match_token: String,
        round: u32,
        opponent: Option<String>,
    },
    /// `TOURNAMENT_COMPLETE <tid> <winnerName>`
    TournamentComplete {
        tournament_id: String,
        winner: Option<String>,
    },
    /// Anything the codec does not recognize.
    Unhandled { line: String },
}

impl ServerEvent {
    pub fn parse(line: &str) -> ServerEvent {
        let line = line.trim();
        let (keyword, rest) = match line.split_once(' ') {
            Some((keyword, rest)) => (keyword, rest.trim()),
            None => (line, ""),
        };
        parse_fields(keyword, rest).unwrap_or_else(|| ServerEvent::Unhandled {
            line: String::from(line),
        })
    }
}

/// `None` means the line could not be decoded as its keyword suggests.
fn parse_fields(keyword: &str, rest: &str) -> Option<ServerEvent> {
    Some(match keyword {
        "WELCOME" => {
            let mut tokens = rest.split_whitespace();
            ServerEvent::Welcome {
                game_id: String::from(tokens.next()?),
                player_id: tokens.next()?.parse().ok()?,
                // The rejoin token is a trailing optional field
                rejoin_token: String::from(tokens.next().unwrap_or("")),
            }
        }
        "ERROR" => ServerEvent::Error {
            message: String::from(rest),
        },
        "OK" => ServerEvent::Ok,
        "WAITING" => ServerEvent::Waiting,
        "GAME_START" => ServerEvent::GameStart {
            player_count: rest.split_whitespace().next()?.parse().ok()?,
        },
        "ROUND_START" => ServerEvent::RoundStart {
            round: rest.split_whitespace().next()?.parse().ok()?,
        },
        "HAND" => ServerEvent::Hand {
            cards: parse_hand_cards(rest)?,
        },
        "PLAYED" => ServerEvent::Played {
            reveals: parse_reveals(rest)?,
        },
        "ROUND_END" => {
            let (round, scores_json) = rest.split_once(' ')?;
            ServerEvent::RoundEnd {
                round: round.parse().ok()?,
                scores: serde_json::from_str(scores_json.trim()).ok()?,
            }
        }
        "GAME_END" => {
            // The server emits both payloads without embedded whitespace.
            let (scores, winners) = match rest.split_once(' ') {
                Some((scores_json, winners_json)) => (
                    serde_json::from_str(scores_json).ok()?,
                    serde_json::from_str(winners_json.trim()).ok()?,
                ),
                None => (serde_json::from_str(rest).ok()?, Vec::new()),
            };
            ServerEvent::GameEnd { scores, winners }
        }
        "TOURNAMENT_WELCOME" => {
            let mut tokens = rest.split_whitespace();
            let tournament_id = String::from(tokens.next()?);
            let (joined, capacity) = tokens.next()?.split_once('/')?;
            ServerEvent::TournamentWelcome {
                tournament_id,
                joined: joined.parse().ok()?,
                capacity: capacity.parse().ok()?,
                rejoin_token: String::from(tokens.next().unwrap_or("")),
            }
        }
        "TOURNAMENT_JOINED" => ServerEvent::TournamentJoined {
            text: String::from(rest),
        },
        "TOURNAMENT_MATCH" => {
            let mut tokens = rest.split_whitespace();
            ServerEvent::TournamentMatch {
                tournament_id: String::from(tokens.next()?),
                match_token: String::from(tokens.next()?),
                round: tokens.next()?.parse().ok()?,
                opponent: tokens.next().map(String::from),
            }
        }
        "TOURNAMENT_COMPLETE" => {
            let mut tokens = rest.split_whitespace();
            ServerEvent::TournamentComplete {
                tournament_id: String::from(tokens.next()?),
                winner: tokens.next().map(String::from),
            }
        }
        _ => return None,
    })
}

/// Parses a hand listing like `0:Tempura 1:Salmon Nigiri 2:Maki Roll (3)`.
///
/// Card names contain spaces, so everything between one `digit:` marker and
/// the next belongs to a single card.
fn parse_hand_cards(payload: &str) -> Option<Vec<Card>> {
    let mut names: Vec<String> = Vec::new();
    for token in payload.split_whitespace() {
        if let Some((index, name)) = token.split_once(':') {
            if !index.is_empty() && index.bytes().all(|b| b.is_ascii_digit()) {
                names.push(String::from(name));
                continue;
            }
        }
        // Continuation of the current card's name
        let current = names.last_mut()?;
        current.push(' ');
        current.push_str(token);
    }
    names
        .iter()
        .map(|name| Card::from_str(name).ok())
        .collect()
}

/// Parses a reveal listing like `Alice:Squid Nigiri,Tempura; Bob:Sashimi`.
fn parse_reveals(payload: &str) -> Option<BTreeMap<String, Vec<Card>>> {
    let mut reveals = BTreeMap::new();
    for entry in payload.split(';') {
        let Some((name, cards)) = entry.split_once(':') else {
            continue;
        };
        let cards = cards
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(|name| Card::from_str(name).ok())
            .collect::<Option<Vec<Card>>>()?;
        reveals.insert(String::from(name.trim()), cards);
    }
    Some(reveals)
}

/// A command to the server. [`std::fmt::Display`] renders the wire line
/// (without the trailing newline).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ClientCommand {
    Join { game_id: String, name: String },
    Tourney { tournament_id: String, name: String },
    TournamentJoin { match_token: String },
    Ready,
    Play { index: usize },
    Chopsticks { first: usize, second: usize },
    Leave,
}

impl std::fmt::Display for ClientCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClientCommand::Join { game_id, name } => write!(f, "JOIN {} {}", game_id, name),
            ClientCommand::Tourney {
                tournament_id,
                name,
            } => write!(f, "TOURNEY {} {}", tournament_id, name),
            ClientCommand::TournamentJoin { match_token } => write!(f, "TJOIN {}", match_token),
            ClientCommand::Ready => write!(f, "READY"),
            ClientCommand::Play { index } => write!(f, "PLAY {}", index),
            ClientCommand::Chopsticks { first, second } => {
                write!(f, "CHOPSTICKS {} {}", first, second)
            }
            ClientCommand::Leave => write!(f, "LEAVE"),
        }
    }
}

#[cfg(test)]
mod tests {
    use quickcheck::quickcheck;

    use super::*;
    use crate::card;

    #[test]
    fn hand_with_spaces_in_names() {
        let event = ServerEvent::parse("HAND 0:Tempura 1:Salmon Nigiri 2:Maki Roll (3) 3:Pudding");
        assert_eq!(
            event,
            ServerEvent::Hand {
                cards: vec![
                    card!("Tempura"),
                    card!("Salmon Nigiri"),
                    card!("Maki Roll (3)"),
                    card!("Pudding"),
                ],
            }
        );
    }

    #[test]
    fn hand_with_unknown_card_is_unhandled() {
        let event = ServerEvent::parse("HAND 0:Tempura 1:Fugu Sushi");
        assert_eq!(
            event,
            ServerEvent::Unhandled {
                line: String::from("HAND 0:Tempura 1:Fugu Sushi"),
            }
        );
    }

    quickcheck! {
        fn hand_listing_decodes_any_deal(cards: Vec<Card>) -> bool {
            let listing: Vec<String> = cards
                .iter()
                .enumerate()
                .map(|(idx, card)| format!("{}:{}", idx, card))
                .collect();
            let line = format!("HAND {}", listing.join(" "));
            ServerEvent::parse(&line) == ServerEvent::Hand { cards }
        }
    }

    #[test]
    fn reveal_with_chopstick_play() {
        let event = ServerEvent::parse("PLAYED Alice:Squid Nigiri,Tempura; Bob:Sashimi");
        let ServerEvent::Played { reveals } = event else {
            panic!("expected Played, got {:?}", event);
        };
        assert_eq!(
            reveals.get("Alice"),
            Some(&vec![card!("Squid Nigiri"), card!("Tempura")])
        );
        assert_eq!(reveals.get("Bob"), Some(&vec![card!("Sashimi")]));
    }

    #[test]
    fn welcome_with_and_without_rejoin_token() {
        assert_eq!(
            ServerEvent::parse("WELCOME abc123 2 tok-xyz"),
            ServerEvent::Welcome {
                game_id: String::from("abc123"),
                player_id: 2,
                rejoin_token: String::from("tok-xyz"),
            }
        );
        assert_eq!(
            ServerEvent::parse("WELCOME abc123 2"),
            ServerEvent::Welcome {
                game_id: String::from("abc123"),
                player_id: 2,
                rejoin_token: String::new(),
            }
        );
    }

    #[test]
    fn round_end_scores() {
        let event = ServerEvent::parse(r#"ROUND_END 2 {"Alice":24,"Bob":17}"#);
        let ServerEvent::RoundEnd { round, scores } = event else {
            panic!("expected RoundEnd, got {:?}", event);
        };
        assert_eq!(round, 2);
        assert_eq!(scores.get("Alice"), Some(&24));
        assert_eq!(scores.get("Bob"), Some(&17));
    }

    #[test]
    fn game_end_scores_and_winners() {
        let event = ServerEvent::parse(r#"GAME_END {"Alice":61,"Bob":61} ["Alice","Bob"]"#);
        assert_eq!(
            event,
            ServerEvent::GameEnd {
                scores: BTreeMap::from([
                    (String::from("Alice"), 61),
                    (String::from("Bob"), 61)
                ]),
                winners: vec![String::from("Alice"), String::from("Bob")],
            }
        );
    }

    #[test]
    fn tournament_welcome_occupancy() {
        assert_eq!(
            ServerEvent::parse("TOURNAMENT_WELCOME spicy-salmon 3/8 tok-abc"),
            ServerEvent::TournamentWelcome {
                tournament_id: String::from("spicy-salmon"),
                joined: 3,
                capacity: 8,
                rejoin_token: String::from("tok-abc"),
            }
        );
    }

    #[test]
    fn tournament_match_with_bye() {
        assert_eq!(
            ServerEvent::parse("TOURNAMENT_MATCH spicy-salmon BYE 2"),
            ServerEvent::TournamentMatch {
                tournament_id: String::from("spicy-salmon"),
                match_token: String::from("BYE"),
                round: 2,
                opponent: None,
            }
        );
    }

    #[test]
    fn unrecognized_lines_are_unhandled() {
        for line in ["", "JOINED somebody", "GAME_START nonsense", "WELCOME x"] {
            assert_eq!(
                ServerEvent::parse(line),
                ServerEvent::Unhandled {
                    line: String::from(line),
                },
                "line: {:?}",
                line
            );
        }
    }

    #[test]
    fn command_rendering() {
        let cases = [
            (
                ClientCommand::Join {
                    game_id: String::from("abc123"),
                    name: String::from("Bot01"),
                },
                "JOIN abc123 Bot01",
            ),
            (
                ClientCommand::Tourney {
                    tournament_id: String::from("spicy-salmon"),
                    name: String::from("Bot01"),
                },
                "TOURNEY spicy-salmon Bot01",
            ),
            (
                ClientCommand::TournamentJoin {
                    match_token: String::from("tok-match"),
                },
                "TJOIN tok-match",
            ),
            (ClientCommand::Ready, "READY"),
            (ClientCommand::Play { index: 3 }, "PLAY 3"),
            (
                ClientCommand::Chopsticks { first: 1, second: 4 },
                "CHOPSTICKS 1 4",
            ),
            (ClientCommand::Leave, "LEAVE"),
        ];
        for (command, expected) in cases {
            assert_eq!(command.to_string(), expected);
        }
    }
}
