/*!
Ranking of reality-show participants by vote count, and rendering of one
card per participant.

The crate is made of three pure steps, usually chained in this order:

1. [rank] (or [rank_by_field]) normalizes the vote counts of the feed
   records and orders them, most votes first;
2. [assign_positions] gives every participant its place, starting at 1;
3. [build_card] turns a ranked participant into a [ParticipantCard], which
   can be written out with [ParticipantCard::to_html].

```
use participant_ranking::*;
use serde_json::json;

let feed: Feed = serde_json::from_value(json!({"data": [
    {"name": "Ana", "picture": "ana.jpg", "positive": 100, "negative": 50},
    {"name": "Bruno", "picture": "bruno.jpg", "positive": "200", "negative": 30},
]}))?;

let ranked = assign_positions(rank(&feed.data, SortCriterion::Positive));
let cards = build_cards(&ranked, &CardLabels::english());

assert_eq!(cards[0].heading, "Bruno");
assert_eq!(cards[1].positive.percentage, 67);
# Ok::<(), serde_json::Error>(())
```

See the [manual] for the feed format and the normalization rules.
*/
mod card;
mod config;
pub mod manual;

use log::{debug, info, warn};

pub use crate::card::*;
pub use crate::config::*;

/// Ranks the participants, most votes for `criterion` first.
///
/// The vote counts of every record are normalized (see [VoteCount::coerce]).
/// Participants with the same number of votes keep their relative order
/// from the input. The input is not modified.
pub fn rank(list: &[ParticipantRecord], criterion: SortCriterion) -> Vec<Participant> {
    info!(
        "rank: Processing {:?} participants by {} votes",
        list.len(),
        criterion
    );
    rank_with_key(list, |p| p.votes(criterion))
}

/// Ranks the participants using the name of the vote field.
///
/// Unlike [rank], any field name is accepted. A name other than `positive`
/// or `negative` gives every participant the same key of zero: the output
/// then keeps the input order.
pub fn rank_by_field(list: &[ParticipantRecord], field: &str) -> Vec<Participant> {
    match field.parse::<SortCriterion>() {
        Ok(criterion) => rank(list, criterion),
        Err(e) => {
            warn!("rank_by_field: {}, keeping the feed order", e);
            rank_with_key(list, |_| VoteCount::EMPTY)
        }
    }
}

fn rank_with_key<F>(list: &[ParticipantRecord], key: F) -> Vec<Participant>
where
    F: Fn(&Participant) -> VoteCount,
{
    let mut res: Vec<Participant> = list.iter().map(Participant::from_record).collect();
    // Stable: ties stay in feed order.
    res.sort_by(|a, b| key(b).cmp(&key(a)));
    for p in res.iter() {
        debug!("rank: {} +{} -{}", p.name, p.positive, p.negative);
    }
    res
}

/// Assigns the positions 1, 2, 3... in the order of the list.
pub fn assign_positions(ranked: Vec<Participant>) -> Vec<RankedParticipant> {
    ranked
        .into_iter()
        .enumerate()
        .map(|(idx, participant)| RankedParticipant {
            participant,
            position: idx as u32 + 1,
        })
        .collect()
}

/// Builds the cards of all the ranked participants, in order.
pub fn build_cards(ranked: &[RankedParticipant], labels: &CardLabels) -> Vec<ParticipantCard> {
    ranked.iter().map(|rp| build_card_with(rp, labels)).collect()
}
