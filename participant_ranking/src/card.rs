use std::fmt::Write;

use crate::config::*;

// ********* Class markers ***********
// These are relied upon by the stylesheet and by the end-to-end checks.

pub const CARD_CLASS: &str = "participant-card";
pub const POSITION_CLASS: &str = "participant-position";
pub const CONTENT_CLASS: &str = "participant-content";
pub const IMAGE_CLASS: &str = "participant-image";
pub const TEXT_CLASS: &str = "participant-text";
pub const VOTES_CLASS: &str = "participant-votes";
pub const POSITIVE_CLASS: &str = "vote-positive";
pub const NEGATIVE_CLASS: &str = "vote-negative";

/// The picture of a card. It is always written with lazy loading.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct CardImage {
    pub src: String,
    pub alt: String,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct VoteIndicator {
    pub label: String,
    pub percentage: u8,
}

impl VoteIndicator {
    pub fn text(&self) -> String {
        format!("{}: {}%", self.label, self.percentage)
    }
}

/// The displayable unit for one participant.
///
/// All the strings are stored as given, without any markup escaping. The
/// escaping happens in [ParticipantCard::to_html].
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ParticipantCard {
    pub position: u32,
    pub image: CardImage,
    pub heading: String,
    pub paragraph: String,
    pub positive: VoteIndicator,
    pub negative: VoteIndicator,
}

/// Builds the card of a ranked participant with the English labels.
pub fn build_card(participant: &RankedParticipant) -> ParticipantCard {
    build_card_with(participant, &CardLabels::default())
}

/// Builds the card of a ranked participant.
///
/// Never fails: empty names or descriptions give empty text nodes.
pub fn build_card_with(participant: &RankedParticipant, labels: &CardLabels) -> ParticipantCard {
    let p = &participant.participant;
    let share = participant.share();
    ParticipantCard {
        position: participant.position,
        image: CardImage {
            src: p.picture.clone(),
            alt: format!("{} {}", labels.photo_prefix, p.name),
        },
        heading: p.name.clone(),
        paragraph: p.description.clone(),
        positive: VoteIndicator {
            label: labels.positive.clone(),
            percentage: share.positive,
        },
        negative: VoteIndicator {
            label: labels.negative.clone(),
            percentage: share.negative,
        },
    }
}

impl ParticipantCard {
    /// Writes the card as an `<article>` element.
    ///
    /// ```html
    /// <article class="participant-card" data-position="1">
    ///   <span class="participant-position">1</span>
    ///   <div class="participant-content">
    ///     <img class="participant-image" src="..." alt="Photo of ..." loading="lazy">
    ///     <div class="participant-text">
    ///       <h2>...</h2>
    ///       <p>...</p>
    ///       <div class="participant-votes">
    ///         <span class="vote-positive">Positive: 67%</span>
    ///         <span class="vote-negative">Negative: 33%</span>
    ///       </div>
    ///     </div>
    ///   </div>
    /// </article>
    /// ```
    pub fn to_html(&self) -> String {
        let mut out = String::with_capacity(512);
        // Writing into a String cannot fail.
        let _ = self.write_html(&mut out);
        out
    }

    fn write_html(&self, w: &mut String) -> std::fmt::Result {
        writeln!(
            w,
            "<article class=\"{}\" data-position=\"{}\">",
            CARD_CLASS, self.position
        )?;
        writeln!(
            w,
            "  <span class=\"{}\">{}</span>",
            POSITION_CLASS, self.position
        )?;
        writeln!(w, "  <div class=\"{}\">", CONTENT_CLASS)?;
        writeln!(
            w,
            "    <img class=\"{}\" src=\"{}\" alt=\"{}\" loading=\"lazy\">",
            IMAGE_CLASS,
            escape_html(&self.image.src),
            escape_html(&self.image.alt)
        )?;
        writeln!(w, "    <div class=\"{}\">", TEXT_CLASS)?;
        writeln!(w, "      <h2>{}</h2>", escape_html(&self.heading))?;
        writeln!(w, "      <p>{}</p>", escape_html(&self.paragraph))?;
        writeln!(w, "      <div class=\"{}\">", VOTES_CLASS)?;
        writeln!(
            w,
            "        <span class=\"{}\">{}</span>",
            POSITIVE_CLASS,
            escape_html(&self.positive.text())
        )?;
        writeln!(
            w,
            "        <span class=\"{}\">{}</span>",
            NEGATIVE_CLASS,
            escape_html(&self.negative.text())
        )?;
        w.push_str("      </div>\n    </div>\n  </div>\n</article>\n");
        Ok(())
    }
}

/// Escapes text for use in HTML element content and quoted attribute values.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}
