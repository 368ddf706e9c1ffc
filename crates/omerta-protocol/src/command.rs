//! Client-to-server commands.
//!
//! Every inbound frame is one JSON object tagged by `type`, with
//! camelCase fields. Unknown tags or malformed fields fail decoding;
//! the connection handler answers those with an error notice rather
//! than dropping the socket.

use serde::{Deserialize, Serialize};

use omerta_engine::{CardId, EventReactionChoice, PlayerId, ReactionChoice};

/// A command sent by a client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientCommand {
    /// Create a new room and take its first seat as host.
    Create { name: String },

    /// Join an existing room by code. The code is matched
    /// case-insensitively.
    #[serde(rename_all = "camelCase")]
    Join { room: String, name: String },

    /// Toggle the lobby ready flag.
    #[serde(rename_all = "camelCase")]
    SetReady { ready: bool },

    /// Start the match (host only).
    Start,

    /// Play a card from hand, optionally at a target.
    #[serde(rename_all = "camelCase")]
    Play {
        card_id: CardId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        target_id: Option<PlayerId>,
    },

    /// Answer a Shot duel.
    Reaction { choice: ReactionChoice },

    /// Answer a timed window (mass reaction or vendetta step).
    EventReaction { choice: EventReactionChoice },

    /// End the current turn.
    EndTurn,

    /// Ask for a fresh snapshot (reconnect support).
    GetState,
}

// =====================================================================
// Tests
// =====================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(json: &str) -> ClientCommand {
        serde_json::from_str(json).expect("valid command")
    }

    #[test]
    fn test_decodes_every_command_shape() {
        assert_eq!(
            decode(r#"{"type":"create","name":"vito"}"#),
            ClientCommand::Create { name: "vito".into() }
        );
        assert_eq!(
            decode(r#"{"type":"join","room":"AB3D","name":"mike"}"#),
            ClientCommand::Join { room: "AB3D".into(), name: "mike".into() }
        );
        assert_eq!(
            decode(r#"{"type":"setReady","ready":true}"#),
            ClientCommand::SetReady { ready: true }
        );
        assert_eq!(decode(r#"{"type":"start"}"#), ClientCommand::Start);
        assert_eq!(decode(r#"{"type":"endTurn"}"#), ClientCommand::EndTurn);
        assert_eq!(decode(r#"{"type":"getState"}"#), ClientCommand::GetState);
    }

    #[test]
    fn test_play_target_is_optional() {
        assert_eq!(
            decode(r#"{"type":"play","cardId":12}"#),
            ClientCommand::Play { card_id: CardId(12), target_id: None }
        );
        assert_eq!(
            decode(r#"{"type":"play","cardId":3,"targetId":7}"#),
            ClientCommand::Play {
                card_id: CardId(3),
                target_id: Some(PlayerId(7)),
            }
        );
    }

    #[test]
    fn test_reaction_choices_use_screaming_tags() {
        assert_eq!(
            decode(r#"{"type":"reaction","choice":"TAKE_HIT"}"#),
            ClientCommand::Reaction { choice: ReactionChoice::TakeHit }
        );
        assert_eq!(
            decode(r#"{"type":"eventReaction","choice":"DISCARD"}"#),
            ClientCommand::EventReaction { choice: EventReactionChoice::Discard }
        );
    }

    #[test]
    fn test_unknown_tag_fails_decoding() {
        assert!(serde_json::from_str::<ClientCommand>(r#"{"type":"hack"}"#).is_err());
    }
}
