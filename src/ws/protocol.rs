//! WebSocket protocol message definitions
//! These are the wire types for client-server communication

use serde::{Deserialize, Serialize};

/// Status of a frame sent from client to server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InboundStatus {
    /// Join a room (first frame of a session) or update the display name
    Connected,
    /// Velocity update, optionally tagged with a swing
    Move,
}

/// Frame sent from client to server
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboundMsg {
    /// Overwritten by the server from the connection identity
    #[serde(rename = "Id", default)]
    pub id: String,
    #[serde(rename = "Status")]
    pub status: InboundStatus,
    /// Target room, only meaningful on `connected`
    #[serde(rename = "Room", default, skip_serializing_if = "Option::is_none")]
    pub room: Option<String>,
    #[serde(rename = "Name", default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Sub-action tag, `"hit"` on a swing
    #[serde(rename = "Text", default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(rename = "X_s", default, skip_serializing_if = "Option::is_none")]
    pub x_s: Option<f64>,
    #[serde(rename = "Y_s", default, skip_serializing_if = "Option::is_none")]
    pub y_s: Option<f64>,
}

impl InboundMsg {
    pub fn connected(room: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            status: InboundStatus::Connected,
            room: Some(room.into()),
            name: Some(name.into()),
            text: None,
            x_s: None,
            y_s: None,
        }
    }

    pub fn movement(x_s: f64, y_s: f64) -> Self {
        Self {
            id: String::new(),
            status: InboundStatus::Move,
            room: None,
            name: None,
            text: None,
            x_s: Some(x_s),
            y_s: Some(y_s),
        }
    }

    /// Tag with a sub-action
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Velocity carried by the frame, missing components read as zero
    pub fn velocity(&self) -> (f64, f64) {
        (self.x_s.unwrap_or(0.0), self.y_s.unwrap_or(0.0))
    }

    pub fn is_tagged(&self, tag: &str) -> bool {
        self.text.as_deref() == Some(tag)
    }
}

/// Status of a frame sent from server to client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutboundStatus {
    /// Identity assigned on connect
    #[serde(rename = "id")]
    Id,
    /// Snapshot of every alive player, sent when someone joins
    #[serde(rename = "room_data")]
    RoomData,
    /// Velocity change, or a swing when `Text` is `"hit"`
    #[serde(rename = "move")]
    Move,
    /// Periodic position correction
    #[serde(rename = "coords")]
    Coords,
    /// `Id` killed `Text`
    #[serde(rename = "killed")]
    Killed,
    /// Respawned at `X`,`Y`
    #[serde(rename = "alive")]
    Alive,
    #[serde(rename = "playerLeft")]
    PlayerLeft,
}

/// One player inside a `room_data` frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    #[serde(rename = "Id")]
    pub id: String,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "X")]
    pub x: f64,
    #[serde(rename = "Y")]
    pub y: f64,
    #[serde(rename = "X_s")]
    pub x_s: f64,
    #[serde(rename = "Y_s")]
    pub y_s: f64,
}

/// Frame sent from server to client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutboundMsg {
    #[serde(rename = "Status")]
    pub status: OutboundStatus,
    #[serde(rename = "Name", default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "Id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "Text", default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(rename = "X", default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(rename = "Y", default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(rename = "X_s", default, skip_serializing_if = "Option::is_none")]
    pub x_s: Option<f64>,
    #[serde(rename = "Y_s", default, skip_serializing_if = "Option::is_none")]
    pub y_s: Option<f64>,
    #[serde(rename = "Players", default, skip_serializing_if = "Option::is_none")]
    pub players: Option<Vec<PlayerSnapshot>>,
}

impl OutboundMsg {
    fn bare(status: OutboundStatus) -> Self {
        Self {
            status,
            name: None,
            id: None,
            text: None,
            x: None,
            y: None,
            x_s: None,
            y_s: None,
            players: None,
        }
    }

    /// Identity frame; the id is carried in both `Id` and `Text`
    pub fn assign_id(id: &str, x: f64, y: f64) -> Self {
        Self {
            id: Some(id.to_string()),
            text: Some(id.to_string()),
            x: Some(x),
            y: Some(y),
            ..Self::bare(OutboundStatus::Id)
        }
    }

    pub fn room_data(players: Vec<PlayerSnapshot>) -> Self {
        Self {
            players: Some(players),
            ..Self::bare(OutboundStatus::RoomData)
        }
    }

    pub fn velocity(id: &str, x_s: f64, y_s: f64) -> Self {
        Self {
            id: Some(id.to_string()),
            x_s: Some(x_s),
            y_s: Some(y_s),
            ..Self::bare(OutboundStatus::Move)
        }
    }

    /// Swing notification, no target
    pub fn swing(attacker: &str, tag: &str) -> Self {
        Self {
            id: Some(attacker.to_string()),
            text: Some(tag.to_string()),
            ..Self::bare(OutboundStatus::Move)
        }
    }

    pub fn coords(id: &str, name: &str, x: f64, y: f64) -> Self {
        Self {
            id: Some(id.to_string()),
            name: Some(name.to_string()),
            x: Some(x),
            y: Some(y),
            ..Self::bare(OutboundStatus::Coords)
        }
    }

    pub fn killed(attacker: &str, victim: &str) -> Self {
        Self {
            id: Some(attacker.to_string()),
            text: Some(victim.to_string()),
            ..Self::bare(OutboundStatus::Killed)
        }
    }

    pub fn alive(id: &str, x: f64, y: f64) -> Self {
        Self {
            id: Some(id.to_string()),
            x: Some(x),
            y: Some(y),
            ..Self::bare(OutboundStatus::Alive)
        }
    }

    pub fn player_left(id: &str) -> Self {
        Self {
            id: Some(id.to_string()),
            ..Self::bare(OutboundStatus::PlayerLeft)
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn decodes_connected_frame() {
        let msg: InboundMsg = serde_json::from_str(
            r#"{"Id":"whatever","Status":"connected","Room":"main","Name":"alice"}"#,
        )
        .unwrap();
        assert_eq!(msg.status, InboundStatus::Connected);
        assert_eq!(msg.room.as_deref(), Some("main"));
        assert_eq!(msg.name.as_deref(), Some("alice"));
        assert_eq!(msg.velocity(), (0.0, 0.0));
    }

    #[test]
    fn decodes_move_with_hit_tag() {
        let msg: InboundMsg =
            serde_json::from_str(r#"{"Status":"move","Text":"hit","X_s":0.1,"Y_s":-0.2}"#)
                .unwrap();
        assert_eq!(msg.status, InboundStatus::Move);
        assert!(msg.is_tagged("hit"));
        assert_eq!(msg.velocity(), (0.1, -0.2));
        assert!(msg.id.is_empty());
    }

    #[test]
    fn rejects_unknown_status() {
        let result = serde_json::from_str::<InboundMsg>(r#"{"Status":"teleport"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn outbound_omits_absent_fields() {
        let value = serde_json::to_value(OutboundMsg::player_left("p1")).unwrap();
        assert_eq!(value, json!({"Status": "playerLeft", "Id": "p1"}));
    }

    #[test]
    fn killed_carries_attacker_and_victim() {
        let value = serde_json::to_value(OutboundMsg::killed("a", "v")).unwrap();
        assert_eq!(value, json!({"Status": "killed", "Id": "a", "Text": "v"}));
    }

    #[test]
    fn room_data_nests_player_fields() {
        let msg = OutboundMsg::room_data(vec![PlayerSnapshot {
            id: "p1".into(),
            name: "alice".into(),
            x: 1.0,
            y: 2.0,
            x_s: 0.1,
            y_s: 0.0,
        }]);
        let value = serde_json::to_value(msg).unwrap();
        assert_eq!(
            value,
            json!({
                "Status": "room_data",
                "Players": [{"Id": "p1", "Name": "alice", "X": 1.0, "Y": 2.0, "X_s": 0.1, "Y_s": 0.0}]
            })
        );
    }
}
