use serde_json::{Map, Value};

use super::*;

pub type EventType = String;
pub type Metadata = Map<String, Value>;

pub const CHALLENGE_COMPLETED: &str = "challenge_completed";
pub const GOAL_PROGRESS: &str = "goal_progress";

const POINTS_EARNED: &str = "pointsEarned";
const RELATED_GOAL_ID: &str = "relatedGoalId";
const RELATED_CHALLENGE_ID: &str = "relatedChallengeId";
const RELATED_SUBMISSION_ID: &str = "relatedSubmissionId";
const SESSION_ID: &str = "sessionId";

/// A single unit of learning activity. Never mutated once stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningEvent {
    pub id: EventId,
    pub user_id: UserId,
    pub event_type: EventType,
    pub points_earned: i32,
    pub occurred_at: DateTime<Utc>,
    pub related_goal_id: Option<i32>,
    pub related_challenge_id: Option<ChallengeId>,
    pub related_submission_id: Option<i32>,
    pub session_id: Option<String>,
    pub metadata: Metadata,
}

impl LearningEvent {
    pub fn activity_day(&self) -> NaiveDate {
        self.occurred_at.date_naive()
    }

    pub fn is_challenge_completion(&self) -> bool {
        self.event_type == CHALLENGE_COMPLETED
    }
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum EventFieldError {
    #[error("user id is required")]
    MissingUser,
    #[error("event type is required")]
    MissingEventType,
    #[error("`{0}` must be an integer")]
    NotAnInteger(&'static str),
    #[error("`{0}` must be a string")]
    NotAString(&'static str),
}

/// Event as submitted by a caller, before the store assigns an id and a timestamp.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NewLearningEvent {
    pub user_id: UserId,
    pub event_type: EventType,
    pub points_earned: i32,
    pub related_goal_id: Option<i32>,
    pub related_challenge_id: Option<ChallengeId>,
    pub related_submission_id: Option<i32>,
    pub session_id: Option<String>,
    pub metadata: Metadata,
}

impl NewLearningEvent {
    /// Splits a free-form payload into the declared event fields and the metadata bag.
    ///
    /// Recognised keys are removed from the payload before the rest becomes metadata,
    /// so a metadata entry can never shadow a declared field.
    pub fn from_payload(
        user_id: Option<UserId>,
        event_type: Option<&str>,
        mut payload: Metadata,
    ) -> Result<Self, EventFieldError> {
        let user_id = user_id.ok_or(EventFieldError::MissingUser)?;
        let event_type = event_type
            .map(str::trim)
            .filter(|event_type| !event_type.is_empty())
            .ok_or(EventFieldError::MissingEventType)?;

        let points_earned = take_integer(&mut payload, POINTS_EARNED)?.unwrap_or_default();
        let related_goal_id = take_integer(&mut payload, RELATED_GOAL_ID)?;
        let related_challenge_id = take_integer(&mut payload, RELATED_CHALLENGE_ID)?;
        let related_submission_id = take_integer(&mut payload, RELATED_SUBMISSION_ID)?;
        let session_id = match payload.remove(SESSION_ID) {
            None | Some(Value::Null) => None,
            Some(Value::String(session)) => Some(session),
            Some(_) => return Err(EventFieldError::NotAString(SESSION_ID)),
        };

        Ok(Self {
            user_id,
            event_type: event_type.to_string(),
            points_earned,
            related_goal_id,
            related_challenge_id,
            related_submission_id,
            session_id,
            metadata: payload,
        })
    }

    pub fn into_event(self, id: EventId, occurred_at: DateTime<Utc>) -> LearningEvent {
        LearningEvent {
            id,
            user_id: self.user_id,
            event_type: self.event_type,
            points_earned: self.points_earned,
            occurred_at,
            related_goal_id: self.related_goal_id,
            related_challenge_id: self.related_challenge_id,
            related_submission_id: self.related_submission_id,
            session_id: self.session_id,
            metadata: self.metadata,
        }
    }
}

// Accepts JSON numbers and numeric strings, since ids often arrive quoted.
fn take_integer(
    payload: &mut Metadata,
    key: &'static str,
) -> Result<Option<i32>, EventFieldError> {
    let value = match payload.remove(key) {
        None | Some(Value::Null) => return Ok(None),
        Some(value) => value,
    };

    let number = match &value {
        Value::Number(number) => number.as_i64(),
        Value::String(text) => text.trim().parse::<i64>().ok(),
        _ => None,
    };

    number
        .and_then(|number| i32::try_from(number).ok())
        .map(Some)
        .ok_or(EventFieldError::NotAnInteger(key))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn payload(value: Value) -> Metadata {
        match value {
            Value::Object(map) => map,
            _ => panic!("payload must be an object"),
        }
    }

    #[test]
    fn declared_fields_are_extracted() {
        let event = NewLearningEvent::from_payload(
            Some(7),
            Some(CHALLENGE_COMPLETED),
            payload(json!({
                "pointsEarned": 25,
                "relatedChallengeId": "12",
                "sessionId": "abc",
                "difficulty": "hard",
            })),
        )
        .unwrap();

        assert_eq!(event.user_id, 7);
        assert_eq!(event.points_earned, 25);
        assert_eq!(event.related_challenge_id, Some(12));
        assert_eq!(event.related_goal_id, None);
        assert_eq!(event.session_id.as_deref(), Some("abc"));
        assert_eq!(event.metadata.len(), 1);
        assert_eq!(event.metadata["difficulty"], json!("hard"));
    }

    #[test]
    fn points_default_to_zero() {
        let event =
            NewLearningEvent::from_payload(Some(1), Some(GOAL_PROGRESS), Metadata::new()).unwrap();

        assert_eq!(event.points_earned, 0);
        assert!(event.metadata.is_empty());
    }

    #[test]
    fn missing_identity_or_type_is_rejected() {
        assert_eq!(
            NewLearningEvent::from_payload(None, Some(GOAL_PROGRESS), Metadata::new()),
            Err(EventFieldError::MissingUser)
        );
        assert_eq!(
            NewLearningEvent::from_payload(Some(1), None, Metadata::new()),
            Err(EventFieldError::MissingEventType)
        );
        assert_eq!(
            NewLearningEvent::from_payload(Some(1), Some("   "), Metadata::new()),
            Err(EventFieldError::MissingEventType)
        );
    }

    #[test]
    fn malformed_points_are_rejected() {
        let result = NewLearningEvent::from_payload(
            Some(1),
            Some(GOAL_PROGRESS),
            payload(json!({ "pointsEarned": "lots" })),
        );

        assert_eq!(result, Err(EventFieldError::NotAnInteger(POINTS_EARNED)));
    }
}
