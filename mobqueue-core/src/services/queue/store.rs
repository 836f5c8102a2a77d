//! The speaker queue itself. Pure data, no I/O.

use crate::services::queue::QueueError;

/// Someone waiting for (or holding) the floor.
///
/// Equality is by `user_id` only; the name is whatever the user was called
/// when they joined and is used for display.
#[derive(Debug, Clone)]
pub struct Participant {
    pub user_id: String,
    pub username: String,
}

impl Participant {
    pub fn new(user_id: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            username: username.into(),
        }
    }
}

impl PartialEq for Participant {
    fn eq(&self, other: &Self) -> bool {
        self.user_id == other.user_id
    }
}

impl Eq for Participant {}

/// FIFO of participants. Index 0 is the current speaker.
#[derive(Debug, Default, Clone)]
pub struct SpeakerQueue {
    entries: Vec<Participant>,
}

impl SpeakerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, participant: Participant) {
        self.entries.push(participant);
    }

    pub fn peek_head(&self) -> Option<&Participant> {
        self.entries.first()
    }

    pub fn pop_head(&mut self) -> Result<Participant, QueueError> {
        if self.entries.is_empty() {
            return Err(QueueError::Empty);
        }
        Ok(self.entries.remove(0))
    }

    pub fn remove_at(&mut self, position: usize) -> Result<Participant, QueueError> {
        if position >= self.entries.len() {
            return Err(QueueError::OutOfRange {
                position: position as i64,
                len: self.entries.len(),
            });
        }
        Ok(self.entries.remove(position))
    }

    pub fn get(&self, position: usize) -> Option<&Participant> {
        self.entries.get(position)
    }

    pub fn position_of(&self, user_id: &str) -> Option<usize> {
        self.entries.iter().position(|p| p.user_id == user_id)
    }

    /// Everyone behind the current speaker.
    pub fn waiting(&self) -> &[Participant] {
        self.entries.get(1..).unwrap_or(&[])
    }

    pub fn entries(&self) -> &[Participant] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn queue_of(ids: &[&str]) -> SpeakerQueue {
        let mut q = SpeakerQueue::new();
        for id in ids {
            q.append(Participant::new(*id, format!("name-{id}")));
        }
        q
    }

    fn ids(q: &SpeakerQueue) -> Vec<&str> {
        q.entries().iter().map(|p| p.user_id.as_str()).collect()
    }

    #[test]
    fn head_is_first_appended() {
        let q = queue_of(&["u1", "u2"]);
        assert_eq!(q.peek_head().map(|p| p.user_id.as_str()), Some("u1"));
        assert_eq!(q.waiting().len(), 1);
        assert_eq!(q.waiting()[0].user_id, "u2");
    }

    #[test]
    fn pop_on_empty_fails_and_leaves_queue_alone() {
        let mut q = SpeakerQueue::new();
        assert!(matches!(q.pop_head(), Err(QueueError::Empty)));
        assert!(q.is_empty());
        assert!(q.waiting().is_empty());
    }

    #[test]
    fn remove_out_of_range_does_not_mutate() {
        let mut q = queue_of(&["u1", "u2"]);
        assert!(matches!(
            q.remove_at(2),
            Err(QueueError::OutOfRange { position: 2, len: 2 })
        ));
        assert_eq!(ids(&q), vec!["u1", "u2"]);
    }

    #[test]
    fn remove_preserves_relative_order() {
        let mut q = queue_of(&["u1", "u2", "u3", "u4"]);
        let removed = q.remove_at(1).unwrap();
        assert_eq!(removed.user_id, "u2");
        assert_eq!(ids(&q), vec!["u1", "u3", "u4"]);
    }

    #[test]
    fn length_tracks_appends_minus_removals() {
        let mut q = SpeakerQueue::new();
        for i in 0..5 {
            q.append(Participant::new(format!("u{i}"), "x"));
        }
        q.pop_head().unwrap();
        q.remove_at(2).unwrap();
        assert!(q.remove_at(10).is_err());
        assert_eq!(q.len(), 3);
        q.pop_head().unwrap();
        q.pop_head().unwrap();
        q.pop_head().unwrap();
        assert!(q.pop_head().is_err());
        assert_eq!(q.len(), 0);
    }

    #[test]
    fn participants_compare_by_id() {
        assert_eq!(Participant::new("1", "old"), Participant::new("1", "new"));
        let q = queue_of(&["a", "b"]);
        assert_eq!(q.position_of("b"), Some(1));
        assert_eq!(q.position_of("c"), None);
    }
}
