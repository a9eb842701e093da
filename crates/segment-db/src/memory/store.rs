//! In-memory store implementing every repository trait.
//!
//! Used by service tests and local experiments. All state sits behind one
//! lock, so every operation is atomic and the same invariants as the
//! PostgreSQL schema hold: unique segment names, at most one open membership
//! per (user, segment), and all-or-nothing batches.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use segment_core::entities::{Membership, NewMembership, NewUser, Segment, User};
use segment_core::error::DomainError;
use segment_core::traits::{RepoResult, ReportRepository, SegmentRepository, UserRepository};
use segment_core::value_objects::SegmentFilter;

#[derive(Debug, Default)]
struct State {
    users: BTreeMap<i64, User>,
    segments: BTreeMap<i64, Segment>,
    memberships: Vec<Membership>,
    next_user_id: i64,
    next_segment_id: i64,
    next_membership_id: i64,
}

impl State {
    fn alive_user(&self, user_id: i64) -> RepoResult<&User> {
        match self.users.get(&user_id) {
            None => Err(DomainError::UserNotFound(user_id)),
            Some(user) if user.is_deleted => Err(DomainError::UserDeleted(user_id)),
            Some(user) => Ok(user),
        }
    }

    fn segment_by_name_mut(&mut self, name: &str) -> Option<&mut Segment> {
        self.segments.values_mut().find(|s| s.name == name)
    }

    fn has_active(&self, user_id: i64, segment_id: i64, at: DateTime<Utc>) -> bool {
        self.memberships
            .iter()
            .any(|m| m.user_id == user_id && m.segment_id == segment_id && m.is_active_at(at))
    }

    fn push_membership(&mut self, user_id: i64, segment: (i64, &str), start: DateTime<Utc>, end: Option<DateTime<Utc>>) {
        self.next_membership_id += 1;
        self.memberships.push(Membership {
            id: self.next_membership_id,
            user_id,
            segment_id: segment.0,
            segment_name: segment.1.to_string(),
            start_date: start,
            end_date: end,
        });
    }

    fn close_where<F>(&mut self, closed_at: DateTime<Utc>, pred: F) -> u64
    where
        F: Fn(&Membership) -> bool,
    {
        let mut closed = 0;
        for m in &mut self.memberships {
            if m.is_active_at(closed_at) && pred(m) {
                m.end_date = Some(closed_at);
                closed += 1;
            }
        }
        closed
    }
}

/// Thread-safe in-memory implementation of the user, segment and report repositories
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<State>,
    offline: AtomicBool,
}

impl MemoryStore {
    /// Creates a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail with a database error, or recover.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Snapshot of every membership record, in insertion order.
    #[must_use]
    pub fn memberships(&self) -> Vec<Membership> {
        self.state.read().memberships.clone()
    }

    fn check_online(&self) -> RepoResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(DomainError::DatabaseError("connection refused".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create(&self, user: &NewUser) -> RepoResult<User> {
        self.check_online()?;
        if user.age < 0 {
            return Err(DomainError::ValidationError("value rejected by constraint users_age_check".to_string()));
        }

        let mut state = self.state.write();
        state.next_user_id += 1;
        let created = User {
            id: state.next_user_id,
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            sex: user.sex,
            age: user.age,
            is_deleted: false,
            created_at: Utc::now(),
        };
        state.users.insert(created.id, created.clone());
        Ok(created)
    }

    async fn find_by_id(&self, id: i64) -> RepoResult<Option<User>> {
        self.check_online()?;
        Ok(self.state.read().users.get(&id).cloned())
    }

    async fn find_all(&self) -> RepoResult<Vec<User>> {
        self.check_online()?;
        Ok(self.state.read().users.values().cloned().collect())
    }

    async fn find_alive_ids(&self) -> RepoResult<Vec<i64>> {
        self.check_online()?;
        let state = self.state.read();
        Ok(state.users.values().filter(|u| !u.is_deleted).map(|u| u.id).collect())
    }

    async fn active_memberships(&self, user_id: i64, now: DateTime<Utc>) -> RepoResult<Vec<Membership>> {
        self.check_online()?;
        let state = self.state.read();
        Ok(state
            .memberships
            .iter()
            .filter(|m| m.user_id == user_id && m.is_active_at(now))
            .cloned()
            .collect())
    }

    async fn all_active_memberships(&self, now: DateTime<Utc>) -> RepoResult<Vec<Membership>> {
        self.check_online()?;
        let state = self.state.read();
        let mut active: Vec<Membership> = state
            .memberships
            .iter()
            .filter(|m| m.is_active_at(now))
            .cloned()
            .collect();
        active.sort_by_key(|m| (m.user_id, m.start_date, m.id));
        Ok(active)
    }

    async fn add_memberships(
        &self,
        user_id: i64,
        memberships: &[NewMembership],
        started_at: DateTime<Utc>,
    ) -> RepoResult<u64> {
        self.check_online()?;
        if memberships.is_empty() {
            return Ok(0);
        }

        let mut state = self.state.write();
        state.alive_user(user_id)?;

        for m in memberships {
            if state.segments.get(&m.segment_id).is_none_or(|s| s.is_deleted) {
                return Err(DomainError::SegmentDeleted(m.segment_name.clone()));
            }
        }

        let already_active = state.memberships.iter().any(|existing| {
            existing.user_id == user_id
                && existing.is_active_at(started_at)
                && memberships.iter().any(|m| m.segment_id == existing.segment_id)
        });
        if already_active {
            return Err(DomainError::ActiveMembershipExists { user_id });
        }

        // Two open entries for one segment in the same batch.
        for (i, m) in memberships.iter().enumerate() {
            let repeated = memberships[..i]
                .iter()
                .any(|prev| prev.segment_id == m.segment_id && prev.end_date.is_none() && m.end_date.is_none());
            if repeated {
                return Err(DomainError::ActiveMembershipExists { user_id });
            }
        }

        for m in memberships {
            state.push_membership(user_id, (m.segment_id, &m.segment_name), started_at, m.end_date);
        }

        Ok(memberships.len() as u64)
    }

    async fn close_memberships(
        &self,
        user_id: i64,
        membership_ids: &[i64],
        closed_at: DateTime<Utc>,
    ) -> RepoResult<u64> {
        self.check_online()?;
        if membership_ids.is_empty() {
            return Ok(0);
        }

        let mut state = self.state.write();
        state.alive_user(user_id)?;

        let all_active = membership_ids.iter().all(|id| {
            state
                .memberships
                .iter()
                .any(|m| m.id == *id && m.user_id == user_id && m.is_active_at(closed_at))
        });
        if !all_active {
            return Err(DomainError::MembershipNotActive { user_id });
        }

        Ok(state.close_where(closed_at, |m| membership_ids.contains(&m.id)))
    }

    async fn soft_delete(&self, user_id: i64, closed_at: DateTime<Utc>) -> RepoResult<u64> {
        self.check_online()?;
        let mut state = self.state.write();
        state.alive_user(user_id)?;

        if let Some(user) = state.users.get_mut(&user_id) {
            user.is_deleted = true;
        }
        Ok(state.close_where(closed_at, |m| m.user_id == user_id))
    }
}

#[async_trait]
impl SegmentRepository for MemoryStore {
    async fn create(&self, name: &str) -> RepoResult<Segment> {
        self.check_online()?;
        let mut state = self.state.write();
        if state.segment_by_name_mut(name).is_some() {
            return Err(DomainError::SegmentNameTaken(name.to_string()));
        }

        state.next_segment_id += 1;
        let segment = Segment {
            id: state.next_segment_id,
            name: name.to_string(),
            is_deleted: false,
            created_at: Utc::now(),
        };
        state.segments.insert(segment.id, segment.clone());
        Ok(segment)
    }

    async fn find_by_name(&self, name: &str) -> RepoResult<Option<Segment>> {
        self.check_online()?;
        let state = self.state.read();
        Ok(state.segments.values().find(|s| s.name == name).cloned())
    }

    async fn list(&self, filter: SegmentFilter) -> RepoResult<Vec<Segment>> {
        self.check_online()?;
        let state = self.state.read();
        Ok(state
            .segments
            .values()
            .filter(|s| filter.matches(s.is_deleted))
            .cloned()
            .collect())
    }

    async fn recover(&self, name: &str) -> RepoResult<Option<Segment>> {
        self.check_online()?;
        let mut state = self.state.write();
        Ok(state
            .segment_by_name_mut(name)
            .filter(|s| s.is_deleted)
            .map(|s| {
                s.is_deleted = false;
                s.clone()
            }))
    }

    async fn soft_delete(&self, name: &str, closed_at: DateTime<Utc>) -> RepoResult<u64> {
        self.check_online()?;
        let mut state = self.state.write();
        let segment_id = match state.segment_by_name_mut(name) {
            Some(segment) if !segment.is_deleted => {
                segment.is_deleted = true;
                segment.id
            }
            _ => return Err(DomainError::SegmentNotFound(name.to_string())),
        };

        Ok(state.close_where(closed_at, |m| m.segment_id == segment_id))
    }

    async fn enroll_users(
        &self,
        segment: &Segment,
        user_ids: &[i64],
        started_at: DateTime<Utc>,
    ) -> RepoResult<u64> {
        self.check_online()?;
        let mut state = self.state.write();
        if state.segments.get(&segment.id).is_none_or(|s| s.is_deleted) {
            return Err(DomainError::SegmentDeleted(segment.name.clone()));
        }

        let mut enrolled = 0;
        for &user_id in user_ids {
            let eligible = state.users.get(&user_id).is_some_and(|u| !u.is_deleted);
            if eligible && !state.has_active(user_id, segment.id, started_at) {
                state.push_membership(user_id, (segment.id, &segment.name), started_at, None);
                enrolled += 1;
            }
        }
        Ok(enrolled)
    }
}

#[async_trait]
impl ReportRepository for MemoryStore {
    async fn membership_history(&self) -> RepoResult<Vec<Membership>> {
        self.check_online()?;
        let mut history = self.state.read().memberships.clone();
        history.sort_by_key(|m| (m.start_date, m.id));
        Ok(history)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use segment_core::value_objects::Sex;

    async fn user(store: &MemoryStore) -> User {
        UserRepository::create(store, &NewUser::new("Ann", "Lee", Sex::Female, 30))
            .await
            .unwrap()
    }

    fn entry(segment: &Segment) -> NewMembership {
        NewMembership {
            segment_id: segment.id,
            segment_name: segment.name.clone(),
            end_date: None,
        }
    }

    #[tokio::test]
    async fn test_segment_names_are_unique_across_states() {
        let store = MemoryStore::new();
        SegmentRepository::create(&store, "PROMO").await.unwrap();
        SegmentRepository::soft_delete(&store, "PROMO", Utc::now()).await.unwrap();

        let err = SegmentRepository::create(&store, "PROMO").await.unwrap_err();
        assert!(matches!(err, DomainError::SegmentNameTaken(name) if name == "PROMO"));

        let recovered = store.recover("PROMO").await.unwrap().unwrap();
        assert!(!recovered.is_deleted);
        assert!(store.recover("PROMO").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_add_is_all_or_nothing() {
        let store = MemoryStore::new();
        let ann = user(&store).await;
        let a = SegmentRepository::create(&store, "A").await.unwrap();
        let b = SegmentRepository::create(&store, "B").await.unwrap();
        let now = Utc::now();

        store.add_memberships(ann.id, &[entry(&a)], now).await.unwrap();
        let err = store
            .add_memberships(ann.id, &[entry(&b), entry(&a)], now)
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::ActiveMembershipExists { .. }));
        assert_eq!(store.memberships().len(), 1);
    }

    #[tokio::test]
    async fn test_close_requires_every_record_active() {
        let store = MemoryStore::new();
        let ann = user(&store).await;
        let a = SegmentRepository::create(&store, "A").await.unwrap();
        let now = Utc::now();
        store.add_memberships(ann.id, &[entry(&a)], now).await.unwrap();
        let id = store.memberships()[0].id;

        assert_eq!(store.close_memberships(ann.id, &[id], now).await.unwrap(), 1);
        let err = store.close_memberships(ann.id, &[id], now).await.unwrap_err();
        assert!(matches!(err, DomainError::MembershipNotActive { .. }));
    }

    #[tokio::test]
    async fn test_enroll_skips_deleted_and_already_open() {
        let store = MemoryStore::new();
        let ann = user(&store).await;
        let bob = user(&store).await;
        let cid = user(&store).await;
        let seg = SegmentRepository::create(&store, "S").await.unwrap();
        let now = Utc::now();

        store.add_memberships(bob.id, &[entry(&seg)], now).await.unwrap();
        UserRepository::soft_delete(&store, cid.id, now).await.unwrap();

        let enrolled = store
            .enroll_users(&seg, &[ann.id, bob.id, cid.id, 999], now)
            .await
            .unwrap();
        assert_eq!(enrolled, 1);
    }

    #[tokio::test]
    async fn test_enroll_skips_membership_ending_later() {
        let store = MemoryStore::new();
        let ann = user(&store).await;
        let seg = SegmentRepository::create(&store, "TRIAL").await.unwrap();
        let now = Utc::now();
        let leaving = NewMembership {
            end_date: Some(now + Duration::days(30)),
            ..entry(&seg)
        };
        store.add_memberships(ann.id, &[leaving], now).await.unwrap();

        assert_eq!(store.enroll_users(&seg, &[ann.id], now).await.unwrap(), 0);
        assert_eq!(store.memberships().len(), 1);
    }

    #[tokio::test]
    async fn test_history_is_ordered_by_start() {
        let store = MemoryStore::new();
        let ann = user(&store).await;
        let a = SegmentRepository::create(&store, "A").await.unwrap();
        let b = SegmentRepository::create(&store, "B").await.unwrap();
        let now = Utc::now();

        store.add_memberships(ann.id, &[entry(&a)], now).await.unwrap();
        store
            .add_memberships(ann.id, &[entry(&b)], now - Duration::hours(1))
            .await
            .unwrap();

        let history = store.membership_history().await.unwrap();
        assert_eq!(history[0].segment_name, "B");
        assert_eq!(history[1].segment_name, "A");
    }

    #[tokio::test]
    async fn test_offline_store_fails() {
        let store = MemoryStore::new();
        store.set_offline(true);
        let err = UserRepository::find_all(&store).await.unwrap_err();
        assert!(matches!(err, DomainError::DatabaseError(_)));
    }
}
