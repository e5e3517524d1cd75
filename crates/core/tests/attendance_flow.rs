//! Full-day attendance scenarios over mock ports
//!
//! Exercises the snapshot cache and the status evaluation together, the way
//! the schedule monitor drives them: the cache answers from its slot, the
//! evaluation derives a state from whatever the slot and the clock say, and
//! the new-day refresh is triggered through the guarded path. Time is a mock
//! port the scenario advances by hand.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{Datelike, NaiveDate, TimeZone, Utc};
use pasalista_core::{
    evaluate, needs_day_refresh, ProcessStatusSource, SchoolClock, SnapshotCache, SnapshotSource,
    SnapshotStore, StatusInputs,
};
use pasalista_domain::{
    ActivityKind, AttendanceProcessFlag, AttendanceState, AttendanceStatus, ClockReading,
    DailySnapshot, DateRange, EventDay, PasaListaError, ProcessKind, Result, Role, ScheduleWindow,
};

const REFRESH_HOUR: u32 = 7;

struct MemoryStore {
    snapshot: Mutex<Option<DailySnapshot>>,
    flags: Mutex<HashMap<ProcessKind, AttendanceProcessFlag>>,
}

impl MemoryStore {
    fn new() -> Self {
        Self { snapshot: Mutex::new(None), flags: Mutex::new(HashMap::new()) }
    }

    fn seed_snapshot(&self, snapshot: DailySnapshot) {
        *self.snapshot.lock().unwrap() = Some(snapshot);
    }
}

#[async_trait]
impl SnapshotStore for MemoryStore {
    async fn load_snapshot(&self) -> Result<Option<DailySnapshot>> {
        Ok(self.snapshot.lock().unwrap().clone())
    }

    async fn save_snapshot(&self, snapshot: &DailySnapshot) -> Result<()> {
        *self.snapshot.lock().unwrap() = Some(snapshot.clone());
        Ok(())
    }

    async fn clear_snapshot(&self) -> Result<()> {
        *self.snapshot.lock().unwrap() = None;
        Ok(())
    }

    async fn load_flag(&self, kind: ProcessKind) -> Result<Option<AttendanceProcessFlag>> {
        Ok(self.flags.lock().unwrap().get(&kind).copied())
    }

    async fn save_flag(&self, flag: &AttendanceProcessFlag) -> Result<()> {
        self.flags.lock().unwrap().insert(flag.kind, *flag);
        Ok(())
    }
}

/// Backend stand-in serving whatever snapshot the scenario publishes
struct Backend {
    published: Mutex<DailySnapshot>,
    fetches: AtomicUsize,
}

impl Backend {
    fn publishing(snapshot: DailySnapshot) -> Self {
        Self { published: Mutex::new(snapshot), fetches: AtomicUsize::new(0) }
    }

    fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SnapshotSource for Backend {
    async fn fetch_today(&self, _role: Role) -> Result<DailySnapshot> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self.published.lock().unwrap().clone())
    }
}

/// Process endpoint that is unreachable, forcing the synthesized default
struct OfflineProcess;

#[async_trait]
impl ProcessStatusSource for OfflineProcess {
    async fn fetch_status(&self, _kind: ProcessKind) -> Result<AttendanceProcessFlag> {
        Err(PasaListaError::Network("process endpoint unreachable".to_string()))
    }

    async fn push_status(&self, _flag: &AttendanceProcessFlag) -> Result<()> {
        Ok(())
    }
}

/// Scenario-controlled school clock
struct ScenarioClock {
    reading: Mutex<ClockReading>,
}

impl ScenarioClock {
    fn starting_at(reading: ClockReading) -> Self {
        Self { reading: Mutex::new(reading) }
    }

    fn advance_to(&self, reading: ClockReading) {
        *self.reading.lock().unwrap() = reading;
    }
}

#[async_trait]
impl SchoolClock for ScenarioClock {
    async fn reading(&self) -> Result<ClockReading> {
        Ok(*self.reading.lock().unwrap())
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn at(day: NaiveDate, hour: u32, minute: u32) -> ClockReading {
    let local =
        Utc.with_ymd_and_hms(day.year(), day.month(), day.day(), hour, minute, 0).unwrap();
    ClockReading::from_local(&local)
}

fn teacher_snapshot(day: NaiveDate) -> DailySnapshot {
    let mut snapshot = DailySnapshot::new(Role::Teacher, day);
    snapshot.windows.insert(
        ActivityKind::PrimaryTeachers,
        ScheduleWindow {
            start: Utc.with_ymd_and_hms(day.year(), day.month(), day.day(), 8, 0, 0).unwrap(),
            end: Utc.with_ymd_and_hms(day.year(), day.month(), day.day(), 8, 30, 0).unwrap(),
        },
    );
    snapshot
}

/// One monitor-style evaluation: peek the slot and the flag, never fetch
async fn observe(cache: &SnapshotCache, clock: &ScenarioClock, role: Role) -> AttendanceStatus {
    let snapshot = cache.peek_snapshot().await.unwrap();
    let flag = cache.peek_process_flag(role.process_kind()).await.unwrap();
    let reading = clock.reading().await.unwrap();
    evaluate(StatusInputs {
        snapshot: snapshot.as_ref(),
        reading: Some(&reading),
        process_flag: flag.as_ref(),
        sync_in_flight: cache.fetch_in_flight().await,
        capture_open: false,
        refresh_hour: REFRESH_HOUR,
    })
}

async fn refresh_if_new_day(cache: &SnapshotCache, clock: &ScenarioClock, role: Role) -> bool {
    let snapshot = cache.peek_snapshot().await.unwrap();
    let reading = clock.reading().await.unwrap();
    let inputs = StatusInputs {
        snapshot: snapshot.as_ref(),
        reading: Some(&reading),
        process_flag: None,
        sync_in_flight: cache.fetch_in_flight().await,
        capture_open: false,
        refresh_hour: REFRESH_HOUR,
    };
    if !needs_day_refresh(inputs) {
        return false;
    }
    cache.try_refresh(role).await.unwrap()
}

// 2025-07-04 Friday, 2025-07-05 Saturday, 2025-07-07 Monday
#[tokio::test]
async fn test_teacher_school_day_from_stale_morning_to_close() {
    let monday = date(2025, 7, 7);
    let store = Arc::new(MemoryStore::new());
    store.seed_snapshot(teacher_snapshot(date(2025, 7, 4)));
    let backend = Arc::new(Backend::publishing(teacher_snapshot(monday)));
    let clock = Arc::new(ScenarioClock::starting_at(at(monday, 6, 30)));
    let cache =
        SnapshotCache::new(store, backend.clone(), Arc::new(OfflineProcess), clock.clone());

    // 06:30 - Friday's snapshot still in the slot, refresh hour not reached
    let status = observe(&cache, &clock, Role::Teacher).await;
    assert_eq!(status.state, AttendanceState::Preparing);
    assert!(!refresh_if_new_day(&cache, &clock, Role::Teacher).await);
    assert_eq!(backend.fetches(), 0);

    // 07:05 - the new-day condition holds, exactly one proactive fetch
    clock.advance_to(at(monday, 7, 5));
    assert!(refresh_if_new_day(&cache, &clock, Role::Teacher).await);
    assert_eq!(backend.fetches(), 1);
    assert!(!refresh_if_new_day(&cache, &clock, Role::Teacher).await);
    assert_eq!(backend.fetches(), 1);

    // 07:30 - fresh snapshot, window not yet open
    clock.advance_to(at(monday, 7, 30));
    let status = observe(&cache, &clock, Role::Teacher).await;
    assert_eq!(status.state, AttendanceState::Pending);
    assert_eq!(status.progress, 50);
    assert!(!status.action_enabled);

    // 08:10 - window open, attendance not yet started
    clock.advance_to(at(monday, 8, 10));
    let status = observe(&cache, &clock, Role::Teacher).await;
    assert_eq!(status.state, AttendanceState::Available);
    assert!(status.action_enabled);

    // The teacher starts the roll call
    cache.set_process_flag(Role::Teacher.process_kind(), true).await.unwrap();
    let status = observe(&cache, &clock, Role::Teacher).await;
    assert_eq!(status.state, AttendanceState::InProcess);

    // 08:30 - the closing minute itself counts as closed
    clock.advance_to(at(monday, 8, 30));
    let status = observe(&cache, &clock, Role::Teacher).await;
    assert_eq!(status.state, AttendanceState::Closed);
    assert!(!status.action_enabled);

    // The whole day cost one network round trip
    assert_eq!(backend.fetches(), 1);
}

#[tokio::test]
async fn test_weekend_runs_entirely_from_the_stored_snapshot() {
    let saturday = date(2025, 7, 5);
    let store = Arc::new(MemoryStore::new());
    store.seed_snapshot(teacher_snapshot(date(2025, 7, 4)));
    let backend = Arc::new(Backend::publishing(teacher_snapshot(saturday)));
    let clock = Arc::new(ScenarioClock::starting_at(at(saturday, 10, 0)));
    let cache =
        SnapshotCache::new(store, backend.clone(), Arc::new(OfflineProcess), clock.clone());

    // Reads are served from Friday's snapshot, however stale it is
    let served = cache.get_snapshot(Role::Teacher).await.unwrap();
    assert_eq!(served.calendar_date, date(2025, 7, 4));
    assert_eq!(backend.fetches(), 0);

    let status = observe(&cache, &clock, Role::Teacher).await;
    assert_eq!(status.state, AttendanceState::NotAvailable);
    assert!(!refresh_if_new_day(&cache, &clock, Role::Teacher).await);
    assert_eq!(backend.fetches(), 0);
}

#[tokio::test]
async fn test_event_day_snapshot_disables_attendance() {
    // Día del Maestro covers the whole day; nothing else matters
    let sunday = date(2025, 7, 6);
    let mut published = teacher_snapshot(sunday);
    published.event_day = Some(EventDay {
        name: "Día del Maestro".to_string(),
        range: DateRange { start: sunday, end: sunday },
    });
    let store = Arc::new(MemoryStore::new());
    let backend = Arc::new(Backend::publishing(published));
    let clock = Arc::new(ScenarioClock::starting_at(at(sunday, 8, 15)));
    let cache = SnapshotCache::new(store, backend, Arc::new(OfflineProcess), clock.clone());

    cache.get_snapshot(Role::Teacher).await.unwrap();

    let status = observe(&cache, &clock, Role::Teacher).await;
    assert_eq!(status.state, AttendanceState::Event);
    assert!(status.description.contains("Día del Maestro"));
    assert!(!status.action_enabled);
}

#[tokio::test]
async fn test_flag_started_yesterday_reopens_today() {
    let monday = date(2025, 7, 7);
    let store = Arc::new(MemoryStore::new());
    store.seed_snapshot(teacher_snapshot(monday));
    store
        .save_flag(&AttendanceProcessFlag {
            kind: ProcessKind::Staff,
            date: date(2025, 7, 4),
            started: true,
        })
        .await
        .unwrap();
    let backend = Arc::new(Backend::publishing(teacher_snapshot(monday)));
    let clock = Arc::new(ScenarioClock::starting_at(at(monday, 8, 10)));
    let cache = SnapshotCache::new(store, backend, Arc::new(OfflineProcess), clock.clone());

    // Friday's start does not carry over; the ledger is day-scoped
    let status = observe(&cache, &clock, Role::Teacher).await;
    assert_eq!(status.state, AttendanceState::Available);
    assert!(!cache.is_process_started_today(ProcessKind::Staff).await.unwrap());
}
